//! Line-oriented report parser.
//!
//! Extracts an ordered list of [`ArticleRecord`]s from a Markdown digest
//! report. The parser is a small state machine over lines: heading lines
//! open sections, field label lines are matched independently within a
//! section, and sub-list lines accumulate under the key-points label.
//!
//! # Grammar
//!
//! A report is a sequence of numbered sections:
//!
//! ```text
//! ## 1. Title of the article
//! - **Summary**: one or more lines of prose
//! - **Key Points**:
//!   1. first point
//!   2. second point
//! - **Source**: [HackerNews](https://news.ycombinator.com/item?id=1) | [Original](https://example.com/post)
//! - **Keywords**: `ai` `llm`
//! - **Score**: ⭐⭐⭐⭐ (4/5)
//! ```
//!
//! Rules:
//! - A heading line is exactly two or three `#`, whitespace, an integer,
//!   a dot, whitespace, and a non-empty title. It opens a new section and
//!   closes the previous one. The rank is taken verbatim from the heading
//!   and may repeat or skip numbers.
//! - Within a section each field is matched independently; the first
//!   occurrence wins. An absent field falls back to its default: empty
//!   string for summary, key points, and url, `"Other"` for source, `"3"`
//!   for score, and no keywords.
//! - Summary text continues across plain lines until a blank line, a
//!   bullet, a numbered sub-list item, or the end of the section.
//! - Key points are the indented `N. text` lines following the label and
//!   are renumbered 1..N in output regardless of source numbering.
//! - The url is the target of the first `[Original](...)` link anywhere in
//!   the section body, scanned on every line including field lines. It is
//!   passed through without any well-formedness validation.
//! - Keywords are the backtick-quoted tokens on the keywords line, in
//!   document order, truncated to the first five.
//!
//! Parsing is a pure function of the input text.

use crate::models::ArticleRecord;

/// Maximum number of keywords kept per record.
pub const MAX_KEYWORDS: usize = 5;

/// Parse a Markdown digest report into its article records.
///
/// Records come back in document order. Text before the first section
/// heading is ignored.
pub fn parse_report(text: &str) -> Vec<ArticleRecord> {
    let mut articles = Vec::new();
    let mut section: Option<Section> = None;

    for line in text.lines() {
        if let Some((rank, title)) = heading_line(line) {
            if let Some(done) = section.take() {
                articles.push(done.finish());
            }
            section = Some(Section::new(rank, title));
            continue;
        }
        if let Some(current) = section.as_mut() {
            current.feed(line);
        }
    }
    if let Some(done) = section.take() {
        articles.push(done.finish());
    }
    articles
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Body,
    Summary,
    KeyPoints,
}

#[derive(Debug)]
struct Section {
    rank: i64,
    title: String,
    state: State,
    summary_lines: Option<Vec<String>>,
    points: Option<Vec<String>>,
    url: Option<String>,
    source: Option<String>,
    keywords: Option<Vec<String>>,
    score: Option<String>,
}

impl Section {
    fn new(rank: i64, title: &str) -> Self {
        Self {
            rank,
            title: title.to_string(),
            state: State::Body,
            summary_lines: None,
            points: None,
            url: None,
            source: None,
            keywords: None,
            score: None,
        }
    }

    fn feed(&mut self, line: &str) {
        // The original-link scan runs on every body line; first match wins.
        if self.url.is_none() {
            if let Some(url) = original_link(line) {
                self.url = Some(url);
            }
        }

        match self.state {
            State::KeyPoints => {
                if let Some(point) = sublist_item(line) {
                    if let Some(points) = self.points.as_mut() {
                        points.push(point.to_string());
                    }
                    return;
                }
                // Anything else ends the sub-list and is handled normally.
                self.state = State::Body;
            }
            State::Summary => {
                if summary_continuation(line) {
                    if let Some(lines) = self.summary_lines.as_mut() {
                        lines.push(line.trim().to_string());
                    }
                    return;
                }
                self.state = State::Body;
            }
            State::Body => {}
        }

        if let Some(rest) = field_value(line, "Summary") {
            if self.summary_lines.is_none() {
                let mut lines = Vec::new();
                if !rest.is_empty() {
                    lines.push(rest.to_string());
                }
                self.summary_lines = Some(lines);
                self.state = State::Summary;
            }
        } else if field_value(line, "Key Points").is_some() {
            if self.points.is_none() {
                self.points = Some(Vec::new());
                self.state = State::KeyPoints;
            }
        } else if let Some(rest) = field_value(line, "Source") {
            if self.source.is_none() {
                self.source = first_bracket_label(rest);
            }
        } else if let Some(rest) = field_value(line, "Keywords") {
            if self.keywords.is_none() {
                self.keywords = Some(backtick_tokens(rest, MAX_KEYWORDS));
            }
        } else if let Some(rest) = field_value(line, "Score") {
            if self.score.is_none() {
                self.score = score_value(rest);
            }
        }
    }

    fn finish(self) -> ArticleRecord {
        let key_points = self
            .points
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(i, point)| format!("{}. {}", i + 1, point))
            .collect::<Vec<_>>()
            .join("\n");

        ArticleRecord {
            rank: self.rank,
            title: self.title,
            summary: self.summary_lines.unwrap_or_default().join("\n"),
            key_points,
            url: self.url.unwrap_or_default(),
            source: self.source.unwrap_or_else(|| "Other".to_string()),
            keywords: self.keywords.unwrap_or_default(),
            score: self.score.unwrap_or_else(|| "3".to_string()),
        }
    }
}

/// Match a section heading: 2 or 3 `#`, whitespace, integer, `.`,
/// whitespace, non-empty title.
fn heading_line(line: &str) -> Option<(i64, &str)> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if !(2..=3).contains(&hashes) {
        return None;
    }
    let rest = &line[hashes..];
    let after_ws = rest.trim_start();
    if after_ws.len() == rest.len() {
        // No whitespace between the hashes and the rank.
        return None;
    }
    let digits_end = after_ws.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let (digits, tail) = after_ws.split_at(digits_end);
    let tail = tail.strip_prefix('.')?;
    let title = tail.trim_start();
    if title.is_empty() || title.len() == tail.len() {
        // The dot must be followed by whitespace and a title.
        return None;
    }
    let rank: i64 = digits.parse().ok()?;
    Some((rank, title.trim_end()))
}

/// Match a bold field label line (`- **Label**: value`) and return the value
/// with surrounding whitespace removed.
fn field_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let rest = line.trim_start().strip_prefix("- **")?;
    let rest = rest.strip_prefix(label)?;
    let rest = rest.strip_prefix("**")?;
    let rest = rest.strip_prefix(':')?;
    Some(rest.trim())
}

/// Match an indented numbered sub-list item (`  1. text`).
fn sublist_item(line: &str) -> Option<&str> {
    if !line.starts_with(' ') && !line.starts_with('\t') {
        return None;
    }
    let item = line.trim_start();
    let digits_end = item.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let text = item[digits_end..].strip_prefix(". ")?;
    let text = text.trim_end();
    (!text.is_empty()).then_some(text)
}

/// A summary continuation line is plain prose: non-blank, not a bullet,
/// not a sub-list item, not a heading.
fn summary_continuation(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && !trimmed.starts_with("- ")
        && !trimmed.starts_with('#')
        && sublist_item(line).is_none()
}

/// Extract the target of the first `[Original](...)` link on a line.
fn original_link(line: &str) -> Option<String> {
    let start = line.find("[Original](")?;
    let rest = &line[start + "[Original](".len()..];
    let end = rest.find(')')?;
    let url = &rest[..end];
    (!url.is_empty()).then(|| url.to_string())
}

/// Extract the first bracketed label on a source line, e.g.
/// `[HackerNews](...)` yields `HackerNews`.
fn first_bracket_label(rest: &str) -> Option<String> {
    let start = rest.find('[')?;
    let after = &rest[start + 1..];
    let end = after.find(']')?;
    let label = &after[..end];
    (!label.is_empty()).then(|| label.to_string())
}

/// Collect backtick-quoted tokens in document order, up to `max` of them.
/// An unpaired trailing backtick opens no token.
fn backtick_tokens(rest: &str, max: usize) -> Vec<String> {
    let segments: Vec<&str> = rest.split('`').collect();
    let mut tokens = Vec::new();
    let mut i = 1;
    // Odd-indexed segments sit between backticks; the last segment is only
    // enclosed if a closing backtick follows it.
    while i < segments.len().saturating_sub(1) {
        if !segments[i].is_empty() {
            tokens.push(segments[i].to_string());
            if tokens.len() == max {
                break;
            }
        }
        i += 2;
    }
    tokens
}

/// Extract the numeric rating from a score value like `⭐⭐⭐⭐ (4/5)`.
fn score_value(rest: &str) -> Option<String> {
    let open = rest.find('(')?;
    let after = &rest[open + 1..];
    let end = after.find("/5)")?;
    let digits = &after[..end];
    (!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
        .then(|| digits.to_string())
}
