//! Notion API client.
//!
//! Two calls are made against the workspace API: a read-only search used as
//! the pre-flight database probe, and one page creation per new record. The
//! client sits behind the [`NotionApi`] trait so the sync engine can be
//! exercised against an in-memory fake in tests.
//!
//! # Request shape
//!
//! Every request carries the integration token as a bearer credential and a
//! pinned `Notion-Version` header. The create-page payload uses the fixed
//! database schema: `Title`, `Summary`, `KeyPoints`, `URL`, `Source`,
//! `Score`, `Rank`, `ReportDate`, and `Keywords`. Rich-text values are cut
//! to the API's 2000-character property limit before submission.

use crate::error::{Error, Result};
use crate::models::ArticleRecord;
use crate::utils::truncate_chars;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Base URL of the workspace API.
pub const NOTION_API_BASE: &str = "https://api.notion.com/v1/";
/// Pinned API revision sent with every request.
pub const NOTION_VERSION: &str = "2022-06-28";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const RICH_TEXT_LIMIT: usize = 2000;

/// A completed HTTP exchange: the status code and the raw response body.
///
/// Any completed response, success or not, is represented here. Transport
/// failures (the request never completed) surface as [`Error::Network`]
/// instead.
#[derive(Debug)]
pub struct PageResponse {
    pub status: u16,
    pub body: String,
}

/// The two workspace API operations the sync engine depends on.
pub trait NotionApi {
    /// Read-only probe confirming the target database is reachable and
    /// shared with the integration. Returns the database's display title.
    async fn verify_database(&self) -> Result<String>;

    /// Submit one create-page request for a record.
    ///
    /// `Ok` for any completed response regardless of status; `Err` only
    /// when the request itself failed in transport.
    async fn create_page(&self, article: &ArticleRecord, report_date: &str)
    -> Result<PageResponse>;
}

/// HTTP implementation of [`NotionApi`] backed by a shared `reqwest` client
/// with a fixed 30-second timeout.
#[derive(Debug)]
pub struct NotionClient {
    http: reqwest::Client,
    api_key: String,
    database_id: String,
    pages_url: Url,
    search_url: Url,
}

impl NotionClient {
    pub fn new(api_key: String, database_id: String) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        let base = Url::parse(NOTION_API_BASE).expect("base API URL is valid");
        let pages_url = base.join("pages").expect("pages endpoint is valid");
        let search_url = base.join("search").expect("search endpoint is valid");
        Ok(Self {
            http,
            api_key,
            database_id,
            pages_url,
            search_url,
        })
    }
}

impl NotionApi for NotionClient {
    #[instrument(level = "info", skip_all, fields(database_id = %self.database_id))]
    async fn verify_database(&self) -> Result<String> {
        let filter = json!({"filter": {"property": "object", "value": "database"}});
        let response = self
            .http
            .post(self.search_url.clone())
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&filter)
            .send()
            .await
            .map_err(|e| Error::DatabaseAccess(format!("probe request failed: {e}")))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(Error::DatabaseAccess(format!("API error: {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::DatabaseAccess(format!("probe response unreadable: {e}")))?;

        let wanted = normalize_id(&self.database_id);
        let results = body.get("results").and_then(Value::as_array);
        for database in results.into_iter().flatten() {
            let id = database.get("id").and_then(Value::as_str).unwrap_or_default();
            if normalize_id(id) == wanted {
                let title = database
                    .get("title")
                    .and_then(|t| t.get(0))
                    .and_then(|t| t.get("plain_text"))
                    .and_then(Value::as_str)
                    .unwrap_or("Untitled");
                return Ok(title.to_string());
            }
        }
        Err(Error::DatabaseAccess(
            "database not found or not shared with the integration".to_string(),
        ))
    }

    #[instrument(level = "debug", skip_all, fields(title = %article.title))]
    async fn create_page(
        &self,
        article: &ArticleRecord,
        report_date: &str,
    ) -> Result<PageResponse> {
        let payload = page_payload(&self.database_id, article, report_date);
        let response = self
            .http
            .post(self.pages_url.clone())
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        debug!(status, "Create-page request completed");
        Ok(PageResponse { status, body })
    }
}

/// Build the create-page request body for one record.
///
/// The database id comparison and this property layout are the only places
/// that know the target schema. The article url is passed through with no
/// validation, empty urls included.
pub fn page_payload(database_id: &str, article: &ArticleRecord, report_date: &str) -> Value {
    json!({
        "parent": {"database_id": database_id},
        "properties": {
            "Title": {"title": [{"text": {"content": article.title}}]},
            "Summary": {
                "rich_text": [{"text": {"content": truncate_chars(&article.summary, RICH_TEXT_LIMIT)}}]
            },
            "KeyPoints": {
                "rich_text": [{"text": {"content": truncate_chars(&article.key_points, RICH_TEXT_LIMIT)}}]
            },
            "URL": {"url": article.url},
            "Source": {"select": {"name": article.source}},
            "Score": {"select": {"name": article.score}},
            "Rank": {"number": article.rank},
            "ReportDate": {"date": {"start": report_date}},
            "Keywords": {
                "multi_select": article.keywords.iter().map(|kw| json!({"name": kw})).collect::<Vec<_>>()
            },
        }
    })
}

/// Database ids are compared with dashes stripped; the API reports them
/// dashed while configs routinely hold the compact form.
fn normalize_id(id: &str) -> String {
    id.chars().filter(|c| *c != '-').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_article() -> ArticleRecord {
        ArticleRecord {
            rank: 2,
            title: "A title".to_string(),
            summary: "A summary".to_string(),
            key_points: "1. one\n2. two".to_string(),
            url: "https://example.com/a".to_string(),
            source: "HackerNews".to_string(),
            keywords: vec!["ai".to_string(), "llm".to_string()],
            score: "4".to_string(),
        }
    }

    #[test]
    fn test_payload_shape() {
        let payload = page_payload("db-123", &sample_article(), "2025-11-03");

        assert_eq!(payload["parent"]["database_id"], "db-123");
        let props = &payload["properties"];
        assert_eq!(props["Title"]["title"][0]["text"]["content"], "A title");
        assert_eq!(
            props["Summary"]["rich_text"][0]["text"]["content"],
            "A summary"
        );
        assert_eq!(props["URL"]["url"], "https://example.com/a");
        assert_eq!(props["Source"]["select"]["name"], "HackerNews");
        assert_eq!(props["Score"]["select"]["name"], "4");
        assert_eq!(props["Rank"]["number"], 2);
        assert_eq!(props["ReportDate"]["date"]["start"], "2025-11-03");
        assert_eq!(props["Keywords"]["multi_select"][0]["name"], "ai");
        assert_eq!(props["Keywords"]["multi_select"][1]["name"], "llm");
    }

    #[test]
    fn test_payload_truncates_rich_text() {
        let mut article = sample_article();
        article.summary = "s".repeat(3000);
        article.key_points = "p".repeat(2500);

        let payload = page_payload("db", &article, "2025-11-03");
        let summary = payload["properties"]["Summary"]["rich_text"][0]["text"]["content"]
            .as_str()
            .unwrap();
        let key_points = payload["properties"]["KeyPoints"]["rich_text"][0]["text"]["content"]
            .as_str()
            .unwrap();
        assert_eq!(summary.chars().count(), 2000);
        assert_eq!(key_points.chars().count(), 2000);
    }

    #[test]
    fn test_payload_passes_empty_url_through() {
        let mut article = sample_article();
        article.url = String::new();
        let payload = page_payload("db", &article, "2025-11-03");
        assert_eq!(payload["properties"]["URL"]["url"], "");
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(
            normalize_id("12345678-abcd-ef00-1234-567890abcdef"),
            "12345678abcdef001234567890abcdef"
        );
        assert_eq!(normalize_id("plain"), "plain");
    }
}
