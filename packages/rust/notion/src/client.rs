//! Notion REST client implementing [`RowStore`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use blogdraft_shared::{BlogDraftError, NotionConfig, Result, Row, resolve_secret};

use crate::store::{MAX_BLOCKS_PER_APPEND, RowStore};

/// API version pinned in every request.
pub const NOTION_VERSION: &str = "2022-06-28";

/// User-Agent string for Notion requests.
const USER_AGENT: &str = concat!("blogdraft/", env!("CARGO_PKG_VERSION"));

/// Largest page Notion returns for a database query.
const QUERY_PAGE_SIZE: u32 = 100;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Resolved connection settings (secrets already read from the environment).
#[derive(Debug, Clone)]
pub struct NotionClientConfig {
    pub base_url: String,
    pub token: String,
    pub database_id: String,
    pub timeout: Duration,
}

impl NotionClientConfig {
    /// Resolve the token and database id from the env vars named in `config`.
    pub fn from_env(config: &NotionConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            token: resolve_secret(&config.api_key_env)?,
            database_id: resolve_secret(&config.database_id_env)?,
            timeout: Duration::from_secs(30),
        })
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<Row>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for a single Notion database.
pub struct NotionClient {
    client: Client,
    base_url: String,
    token: String,
    database_id: String,
}

impl NotionClient {
    /// Build the HTTP client. No request is made here.
    pub fn new(config: NotionClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| BlogDraftError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
            database_id: config.database_id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Attach auth headers, send, and decode a JSON body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, context: &str) -> Result<T> {
        let response = request
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await
            .map_err(|e| BlogDraftError::Network(format!("{context}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BlogDraftError::Network(format!("{context}: body read failed: {e}")))?;

        if !status.is_success() {
            return Err(BlogDraftError::store(format!(
                "{context}: HTTP {status}: {}",
                error_message(&body)
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| BlogDraftError::parse(format!("{context}: invalid response: {e}")))
    }
}

#[async_trait]
impl RowStore for NotionClient {
    #[instrument(skip_all, fields(column = %column))]
    async fn query_unchecked(&self, column: &str) -> Result<Vec<Row>> {
        let url = self.url(&format!("databases/{}/query", self.database_id));
        let mut rows = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = json!({
                "filter": {
                    "property": column,
                    "checkbox": { "equals": false },
                },
                "page_size": QUERY_PAGE_SIZE,
            });
            if let Some(c) = &cursor {
                body["start_cursor"] = Value::String(c.clone());
            }

            let page: QueryResponse = self
                .send(self.client.post(&url).json(&body), "database query")
                .await?;
            debug!(count = page.results.len(), has_more = page.has_more, "query page");
            rows.extend(page.results);

            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        Ok(rows)
    }

    #[instrument(skip_all, fields(row_id = %row_id, column = %column))]
    async fn set_checkbox(&self, row_id: &str, column: &str, value: bool) -> Result<()> {
        let mut properties = serde_json::Map::new();
        properties.insert(column.to_string(), json!({ "checkbox": value }));
        let body = json!({ "properties": properties });

        let _: Value = self
            .send(
                self.client.patch(self.url(&format!("pages/{row_id}"))).json(&body),
                "page update",
            )
            .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(row_id = %row_id, blocks = chunks.len()))]
    async fn append_paragraphs(&self, row_id: &str, chunks: &[String]) -> Result<()> {
        let url = self.url(&format!("blocks/{row_id}/children"));

        for batch in chunks.chunks(MAX_BLOCKS_PER_APPEND) {
            let children: Vec<Value> = batch.iter().map(|text| paragraph_block(text)).collect();
            let body = json!({ "children": children });

            let _: Value = self
                .send(self.client.patch(&url).json(&body), "block append")
                .await?;
            debug!(appended = batch.len(), "appended paragraph batch");
        }

        Ok(())
    }
}

/// A paragraph block holding one plain-text span.
fn paragraph_block(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": {
            "rich_text": [
                { "type": "text", "text": { "content": text } }
            ],
        },
    })
}

/// Best-effort human message from a Notion error body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) if !err.message.is_empty() => format!("{} ({})", err.message, err.code),
        _ => body.chars().take(200).collect(),
    }
}
