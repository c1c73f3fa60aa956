//! Blog search summaries scraped from Naver's "VIEW" search tab.
//!
//! Best effort by nature: one request, no pagination. Missing markup
//! degrades to empty fields; only transport failures are errors.

mod parser;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use blogdraft_shared::{BlogDraftError, Result, SearchConfig};

pub use parser::{MAX_SUMMARIES, Summary, parse_summaries};

/// Browser-like User-Agent; the search page serves a stripped layout to unknown agents.
const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; blogdraft/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Fetches and parses blog search result pages.
pub struct SearchClient {
    client: Client,
    base_url: Url,
}

impl SearchClient {
    /// Build a client for the configured search page.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            BlogDraftError::config(format!("invalid search base_url '{}': {e}", config.base_url))
        })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BlogDraftError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// The results-page URL for `query`, with the query URL-encoded.
    pub fn search_url(&self, query: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("where", "view")
            .append_pair("sm", "tab_jum")
            .append_pair("query", query);
        url
    }

    /// Fetch the results page for `query` and return at most
    /// [`MAX_SUMMARIES`] summaries in document order.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn search_summaries(&self, query: &str) -> Result<Vec<Summary>> {
        let url = self.search_url(query);
        debug!(%url, "fetching search results");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| BlogDraftError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BlogDraftError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BlogDraftError::Network(format!("{url}: body read failed: {e}")))?;

        let summaries = parse_summaries(&body);
        info!(count = summaries.len(), "search summaries extracted");
        Ok(summaries)
    }
}
