//! OpenAI-compatible `/chat/completions` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use blogdraft_shared::{BlogDraftError, OpenAiConfig, Result, resolve_secret};

use crate::ChatCompletion;
use crate::types::{ChatRequest, ChatResponse};

/// User-Agent string for provider requests.
const USER_AGENT: &str = concat!("blogdraft/", env!("CARGO_PKG_VERSION"));

/// Request timeout for chat completions.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Resolved provider settings.
#[derive(Debug, Clone)]
pub struct OpenAiClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl OpenAiClientConfig {
    /// Resolve the API key from the env var named in `config`.
    pub fn from_env(config: &OpenAiConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            api_key: resolve_secret(&config.api_key_env)?,
            timeout: REQUEST_TIMEOUT,
        })
    }
}

/// Chat-completions client.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(config: OpenAiClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| BlogDraftError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    #[instrument(skip_all, fields(model = %request.model, messages = request.messages.len()))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| BlogDraftError::Network(format!("chat completion: {e}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            BlogDraftError::Network(format!("chat completion: body read failed: {e}"))
        })?;

        if !status.is_success() {
            return Err(BlogDraftError::generation(format!(
                "HTTP {status}: {}",
                error_message(&body)
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| BlogDraftError::parse(format!("invalid chat completion response: {e}")))?;
        debug!(choices = parsed.choices.len(), "chat completion received");
        Ok(parsed)
    }
}

/// `error.message` from an OpenAI-style error body, else the raw body head.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.chars().take(200).collect())
}
