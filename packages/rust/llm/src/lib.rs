//! Chat-completion provider boundary.
//!
//! [`ChatCompletion`] is the seam the draft generator talks to;
//! [`OpenAiClient`] implements it against any `/chat/completions` endpoint.

mod openai;
mod types;

pub use openai::{OpenAiClient, OpenAiClientConfig};
pub use types::{ChatMessage, ChatRequest, ChatResponse, Choice, ChoiceMessage, Role};

use async_trait::async_trait;
use blogdraft_shared::Result;

/// A text-generation provider taking a role-tagged message list.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Run one completion. Transport and auth failures are errors; an
    /// answer without choices is not.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;
}
