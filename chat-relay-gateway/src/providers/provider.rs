//! Provider trait for the chat-completion backend.

use serde::{Deserialize, Serialize};

use chat_relay_core::SamplingParams;

use crate::prompt::PromptMessage;

/// Token usage reported by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Completion result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub id: String,
    pub model: String,
    /// Text of the first choice; `None` when the provider returned null content.
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<ProviderUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Provider error types
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Error code: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("No choices in response")]
    NoChoices,
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
}

/// Chat-completion backend
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Current model
    fn model(&self) -> &str;

    /// Send an assembled prompt and get the completion
    async fn send_conversation(
        &self,
        messages: Vec<PromptMessage>,
        sampling: &SamplingParams,
    ) -> Result<ProviderResponse, ProviderError>;
}

/// Builds a provider client for one invocation.
pub trait ProviderFactory: Send + Sync {
    fn create(&self, api_key: &str, model: &str) -> Result<Box<dyn Provider>, ProviderError>;
}
