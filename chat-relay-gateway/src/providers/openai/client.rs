//! OpenAI Chat Completions API client.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use chat_relay_core::SamplingParams;

use crate::prompt::PromptMessage;
use crate::providers::provider::{
    Provider, ProviderError, ProviderFactory, ProviderResponse, ProviderUsage,
};
use crate::providers::query_dump::QueryDump;

const PROVIDER_NAME: &str = "openai";

/// OpenAI API client.
///
/// No request timeout is configured: a generation may take as long as the
/// provider needs, bounded only by the hosting platform.
#[derive(Clone)]
pub struct OpenAiClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    dump_queries: bool,
}

/// Request body for the Chat Completions API
#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

/// Choice in the response
#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Usage information
#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl<'a> ChatCompletionsRequest<'a> {
    fn new(model: &'a str, messages: &'a [PromptMessage], sampling: &SamplingParams) -> Self {
        Self {
            model,
            messages,
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
            top_p: sampling.top_p,
            frequency_penalty: sampling.frequency_penalty,
            presence_penalty: sampling.presence_penalty,
        }
    }
}

impl OpenAiClient {
    /// Create a new OpenAI client.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
            dump_queries: false,
        })
    }

    /// Enable or disable debug query logging
    pub fn with_dump_queries(mut self, enabled: bool) -> Self {
        self.dump_queries = enabled;
        self
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", self.api_key);
        if let Ok(header_value) = HeaderValue::from_str(&auth_value) {
            headers.insert(AUTHORIZATION, header_value);
        }
        headers
    }

    fn chat_completions_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }

    /// Convert the API response, keeping only the first choice
    fn convert_response(response: ChatCompletionsResponse) -> Result<ProviderResponse, ProviderError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(ProviderError::NoChoices)?;

        Ok(ProviderResponse {
            id: response.id,
            model: response.model,
            content: choice.message.content,
            usage: response.usage.map(|u| ProviderUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
            finish_reason: choice.finish_reason,
        })
    }
}

#[async_trait::async_trait]
impl Provider for OpenAiClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send_conversation(
        &self,
        messages: Vec<PromptMessage>,
        sampling: &SamplingParams,
    ) -> Result<ProviderResponse, ProviderError> {
        let url = self.chat_completions_url();
        let request_body = ChatCompletionsRequest::new(&self.model, &messages, sampling);

        let dump = if self.dump_queries
            && let Ok(val) = serde_json::to_value(&request_body)
        {
            QueryDump::request(PROVIDER_NAME, &self.model, &val).await
        } else {
            None
        };

        let response = self
            .http_client
            .post(&url)
            .headers(self.auth_headers())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let response_text = response.text().await?;

        if let Some(dump) = &dump
            && let Ok(val) = serde_json::from_str::<Value>(&response_text)
        {
            dump.response(&val).await;
        }

        let completions_response: ChatCompletionsResponse = serde_json::from_str(&response_text)
            .map_err(|e| {
                let preview = if response_text.len() > 500 {
                    &response_text[..response_text.floor_char_boundary(500)]
                } else {
                    &response_text
                };
                ProviderError::InvalidFormat(format!(
                    "Failed to parse OpenAI response: {e}\nBody preview: {preview}"
                ))
            })?;
        Self::convert_response(completions_response)
    }
}

/// Builds an [`OpenAiClient`] per invocation.
#[derive(Debug, Clone)]
pub struct OpenAiClientFactory {
    base_url: String,
    dump_queries: bool,
}

impl OpenAiClientFactory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            dump_queries: false,
        }
    }

    pub fn with_dump_queries(mut self, enabled: bool) -> Self {
        self.dump_queries = enabled;
        self
    }
}

impl ProviderFactory for OpenAiClientFactory {
    fn create(&self, api_key: &str, model: &str) -> Result<Box<dyn Provider>, ProviderError> {
        let client = OpenAiClient::new(&self.base_url, api_key, model)?
            .with_dump_queries(self.dump_queries);
        Ok(Box::new(client))
    }
}
