//! The chat relay handler: one inbound event in, one outbound response out.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use chat_relay_core::{Config, ConfigError, RelayProfile};

use crate::event::{InboundEvent, InvocationContext, OutboundResponse};
use crate::prompt::{HISTORY_LIMIT, PromptError, build_prompt};
use crate::providers::{OpenAiClientFactory, ProviderError, ProviderFactory};

pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const MESSAGE_REQUIRED: &str = "Message is required";
pub const API_KEY_NOT_CONFIGURED: &str = "OpenAI API key not configured";

/// Failures after method dispatch. The `Display` text is returned to the
/// caller verbatim in the `error` field of a 500 response.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("Request body must be a JSON string, not null")]
    NullBody,

    #[error("Request body must be a JSON object")]
    BodyNotObject,

    #[error("Field 'message' must be a string")]
    MessageNotString,

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Fields extracted from a POST body.
#[derive(Debug)]
struct ChatRequest {
    message: String,
    /// Validated only when the prompt is assembled.
    history: Value,
}

impl ChatRequest {
    /// `None` is an absent body, `Some(None)` an explicit `null`.
    fn parse(body: Option<Option<&str>>) -> Result<Self, RelayError> {
        let raw = match body {
            None => "{}",
            Some(Some(raw)) => raw,
            Some(None) => return Err(RelayError::NullBody),
        };
        let value: Value = serde_json::from_str(raw)?;
        let Value::Object(mut fields) = value else {
            return Err(RelayError::BodyNotObject);
        };

        let message = match fields.remove("message") {
            None => String::new(),
            Some(Value::String(message)) => message.trim().to_string(),
            Some(_) => return Err(RelayError::MessageNotString),
        };
        let history = fields
            .remove("history")
            .unwrap_or_else(|| Value::Array(Vec::new()));

        Ok(Self { message, history })
    }
}

/// Relays a chat message plus recent history to the completion provider.
///
/// Stateless across invocations: the profile and key are fixed at
/// construction and a fresh provider client is built for every call.
pub struct ChatRelayHandler {
    profile: RelayProfile,
    api_key: Option<String>,
    providers: Arc<dyn ProviderFactory>,
}

impl ChatRelayHandler {
    pub fn new(
        profile: RelayProfile,
        api_key: Option<String>,
        providers: Arc<dyn ProviderFactory>,
    ) -> Self {
        Self {
            profile,
            api_key: api_key.filter(|key| !key.is_empty()),
            providers,
        }
    }

    /// Handler for the active profile, talking to the configured OpenAI endpoint.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let factory = OpenAiClientFactory::new(config.openai_base_url())
            .with_dump_queries(config.settings.logging.dump_queries);

        Ok(Self::new(
            config.active_profile()?,
            config.openai_api_key().map(str::to_string),
            Arc::new(factory),
        ))
    }

    pub fn profile(&self) -> &RelayProfile {
        &self.profile
    }

    /// Handle one invocation. Always produces exactly one response.
    pub async fn handle(&self, event: &InboundEvent, ctx: &InvocationContext) -> OutboundResponse {
        let method = event.method();

        let response = match method {
            "OPTIONS" => OutboundResponse::preflight(),
            "POST" => match self.relay(event, ctx).await {
                Ok(response) => response,
                Err(e) => {
                    error!(request_id = %ctx.request_id, "Chat relay failed: {}", e);
                    OutboundResponse::error(500, e.to_string())
                }
            },
            _ => OutboundResponse::error(405, METHOD_NOT_ALLOWED),
        };

        info!(
            request_id = %ctx.request_id,
            method,
            status = response.status_code,
            "Handled chat request"
        );
        response
    }

    async fn relay(
        &self,
        event: &InboundEvent,
        ctx: &InvocationContext,
    ) -> Result<OutboundResponse, RelayError> {
        let request = ChatRequest::parse(event.body.as_ref().map(Option::as_deref))?;

        if request.message.is_empty() {
            warn!(request_id = %ctx.request_id, "Rejected request without message");
            return Ok(OutboundResponse::error(400, MESSAGE_REQUIRED));
        }

        let Some(api_key) = self.api_key.as_deref() else {
            error!(request_id = %ctx.request_id, "OPENAI_API_KEY is not set");
            return Ok(OutboundResponse::error(500, API_KEY_NOT_CONFIGURED));
        };

        if let Some(len) = request.history.as_array().map(Vec::len)
            && len > HISTORY_LIMIT
        {
            debug!(
                request_id = %ctx.request_id,
                "Dropping {} oldest history entries",
                len - HISTORY_LIMIT
            );
        }
        let messages = build_prompt(&self.profile.system_prompt, &request.history, &request.message)?;

        let provider = self.providers.create(api_key, &self.profile.model)?;
        debug!(
            request_id = %ctx.request_id,
            "Sending {} messages to {}/{}",
            messages.len(),
            provider.name(),
            provider.model()
        );
        let reply = provider
            .send_conversation(messages, &self.profile.sampling)
            .await?;

        if let Some(usage) = &reply.usage {
            debug!(
                request_id = %ctx.request_id,
                model = %reply.model,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Completion received"
            );
        }

        Ok(OutboundResponse::json(
            200,
            &json!({
                "message": reply.content,
                // Carries the platform correlation id, not a wall-clock time.
                "timestamp": ctx.request_id,
            }),
        ))
    }
}
