//! Prompt assembly: fixed system turn, the tail of the caller's history, then
//! the current user message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of trailing history entries forwarded to the provider.
pub const HISTORY_LIMIT: usize = 10;

/// Speaker role for turns the relay creates itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
        }
    }
}

/// One message in the outgoing prompt.
///
/// History entries are forwarded as the caller sent them, so role and
/// content stay untyped JSON here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Value,
    pub content: Value,
}

impl PromptMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role: Value::String(role.as_str().to_string()),
            content: Value::String(content.into()),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("Field 'history' must be an array")]
    HistoryNotArray,

    #[error("History entry {index} must be an object with role and content")]
    MalformedEntry { index: usize },
}

/// Build the prompt sent to the provider.
///
/// Only the last [`HISTORY_LIMIT`] history entries are kept. A missing
/// `role` or `content` key is forwarded as `null`. An empty string counts
/// as an empty history.
pub fn build_prompt(
    system_prompt: &str,
    history: &Value,
    message: &str,
) -> Result<Vec<PromptMessage>, PromptError> {
    let entries: &[Value] = match history {
        Value::Array(entries) => entries.as_slice(),
        Value::String(s) if s.is_empty() => &[],
        _ => return Err(PromptError::HistoryNotArray),
    };
    let start = entries.len().saturating_sub(HISTORY_LIMIT);

    let mut messages = Vec::with_capacity(entries.len() - start + 2);
    messages.push(PromptMessage::new(ChatRole::System, system_prompt));

    for (index, entry) in entries.iter().enumerate().skip(start) {
        let fields = entry
            .as_object()
            .ok_or(PromptError::MalformedEntry { index })?;
        messages.push(PromptMessage {
            role: fields.get("role").cloned().unwrap_or(Value::Null),
            content: fields.get("content").cloned().unwrap_or(Value::Null),
        });
    }

    messages.push(PromptMessage::new(ChatRole::User, message));
    Ok(messages)
}
