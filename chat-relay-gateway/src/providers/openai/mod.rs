//! OpenAI Chat Completions provider.

pub mod client;

pub use client::{OpenAiClient, OpenAiClientFactory};
