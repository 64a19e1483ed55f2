pub mod openai;
pub mod provider;
pub mod query_dump;

pub use openai::{OpenAiClient, OpenAiClientFactory};
pub use provider::{Provider, ProviderError, ProviderFactory, ProviderResponse, ProviderUsage};
