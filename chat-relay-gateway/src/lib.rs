pub mod event;
pub mod handler;
pub mod prompt;
pub mod providers;
pub mod server;

pub use event::{InboundEvent, InvocationContext, OutboundResponse};
pub use handler::{ChatRelayHandler, RelayError};
pub use providers::provider::{
    Provider, ProviderError, ProviderFactory, ProviderResponse, ProviderUsage,
};
