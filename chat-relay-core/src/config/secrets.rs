//! Secrets configuration loaded from environment variables only.
//!
//! The provider API key is sensitive and never stored in the settings file.

use std::env;

/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Secrets loaded exclusively from environment variables.
///
/// A missing key is not a load error: the relay reports it per request so
/// preflight and method checks keep working on a half-configured deployment.
#[derive(Clone, Default)]
pub struct Secrets {
    /// OpenAI API key (env: OPENAI_API_KEY)
    pub openai_api_key: Option<String>,
}

impl Secrets {
    /// Load secrets from environment variables.
    ///
    /// This also loads a `.env` file if present (for development),
    /// but production should rely on actual environment variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self::from_env_inner()
    }

    /// Internal method to load from environment without loading .env
    pub(crate) fn from_env_inner() -> Self {
        Self {
            openai_api_key: env::var(OPENAI_API_KEY_ENV)
                .ok()
                .filter(|key| !key.is_empty()),
        }
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
