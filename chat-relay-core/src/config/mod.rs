//! Configuration management for chat-relay.
//!
//! Secrets come from environment variables, settings from a TOML file.
//!
//! # Configuration Sources
//!
//! ## Secrets (Environment Variables)
//! - `OPENAI_API_KEY` - OpenAI API key
//!
//! ## Overrides (Environment Variables)
//! - `CHAT_RELAY_CONFIG_DIR` - directory holding `config.toml`
//! - `CHAT_RELAY_PROFILE` - active profile name
//!
//! ## Settings (TOML File)
//! Located at `~/.config/chat-relay/config.toml`:
//! ```toml
//! profile = "litvinov"
//!
//! [gateway]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [openai]
//! base_url = "https://api.openai.com/v1"
//!
//! [logging]
//! level = "info"
//! ```

mod secrets;
mod settings;

use crate::profile::RelayProfile;

pub use secrets::{OPENAI_API_KEY_ENV, Secrets};
pub use settings::{
    CONFIG_DIR_ENV, GatewaySettings, LoggingSettings, OpenAiSettings, Settings, SettingsError,
};

/// Environment variable overriding the active profile.
pub const PROFILE_ENV: &str = "CHAT_RELAY_PROFILE";

/// Combined configuration containing both secrets and settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secrets loaded from environment variables
    pub secrets: Secrets,
    /// Settings loaded from TOML configuration file
    pub settings: Settings,
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Profile '{0}' is neither built in nor defined under [profiles]")]
    ProfileNotFound(String),
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file cannot be read or parsed, or if the
    /// active profile does not resolve.
    pub fn load() -> Result<Self, ConfigError> {
        let secrets = Secrets::from_env();
        let mut settings = Settings::load()?;

        if let Ok(profile) = std::env::var(PROFILE_ENV) {
            let profile = profile.trim();
            if !profile.is_empty() {
                settings.profile = profile.to_string();
            }
        }

        let config = Self { secrets, settings };
        config.active_profile()?;
        Ok(config)
    }

    /// Resolve the active profile.
    pub fn active_profile(&self) -> Result<RelayProfile, ConfigError> {
        self.profile(&self.settings.profile)
    }

    /// Resolve a profile by name; `[profiles.*]` entries shadow built-ins.
    pub fn profile(&self, name: &str) -> Result<RelayProfile, ConfigError> {
        if let Some(custom) = self.settings.profiles.get(name) {
            return Ok(custom.clone().into_profile(name));
        }
        RelayProfile::builtin(name).ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }

    /// Get the OpenAI API key (if configured).
    pub fn openai_api_key(&self) -> Option<&str> {
        self.secrets.openai_api_key.as_deref()
    }

    /// Get the OpenAI API base URL.
    pub fn openai_base_url(&self) -> &str {
        &self.settings.openai.base_url
    }

    /// Get the HTTP bind address.
    pub fn bind_addr(&self) -> String {
        self.settings.bind_addr()
    }
}
