//! Settings configuration loaded from TOML files.
//!
//! This module handles non-sensitive configuration stored in TOML format
//! in the XDG config directory (~/.config/chat-relay/config.toml).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::profile::{DEFAULT_PROFILE, ProfileConfig};

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "CHAT_RELAY_CONFIG_DIR";

/// Default TOML configuration file content
const DEFAULT_CONFIG_TOML: &str = r#"# chat-relay configuration file
# Located at: ~/.config/chat-relay/config.toml
#
# This file contains non-sensitive configuration.
# The provider key is loaded from the environment:
#   - OPENAI_API_KEY

# Active profile: "litvinov", "assistant" or a name under [profiles]
# (CHAT_RELAY_PROFILE overrides this value)
profile = "litvinov"

[gateway]
host = "127.0.0.1"
port = 3000

[openai]
base_url = "https://api.openai.com/v1"

[logging]
level = "info"
# dump_queries = true

[profiles]
# Example:
# [profiles.support]
# model = "gpt-4o-mini"
# system_prompt = "You are a concise support assistant."
# temperature = 0.5
# max_tokens = 800
# top_p = 0.9
"#;

/// Settings loaded from TOML configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Active profile name
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Custom profiles keyed by name (take precedence over built-ins)
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileConfig>,

    /// Gateway server configuration
    #[serde(default)]
    pub gateway: GatewaySettings,

    /// OpenAI endpoint configuration
    #[serde(default)]
    pub openai: OpenAiSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Gateway server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewaySettings {
    /// Host to bind to
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

/// OpenAI endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAiSettings {
    /// API base URL (`/v1` is appended when missing)
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

/// Logging settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Dump raw LLM request/response JSON to ./logs/queries/
    #[serde(default)]
    pub dump_queries: bool,
}

// Default value functions

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    3000
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            profiles: BTreeMap::new(),
            gateway: GatewaySettings::default(),
            openai: OpenAiSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dump_queries: false,
        }
    }
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config directory not found")]
    ConfigDirNotFound,
}

impl Settings {
    /// Load settings from the TOML configuration file.
    ///
    /// Falls back to defaults when no config directory can be resolved.
    pub fn load() -> Result<Self, SettingsError> {
        match Self::config_path() {
            Ok(path) => Self::load_from_path(&path),
            Err(SettingsError::ConfigDirNotFound) => {
                tracing::warn!("No configuration directory found, using default settings");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Load settings from a specific file path.
    ///
    /// A missing file yields defaults; writing the default file is attempted
    /// but a read-only filesystem only produces a warning.
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::info!("Creating default configuration at {:?}", path);
            if let Err(e) = Self::create_default_config(path) {
                tracing::warn!("Could not write default configuration: {}", e);
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)?;
        Ok(settings)
    }

    /// Get the configuration file path.
    ///
    /// Uses `$CHAT_RELAY_CONFIG_DIR/config.toml` when set, otherwise the XDG
    /// config directory: `~/.config/chat-relay/config.toml`
    pub fn config_path() -> Result<PathBuf, SettingsError> {
        if let Ok(override_dir) = std::env::var(CONFIG_DIR_ENV) {
            let dir = PathBuf::from(override_dir);
            return Ok(dir.join("config.toml"));
        }

        let config_dir = dirs::config_dir()
            .ok_or(SettingsError::ConfigDirNotFound)?
            .join("chat-relay");

        Ok(config_dir.join("config.toml"))
    }

    /// Create the default configuration file.
    fn create_default_config(path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, DEFAULT_CONFIG_TOML)?;

        Ok(())
    }

    /// Get the HTTP bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.gateway.host, self.gateway.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::ENV_MUTEX;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.profile, "litvinov");
        assert!(settings.profiles.is_empty());

        assert_eq!(settings.gateway.host, "127.0.0.1");
        assert_eq!(settings.gateway.port, 3000);

        assert_eq!(settings.openai.base_url, "https://api.openai.com/v1");

        assert_eq!(settings.logging.level, "info");
        assert!(!settings.logging.dump_queries);
    }

    #[test]
    fn test_default_toml_matches_defaults() {
        let parsed = Settings::from_toml(DEFAULT_CONFIG_TOML).expect("default toml parses");
        let defaults = Settings::default();

        assert_eq!(parsed.profile, defaults.profile);
        assert!(parsed.profiles.is_empty());
        assert_eq!(parsed.gateway.host, defaults.gateway.host);
        assert_eq!(parsed.gateway.port, defaults.gateway.port);
        assert_eq!(parsed.openai.base_url, defaults.openai.base_url);
        assert_eq!(parsed.logging.level, defaults.logging.level);
        assert_eq!(parsed.logging.dump_queries, defaults.logging.dump_queries);
    }

    #[test]
    fn test_bind_addr() {
        let settings = Settings::default();
        assert_eq!(settings.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
profile = "support"

[gateway]
host = "0.0.0.0"
port = 8080

[openai]
base_url = "http://127.0.0.1:9000"

[logging]
level = "debug"
dump_queries = true

[profiles.support]
model = "gpt-4o-mini"
system_prompt = "Be brief."
temperature = 0.5
max_tokens = 800
top_p = 0.9
"#;

        let settings = Settings::from_toml(toml).expect("parse failed");

        assert_eq!(settings.profile, "support");
        assert_eq!(settings.gateway.host, "0.0.0.0");
        assert_eq!(settings.gateway.port, 8080);
        assert_eq!(settings.openai.base_url, "http://127.0.0.1:9000");
        assert_eq!(settings.logging.level, "debug");
        assert!(settings.logging.dump_queries);

        let support = settings.profiles.get("support").expect("support profile");
        assert_eq!(support.model, "gpt-4o-mini");
        assert_eq!(support.system_prompt, "Be brief.");
        assert_eq!(support.temperature, 0.5);
        assert_eq!(support.max_tokens, 800);
        assert_eq!(support.top_p, Some(0.9));
        assert!(support.frequency_penalty.is_none());
        assert!(support.presence_penalty.is_none());
    }

    #[test]
    fn test_from_toml_partial() {
        let toml = r#"
[gateway]
port = 4000
"#;

        let settings = Settings::from_toml(toml).expect("parse failed");
        assert_eq!(settings.profile, "litvinov");
        assert_eq!(settings.gateway.host, "127.0.0.1");
        assert_eq!(settings.gateway.port, 4000);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_from_toml_rejects_incomplete_profile() {
        let toml = r#"
[profiles.broken]
model = "gpt-4o"
"#;

        assert!(matches!(
            Settings::from_toml(toml),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_load_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "profile = \"assistant\"\n\n[gateway]\nport = 4000\n\n[logging]\ndump_queries = true\n",
        )
        .unwrap();

        let loaded = Settings::load_from_path(&path).expect("load failed");

        assert_eq!(loaded.profile, "assistant");
        assert_eq!(loaded.gateway.port, 4000);
        assert!(loaded.logging.dump_queries);
    }

    #[test]
    fn test_load_missing_file_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let settings = Settings::load_from_path(&path).expect("load failed");

        assert_eq!(settings.profile, "litvinov");
        let written = fs::read_to_string(&path).expect("default config written");
        assert_eq!(written, DEFAULT_CONFIG_TOML);
    }

    #[test]
    fn test_config_path_uses_env_override() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let value = dir.path().to_string_lossy().to_string();

        // SAFETY: test-scoped env mutation, serialized by ENV_MUTEX.
        unsafe { std::env::set_var(CONFIG_DIR_ENV, &value) };
        let path = Settings::config_path().unwrap();
        // SAFETY: test-scoped env mutation cleanup.
        unsafe { std::env::remove_var(CONFIG_DIR_ENV) };

        assert_eq!(path, dir.path().join("config.toml"));
    }
}
