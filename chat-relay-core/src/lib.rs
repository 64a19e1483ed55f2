pub mod config;
pub mod profile;

// Config re-exports
pub use config::{
    Config,
    ConfigError,
    GatewaySettings,
    LoggingSettings,
    OpenAiSettings,
    Secrets,
    Settings,
    SettingsError,
};

// Profile re-exports
pub use profile::{DEFAULT_PROFILE, ProfileConfig, RelayProfile, SamplingParams};
