//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod logging;
pub mod plugins;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::plugins::PluginsConfig;

use crate::error::PluginError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Plugin host settings.
    #[serde(default)]
    pub plugins: PluginsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific
    /// overlay and environment variables prefixed with `CURATOR`.
    pub fn load(env: &str) -> Result<Self, PluginError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CURATOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| PluginError::config(format!("failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| PluginError::config(format!("failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.plugins.max_auth_failures, 2);
        assert_eq!(config.plugins.retry_delays_ms, vec![1000, 5000]);
        assert_eq!(config.logging.level, "info");
    }
}
