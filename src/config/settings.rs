//! Configuration settings for the relay transport.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::TransportError;
use crate::transport::TeardownPolicy;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Relay endpoint configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayConfig {
    /// URI of the relay document on the client origin.
    #[serde(default)]
    pub client_uri: String,
    /// Origin of the server the relay talks to.
    #[serde(default)]
    pub server_uri: String,
}

/// Channel lifecycle configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// Id handed out to the first channel.
    #[serde(default)]
    pub first_id: u64,
    /// When a channel's relay frame is removed.
    #[serde(default)]
    pub teardown: TeardownPolicy,
    /// Seconds to wait for a relay response; 0 disables the watchdog.
    #[serde(default)]
    pub response_timeout_seconds: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format ("pretty" or "json").
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Exchange journal configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Whether completed exchanges are journaled.
    #[serde(default)]
    pub enabled: bool,
    /// Path to the journal file.
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("/var/log/xda/exchanges.log")
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            first_id: 0,
            teardown: TeardownPolicy::default(),
            response_timeout_seconds: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
        }
    }
}

impl ChannelConfig {
    /// The response timeout, if the watchdog is enabled.
    pub fn response_timeout(&self) -> Option<std::time::Duration> {
        (self.response_timeout_seconds > 0)
            .then(|| std::time::Duration::from_secs(self.response_timeout_seconds))
    }
}

impl Settings {
    /// Load settings from a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TransportError::Config {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;

        let settings = Self::from_toml(&content).map_err(|e| TransportError::Config {
            message: format!("Invalid config file '{}': {}", path.display(), e),
        })?;

        Ok(settings)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, TransportError> {
        let settings: Settings = toml::from_str(content).map_err(|e| TransportError::Config {
            message: format!("Failed to parse config: {}", e),
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate the settings.
    fn validate(&self) -> Result<(), TransportError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(TransportError::Config {
                message: format!(
                    "Invalid log level '{}'. Valid levels: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        let valid_formats = ["pretty", "json"];
        if !valid_formats.contains(&self.logging.format.to_lowercase().as_str()) {
            return Err(TransportError::Config {
                message: format!(
                    "Invalid log format '{}'. Valid formats: {:?}",
                    self.logging.format, valid_formats
                ),
            });
        }

        // A relay URI carries the channel id in its fragment
        if self.relay.client_uri.contains('#') {
            return Err(TransportError::Config {
                message: format!(
                    "Relay client URI '{}' must not contain a fragment",
                    self.relay.client_uri
                ),
            });
        }

        Ok(())
    }
}
