//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Log level and output format.
    pub logging: LoggingConfig,

    /// Names of the legacy server variables read by the adapter.
    pub server_variables: ServerVariableNames,

    /// Request host settings.
    pub host: HostConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback filter when `RUST_LOG` is unset (e.g. "info", "feature_bridge=debug").
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for development.
    #[default]
    Pretty,
    /// One JSON object per event, for production.
    Json,
}

/// Server variable names the connection and request capabilities read.
///
/// Defaults are the names IIS publishes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerVariableNames {
    pub protocol: String,
    pub remote_addr: String,
    pub local_addr: String,
    pub remote_port: String,
    pub local_port: String,
}

impl Default for ServerVariableNames {
    fn default() -> Self {
        Self {
            protocol: "SERVER_PROTOCOL".to_string(),
            remote_addr: "REMOTE_ADDR".to_string(),
            local_addr: "LOCAL_ADDR".to_string(),
            remote_port: "REMOTE_PORT".to_string(),
            local_port: "SERVER_PORT".to_string(),
        }
    }
}

impl ServerVariableNames {
    /// `(field, value)` pairs, for validation messages.
    pub(crate) fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("protocol", &self.protocol),
            ("remote_addr", &self.remote_addr),
            ("local_addr", &self.local_addr),
            ("remote_port", &self.remote_port),
            ("local_port", &self.local_port),
        ]
    }
}

/// Request host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HostConfig {
    /// When false, registered modules are skipped and only the handler runs.
    pub modules_enabled: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            modules_enabled: true,
        }
    }
}
