//! Configuration schema definitions.
//!
//! All types derive Serde traits and default every field, so an empty file
//! is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::facade::level::Level;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub diagnostics: DiagnosticsConfig,
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level of the facade. Reloaded when the file changes.
    pub level: Level,

    pub format: LogFormat,

    /// Report only the file name of a call site, not its full path.
    pub source_basename: bool,

    /// `EnvFilter` directives for the subscriber. `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::Debug,
            format: LogFormat::Json,
            source_basename: true,
            filter: "info,recoverlog=trace".to_string(),
        }
    }
}

/// Diagnostics HTTP endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub enabled: bool,

    pub bind_address: String,

    /// Install the Prometheus recorder and serve `/metrics`.
    pub metrics: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "127.0.0.1:6060".to_string(),
            metrics: true,
        }
    }
}
