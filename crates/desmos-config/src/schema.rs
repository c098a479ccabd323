//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use desmos_bind::{BindOptions, DEFAULT_MAX_BODY_BYTES};
use desmos_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

/// Binding configuration section.
///
/// Controls how requests are materialized and how body rules are checked.
///
/// # Example
///
/// ```
/// use desmos_config::BindingConfig;
///
/// let config = BindingConfig {
///     check_optional_json: true,
///     max_body_bytes: 64 * 1024,
///     default_content_type: Some("application/json".to_string()),
/// };
/// let options = config.to_bind_options();
/// assert!(options.check_optional_json);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    /// Verify presence of optional JSON and protobuf fields too.
    #[serde(default)]
    pub check_optional_json: bool,

    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Content type assumed when a request has none.
    #[serde(default)]
    pub default_content_type: Option<String>,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            check_optional_json: false,
            max_body_bytes: default_max_body_bytes(),
            default_content_type: None,
        }
    }
}

impl BindingConfig {
    /// Converts the section into engine options.
    #[must_use]
    pub fn to_bind_options(&self) -> BindOptions {
        BindOptions {
            check_optional_json: self.check_optional_json,
            max_body_bytes: self.max_body_bytes,
            default_content_type: self.default_content_type.clone(),
        }
    }
}

impl From<&BindingConfig> for BindOptions {
    fn from(config: &BindingConfig) -> Self {
        config.to_bind_options()
    }
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or filter directives.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts the section into a subscriber configuration.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            json_format: self.format == LogFormat::Json,
            file_line_info: self.include_location,
            ansi: self.ansi_enabled,
            ..LogConfig::default()
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telemetry configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfigSection {
    /// Service name for log identification.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Deployment environment (e.g., "development", "staging", "production").
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TelemetryConfigSection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            environment: default_environment(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_service_name() -> String {
    "desmos-service".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_true() -> bool {
    true
}
