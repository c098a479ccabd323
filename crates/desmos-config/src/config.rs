//! Main configuration types.
//!
//! This module provides the top-level [`DesmosConfig`] struct and its builder.

use desmos_bind::{BindOptions, BodyCodec};
use desmos_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

use crate::{BindingConfig, ConfigError, LogFormat, TelemetryConfigSection};

/// Complete Desmos configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use desmos_config::DesmosConfig;
///
/// let config = DesmosConfig::default();
/// assert!(!config.binding.check_optional_json);
/// assert_eq!(config.bind_options().max_body_bytes, 2 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct DesmosConfig {
    /// Binding configuration.
    #[serde(default)]
    pub binding: BindingConfig,

    /// Telemetry configuration (logging).
    #[serde(default)]
    pub telemetry: TelemetryConfigSection,
}

impl DesmosConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> DesmosConfigBuilder {
        DesmosConfigBuilder::new()
    }

    /// Returns the options for the binding engine.
    #[must_use]
    pub fn bind_options(&self) -> BindOptions {
        self.binding.to_bind_options()
    }

    /// Returns the logging subscriber configuration.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        self.telemetry.logging.to_log_config()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `binding.max_body_bytes` is zero
    /// - `binding.default_content_type` names no codec binding supports
    /// - `telemetry.logging.level` is not a valid filter
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.binding.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "binding.max_body_bytes",
                "must be greater than 0",
            ));
        }

        if let Some(content_type) = &self.binding.default_content_type {
            if !BodyCodec::from_content_type(Some(content_type.as_str())).is_supported() {
                return Err(ConfigError::invalid_value(
                    "binding.default_content_type",
                    format!("no body codec for content type: {content_type}"),
                ));
            }
        }

        if self.telemetry.logging.enabled {
            self.log_config()
                .validate()
                .map_err(|e| ConfigError::invalid_value("telemetry.logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// - Pretty log formatting with ANSI colors
    /// - Binding events down to debug
    /// - Optional JSON fields checked for presence
    ///
    /// # Example
    ///
    /// ```
    /// use desmos_config::DesmosConfig;
    ///
    /// let config = DesmosConfig::development();
    /// assert!(config.binding.check_optional_json);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "desmos_bind=debug,info".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.ansi_enabled = true;
        config.telemetry.logging.include_location = true;
        config.telemetry.environment = "development".to_string();

        config.binding.check_optional_json = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// # Example
    ///
    /// ```
    /// use desmos_config::DesmosConfig;
    ///
    /// let config = DesmosConfig::production();
    /// assert_eq!(config.telemetry.logging.format, desmos_config::LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.logging.ansi_enabled = false;
        config.telemetry.environment = "production".to_string();

        config
    }
}

/// Builder for [`DesmosConfig`].
#[derive(Debug, Default)]
pub struct DesmosConfigBuilder {
    binding: Option<BindingConfig>,
    telemetry: Option<TelemetryConfigSection>,
}

impl DesmosConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the binding configuration.
    #[must_use]
    pub fn binding(mut self, binding: BindingConfig) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Set the telemetry configuration.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetryConfigSection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> DesmosConfig {
        DesmosConfig {
            binding: self.binding.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<DesmosConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
