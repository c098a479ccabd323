//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use serde_json::Value;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, DesmosConfig, LogFormat};

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values (or a preset)
/// 2. Configuration files and strings (TOML or JSON), in call order
/// 3. Environment variables
///
/// A file or string layer only overrides the keys it sets; every other key
/// keeps the value of the layers below it.
///
/// # Example
///
/// ```no_run
/// use desmos_config::ConfigLoader;
///
/// # fn main() -> Result<(), desmos_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("desmos.toml")?
///     .with_env_prefix("DESMOS")
///     .load()?;
///
/// let options = config.bind_options();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: DesmosConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: DesmosConfig::default(),
            env_prefix: None,
        }
    }

    /// Start with default configuration values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = DesmosConfig::default();
        self
    }

    /// Start with the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use desmos_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.binding.check_optional_json);
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = DesmosConfig::development();
        self
    }

    /// Start with the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = DesmosConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format (TOML or JSON) is determined by the file extension. Keys
    /// set in the file override the current configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;
        let layer = parse_layer(&content, format)?;
        self.merge_layer(layer)?;
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in `format` ("toml" or "json").
    ///
    /// Keys set in the string override the current configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unknown.
    ///
    /// # Example
    ///
    /// ```
    /// use desmos_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [binding]
    ///     max_body_bytes = 4096
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.binding.max_body_bytes, 4096);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let layer = parse_layer(content, format)?;
        self.merge_layer(layer)?;
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY`, for example
    /// `DESMOS__BINDING__MAX_BODY_BYTES=65536`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file from the current directory or its parents, if any.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a `.env` file exists but cannot be read.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(ConfigError::Dotenv(e.to_string())),
        }
    }

    /// Load environment variables from the `.env`-style file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or malformed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match dotenvy::from_path(path) {
            Ok(()) => Ok(self),
            Err(e) if e.not_found() => Err(ConfigError::file_not_found(path)),
            Err(dotenvy::Error::Io(io)) => Err(ConfigError::read_error(path, io)),
            Err(e) => Err(ConfigError::Dotenv(format!("{}: {e}", path.display()))),
        }
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or validation
    /// fails.
    pub fn load(mut self) -> Result<DesmosConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> DesmosConfig {
        self.config
    }

    fn merge_layer(&mut self, layer: Value) -> Result<(), ConfigError> {
        let mut merged = serde_json::to_value(&self.config)?;
        merge_values(&mut merged, layer);
        self.config = serde_json::from_value(merged)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let env_vars: HashMap<String, String> = env::vars()
            .filter(|(k, _)| k.starts_with(&marker))
            .collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["BINDING", "CHECK_OPTIONAL_JSON"] => {
                self.config.binding.check_optional_json = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["BINDING", "MAX_BODY_BYTES"] => {
                self.config.binding.max_body_bytes = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["BINDING", "DEFAULT_CONTENT_TYPE"] => {
                self.config.binding.default_content_type = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }

            ["TELEMETRY", "SERVICE_NAME"] => {
                self.config.telemetry.service_name = value.to_string();
            }
            ["TELEMETRY", "ENVIRONMENT"] => {
                self.config.telemetry.environment = value.to_string();
            }

            ["TELEMETRY", "LOGGING", "ENABLED"] => {
                self.config.telemetry.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["TELEMETRY", "LOGGING", "LEVEL"] => {
                self.config.telemetry.logging.level = value.to_string();
            }
            ["TELEMETRY", "LOGGING", "FORMAT"] => {
                self.config.telemetry.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["TELEMETRY", "LOGGING", "ANSI_ENABLED"] => {
                self.config.telemetry.logging.ansi_enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["TELEMETRY", "LOGGING", "INCLUDE_LOCATION"] => {
                self.config.telemetry.logging.include_location = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            // Unknown keys are ignored
            _ => {}
        }

        Ok(())
    }
}

/// Parses one layer into a JSON tree holding only the keys it sets.
///
/// The layer is also decoded as a full [`DesmosConfig`] first, so unknown keys
/// and mistyped values fail with the error of the layer's own format.
fn parse_layer(content: &str, format: &str) -> Result<Value, ConfigError> {
    match format.to_lowercase().as_str() {
        "toml" => {
            toml::from_str::<DesmosConfig>(content)?;
            Ok(toml::from_str(content)?)
        }
        "json" => {
            serde_json::from_str::<DesmosConfig>(content)?;
            Ok(serde_json::from_str(content)?)
        }
        _ => Err(ConfigError::UnsupportedFormat(format.to_string())),
    }
}

// Objects merge key by key; anything else in `layer` replaces `base`.
fn merge_values(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
