//! Errors raised while loading and checking binding configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building a [`DesmosConfig`](crate::DesmosConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A config or `.env` file passed explicitly does not exist.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// A config or `.env` file exists but could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file extension or format name is neither TOML nor JSON.
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// A TOML layer is malformed or names an unknown section or key.
    #[error("failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A JSON layer is malformed, names an unknown key, or a merged layer
    /// has a value of the wrong type.
    #[error("failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A `.env` file has a line dotenvy cannot parse.
    #[error("failed to load .env file: {0}")]
    Dotenv(String),

    /// A loaded value breaks a `binding.*` or `telemetry.*` constraint, such
    /// as a zero `binding.max_body_bytes`.
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// Dotted key, e.g. `binding.default_content_type`.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A `PREFIX__SECTION__KEY` override does not parse.
    #[error("failed to parse environment variable {var}: {reason}")]
    EnvParseError {
        /// The environment variable name.
        var: String,
        /// Expected shape of the value.
        reason: String,
    },
}

impl ConfigError {
    /// Create a new file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new read error.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Create a new invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a new environment variable parse error.
    pub fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            reason: reason.into(),
        }
    }
}
