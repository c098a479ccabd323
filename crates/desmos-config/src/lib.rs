//! Typed configuration for Desmos.
//!
//! This crate provides a strongly-typed configuration layer with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`DesmosConfig`] holds two sections:
//!
//! - [`BindingConfig`] - request materialization and body checks, converted
//!   into [`desmos_bind::BindOptions`]
//! - [`TelemetryConfigSection`] - service identity and logging, converted
//!   into [`desmos_telemetry::LogConfig`]
//!
//! # Example
//!
//! ```no_run
//! use desmos_config::ConfigLoader;
//!
//! # fn main() -> Result<(), desmos_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("desmos.toml")?
//!     .with_env_prefix("DESMOS")
//!     .load()?;
//!
//! println!("body limit: {} bytes", config.binding.max_body_bytes);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [binding]
//! check_optional_json = false
//! max_body_bytes = 2097152
//! default_content_type = "application/json"
//!
//! [telemetry]
//! service_name = "my-service"
//! environment = "production"
//!
//! [telemetry.logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables:
//!
//! - `DESMOS__BINDING__MAX_BODY_BYTES=65536`
//! - `DESMOS__BINDING__CHECK_OPTIONAL_JSON=true`
//! - `DESMOS__TELEMETRY__LOGGING__LEVEL=desmos_bind=debug,info`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
