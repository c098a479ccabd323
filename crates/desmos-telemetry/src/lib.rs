//! Logging setup for Desmos services.
//!
//! Desmos crates log through `tracing`; this crate owns the subscriber side:
//!
//! - **Logging**: JSON or pretty output via `tracing-subscriber`, filtered by
//!   `EnvFilter` directives.
//!
//! # Example
//!
//! ```rust
//! use desmos_telemetry::{init_logging, LogConfig};
//!
//! let config = LogConfig {
//!     enabled: false,
//!     ..LogConfig::default()
//! };
//! init_logging(&config).unwrap();
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
