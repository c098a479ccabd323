//! Structured logging for Desmos.
//!
//! The binding engine emits `tracing` events with the structured fields
//! `field`, `source` and `param`: `trace` for every successful bind, `debug`
//! for lenient skips, required misses, type mismatches and unsupported body
//! codecs. This module installs a `tracing-subscriber` pipeline that renders
//! them as JSON (production) or pretty text (development).
//!
//! # Example
//!
//! ```rust,ignore
//! use desmos_telemetry::logging::{LogConfig, init_logging};
//!
//! init_logging(&LogConfig::development())?;
//!
//! tracing::debug!(field = "user.age", source = "json", "required parameter missing");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directives (e.g., "info", "desmos_bind=trace,info").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include thread IDs.
    pub thread_ids: bool,

    /// Whether to include target (module path).
    pub include_target: bool,

    /// Whether to emit ANSI colors (pretty format only).
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            ansi: false,
        }
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    ///
    /// Binding events from `desmos_bind` are shown down to `debug`.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "desmos_bind=debug,info".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            ansi: true,
            ..Self::default()
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Checks the configuration without installing anything.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::InvalidConfig` if the level is empty or not a
    /// valid filter.
    pub fn validate(&self) -> TelemetryResult<()> {
        if self.level.trim().is_empty() {
            return Err(TelemetryError::InvalidConfig(
                "log level must not be empty".to_string(),
            ));
        }
        EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| TelemetryError::InvalidConfig(format!("invalid log level: {e}")))
    }
}

/// Initializes the logging subsystem.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the filter is invalid or a global
/// subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_ansi(config.ansi)
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    tracing::debug!(
        level = %config.level,
        json = config.json_format,
        span_events = config.span_events,
        "logging initialized"
    );

    Ok(())
}

/// Creates an env filter from a directive string.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the directives do not parse.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))
}
