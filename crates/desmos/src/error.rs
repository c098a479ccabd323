//! Unified error type.

use desmos_bind::{BindError, RequestError};
use desmos_config::ConfigError;
use desmos_telemetry::TelemetryError;
use http::StatusCode;
use thiserror::Error;

/// Any error raised while setting up or running request binding.
#[derive(Debug, Error)]
pub enum DesmosError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging could not be initialized.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The request could not be materialized.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// A field failed to bind.
    #[error(transparent)]
    Bind(#[from] BindError),
}

impl DesmosError {
    /// Returns the HTTP status code for this error.
    ///
    /// Setup failures map to 500; request and binding failures keep their
    /// own status.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Config(_) | Self::Telemetry(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Request(e) => e.status_code(),
            Self::Bind(e) => e.status_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desmos_bind::BindingRule;

    #[test]
    fn test_bind_error_keeps_status_and_message() {
        let rule = BindingRule::query("id").required(true).build();
        let err = DesmosError::from(rule.required_error().clone());

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), rule.required_error().to_string());
    }

    #[test]
    fn test_request_error_status() {
        let err = DesmosError::from(RequestError::PayloadTooLarge { max: 1, actual: 2 });
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_setup_errors_are_internal() {
        let err = DesmosError::from(ConfigError::invalid_value(
            "binding.max_body_bytes",
            "must be greater than 0",
        ));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = DesmosError::from(TelemetryError::LoggingInit("twice".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
