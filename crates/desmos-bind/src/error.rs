//! Binding error types.
//!
//! Errors are built once per [`BindingRule`](crate::BindingRule) and shared by
//! every request that trips them. A [`BindError`] is a cheap handle: cloning
//! it shares the same allocation, so two failures produced by the same rule
//! are the *same* error, not merely equal ones.

use http::StatusCode;
use std::fmt;
use std::sync::Arc;

/// Where a binding rule reads its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamSource {
    /// Path parameters (e.g., `/users/{id}`)
    Path,
    /// Query string parameters
    Query,
    /// HTTP headers
    Header,
    /// `Cookie` header pairs
    Cookie,
    /// URL-encoded or multipart form body
    Form,
    /// JSON body, addressed by a dotted path
    Json,
    /// Protobuf body, decoded before binding
    Protobuf,
    /// The whole body as bytes or text
    RawBody,
}

impl ParamSource {
    /// Returns true for sources served by body-codec dispatch.
    #[must_use]
    pub fn is_body(self) -> bool {
        matches!(self, Self::Form | Self::Json | Self::Protobuf)
    }
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
            Self::Header => write!(f, "header"),
            Self::Cookie => write!(f, "cookie"),
            Self::Form => write!(f, "form"),
            Self::Json => write!(f, "json"),
            Self::Protobuf => write!(f, "protobuf"),
            Self::RawBody => write!(f, "raw_body"),
        }
    }
}

/// Classification of a binding failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindErrorKind {
    /// A required parameter had no satisfying value.
    RequiredMissing,
    /// A present value could not be coerced into the field's type.
    TypeMismatch,
    /// A body rule met a codec outside the supported set.
    UnsupportedContentType,
}

impl BindErrorKind {
    /// Default human-readable reason used when building rule errors.
    #[must_use]
    pub fn reason(self) -> &'static str {
        match self {
            Self::RequiredMissing => "missing required parameter",
            Self::TypeMismatch => "parameter type does not match binding data",
            Self::UnsupportedContentType => "does not support binding it based on Content-Type",
        }
    }
}

/// Builds the message of a rule error from the failing field path and reason.
///
/// Rules use [`default_error_factory`] unless a custom one is supplied.
pub type ErrorFactory = fn(field: &str, reason: &str) -> String;

/// The stock message layout: `binding: expr_path=<field>, cause=<reason>`.
pub fn default_error_factory(field: &str, reason: &str) -> String {
    format!("binding: expr_path={field}, cause={reason}")
}

#[derive(Debug)]
struct Inner {
    kind: BindErrorKind,
    param_source: ParamSource,
    field: String,
    message: String,
}

/// Error returned by the bind operations.
///
/// # Example
///
/// ```rust
/// use desmos_bind::{BindError, BindErrorKind, ParamSource};
/// use http::StatusCode;
///
/// let err = BindError::required_missing(ParamSource::Query, "id");
/// assert_eq!(err.kind(), BindErrorKind::RequiredMissing);
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert!(err.to_string().contains("id"));
///
/// let shared = err.clone();
/// assert!(shared.same_as(&err));
/// ```
#[derive(Debug, Clone)]
pub struct BindError {
    inner: Arc<Inner>,
}

impl BindError {
    /// Creates an error with an explicit message.
    #[must_use]
    pub fn new(
        kind: BindErrorKind,
        param_source: ParamSource,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                kind,
                param_source,
                field: field.into(),
                message: message.into(),
            }),
        }
    }

    /// Creates an error whose message comes from `factory`.
    #[must_use]
    pub fn with_factory(
        kind: BindErrorKind,
        param_source: ParamSource,
        field: &str,
        factory: ErrorFactory,
    ) -> Self {
        Self::new(kind, param_source, field, factory(field, kind.reason()))
    }

    /// Creates a required-but-missing error with the default message.
    #[must_use]
    pub fn required_missing(param_source: ParamSource, field: &str) -> Self {
        Self::with_factory(
            BindErrorKind::RequiredMissing,
            param_source,
            field,
            default_error_factory,
        )
    }

    /// Creates a type-mismatch error with the default message.
    #[must_use]
    pub fn type_mismatch(param_source: ParamSource, field: &str) -> Self {
        Self::with_factory(
            BindErrorKind::TypeMismatch,
            param_source,
            field,
            default_error_factory,
        )
    }

    /// Creates an unsupported-content-type error with the default message.
    #[must_use]
    pub fn unsupported_content_type(param_source: ParamSource, field: &str) -> Self {
        Self::with_factory(
            BindErrorKind::UnsupportedContentType,
            param_source,
            field,
            default_error_factory,
        )
    }

    /// Returns the failure classification.
    #[must_use]
    pub fn kind(&self) -> BindErrorKind {
        self.inner.kind
    }

    /// Returns the source of the rule that produced this error.
    #[must_use]
    pub fn param_source(&self) -> ParamSource {
        self.inner.param_source
    }

    /// Returns the failing field path.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.inner.field
    }

    /// Returns the rendered message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.inner.message
    }

    /// Returns true if both handles point at the same pre-built error.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.inner.kind {
            BindErrorKind::RequiredMissing | BindErrorKind::TypeMismatch => {
                StatusCode::BAD_REQUEST
            }
            BindErrorKind::UnsupportedContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }

    /// Returns the error code suitable for error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.inner.kind {
            BindErrorKind::RequiredMissing => "MISSING_PARAMETER",
            BindErrorKind::TypeMismatch => "INVALID_PARAMETER",
            BindErrorKind::UnsupportedContentType => "UNSUPPORTED_MEDIA_TYPE",
        }
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.message)
    }
}

impl std::error::Error for BindError {}
