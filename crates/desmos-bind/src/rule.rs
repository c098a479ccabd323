//! Per-field, per-source binding rules.

use crate::error::{default_error_factory, BindError, BindErrorKind, ErrorFactory, ParamSource};
use std::fmt;

/// How one field is read from one source.
///
/// Rules are built once, when a target type's bindings are declared, and
/// shared read-only by every request. Their errors are built at the same
/// time, so a failure hands back a clone of the rule's own error.
///
/// # Example
///
/// ```rust
/// use desmos_bind::{BindingRule, ParamSource};
///
/// let rule = BindingRule::json("age").name_path("user.age").required(true).build();
///
/// assert_eq!(rule.source(), ParamSource::Json);
/// assert_eq!(rule.name(), "age");
/// assert_eq!(rule.name_path(), "user.age");
/// assert!(rule.required_error().to_string().contains("user.age"));
/// ```
#[derive(Debug, Clone)]
pub struct BindingRule {
    source: ParamSource,
    name: String,
    name_path: String,
    required: bool,
    required_error: BindError,
    type_error: BindError,
    content_type_error: BindError,
}

impl BindingRule {
    /// Starts a rule for `source`, looked up under `name`.
    #[must_use]
    pub fn builder(source: ParamSource, name: impl Into<String>) -> BindingRuleBuilder {
        BindingRuleBuilder {
            source,
            name: name.into(),
            name_path: None,
            required: false,
            error_factory: default_error_factory,
        }
    }

    /// Starts a path parameter rule.
    #[must_use]
    pub fn path(name: impl Into<String>) -> BindingRuleBuilder {
        Self::builder(ParamSource::Path, name)
    }

    /// Starts a query parameter rule.
    #[must_use]
    pub fn query(name: impl Into<String>) -> BindingRuleBuilder {
        Self::builder(ParamSource::Query, name)
    }

    /// Starts a header rule. Lookup ignores the case of `name`.
    #[must_use]
    pub fn header(name: impl Into<String>) -> BindingRuleBuilder {
        Self::builder(ParamSource::Header, name)
    }

    /// Starts a cookie rule.
    #[must_use]
    pub fn cookie(name: impl Into<String>) -> BindingRuleBuilder {
        Self::builder(ParamSource::Cookie, name)
    }

    /// Starts a form body rule.
    #[must_use]
    pub fn form(name: impl Into<String>) -> BindingRuleBuilder {
        Self::builder(ParamSource::Form, name)
    }

    /// Starts a JSON body rule.
    #[must_use]
    pub fn json(name: impl Into<String>) -> BindingRuleBuilder {
        Self::builder(ParamSource::Json, name)
    }

    /// Starts a protobuf body rule.
    #[must_use]
    pub fn protobuf(name: impl Into<String>) -> BindingRuleBuilder {
        Self::builder(ParamSource::Protobuf, name)
    }

    /// Starts a raw body rule.
    #[must_use]
    pub fn raw_body(name: impl Into<String>) -> BindingRuleBuilder {
        Self::builder(ParamSource::RawBody, name)
    }

    /// Returns the source this rule reads from.
    #[must_use]
    pub fn source(&self) -> ParamSource {
        self.source
    }

    /// Returns the lookup key (lowercased for header rules).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the dotted path used for JSON lookup and error messages.
    #[must_use]
    pub fn name_path(&self) -> &str {
        &self.name_path
    }

    /// Returns true if the field must be satisfied by this source.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Error returned when a required value is absent.
    #[must_use]
    pub fn required_error(&self) -> &BindError {
        &self.required_error
    }

    /// Error returned when a present value does not fit the field.
    #[must_use]
    pub fn type_error(&self) -> &BindError {
        &self.type_error
    }

    /// Error returned when the body codec is unsupported.
    #[must_use]
    pub fn content_type_error(&self) -> &BindError {
        &self.content_type_error
    }
}

/// Builder for [`BindingRule`].
#[derive(Clone)]
pub struct BindingRuleBuilder {
    source: ParamSource,
    name: String,
    name_path: Option<String>,
    required: bool,
    error_factory: ErrorFactory,
}

impl fmt::Debug for BindingRuleBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingRuleBuilder")
            .field("source", &self.source)
            .field("name", &self.name)
            .field("name_path", &self.name_path)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

impl BindingRuleBuilder {
    /// Sets the dotted path of the value (defaults to the name).
    #[must_use]
    pub fn name_path(mut self, name_path: impl Into<String>) -> Self {
        self.name_path = Some(name_path.into());
        self
    }

    /// Marks the rule as required.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Replaces the function that renders error messages.
    #[must_use]
    pub fn error_factory(mut self, factory: ErrorFactory) -> Self {
        self.error_factory = factory;
        self
    }

    /// Builds the rule and its errors.
    #[must_use]
    pub fn build(self) -> BindingRule {
        let name_path = self.name_path.unwrap_or_else(|| self.name.clone());
        let name = if self.source == ParamSource::Header {
            self.name.to_ascii_lowercase()
        } else {
            self.name
        };
        let (source, factory) = (self.source, self.error_factory);
        let error = |kind| BindError::with_factory(kind, source, &name_path, factory);

        BindingRule {
            source: self.source,
            required: self.required,
            required_error: error(BindErrorKind::RequiredMissing),
            type_error: error(BindErrorKind::TypeMismatch),
            content_type_error: error(BindErrorKind::UnsupportedContentType),
            name,
            name_path,
        }
    }
}
