//! Per-field binding resolver.
//!
//! A [`FieldResolver`] knows one declared field: where it lives in the target
//! (its selector) and the rules that may populate it. Each `bind_*` method
//! consults a single source for a single rule and reports whether the field
//! was bound:
//!
//! - `Ok(true)`: the source had a value and binding went through (this
//!   includes a scalar that failed to parse and was skipped leniently);
//! - `Ok(false)`: the source had nothing and the rule is optional;
//! - `Err(_)`: one of the rule's pre-built errors.
//!
//! Callers decide how to combine sources and fields; the resolver never
//! aggregates.

use crate::codec::BodyCodec;
use crate::coerce::{coerce, Coercion, FieldKind, FieldValue, ScalarKind, ScalarValue};
use crate::error::{BindError, ParamSource};
use crate::jsonpath;
use crate::request::RequestSources;
use crate::rule::BindingRule;
use crate::selector::Selector;
use crate::source::{Cookies, MultiMap, PathParams};
use bytes::Bytes;

/// Binding logic for one declared field.
///
/// Built once per target type and shared read-only by every request.
///
/// # Example
///
/// ```rust
/// use desmos_bind::selector::{slot, Bindable, FieldTable};
/// use desmos_bind::{BindingRule, FieldResolver, MultiMap};
/// use once_cell::sync::Lazy;
///
/// #[derive(Default)]
/// struct ListUsers {
///     limit: u32,
/// }
///
/// static FIELDS: Lazy<FieldTable<ListUsers>> =
///     Lazy::new(|| FieldTable::<ListUsers>::new().field("limit", |t, _| slot(&mut t.limit)));
///
/// impl Bindable for ListUsers {
///     fn field_table() -> &'static FieldTable<Self> {
///         &FIELDS
///     }
/// }
///
/// let resolver = FieldResolver::new("limit", "limit")
///     .with_rule(BindingRule::query("limit").build());
/// let query = MultiMap::from_query("limit=25").unwrap();
///
/// let mut target = ListUsers::default();
/// let bound = resolver.bind_query(&resolver.rules()[0], &mut target, &query).unwrap();
///
/// assert!(bound);
/// assert_eq!(target.limit, 25);
/// ```
#[derive(Debug, Clone)]
pub struct FieldResolver {
    selector: String,
    field_name: String,
    rules: Vec<BindingRule>,
}

impl FieldResolver {
    /// Creates a resolver for the field at `selector`, declared as `field_name`.
    #[must_use]
    pub fn new(selector: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            field_name: field_name.into(),
            rules: Vec::new(),
        }
    }

    /// Adds a rule; rules keep declaration order.
    #[must_use]
    pub fn with_rule(mut self, rule: BindingRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Returns the selector of the field.
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Returns the declared identifier of the field.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Returns the rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[BindingRule] {
        &self.rules
    }

    /// Returns true if any rule reads from a JSON body.
    #[must_use]
    pub fn has_json_rule(&self) -> bool {
        self.json_rule().is_some()
    }

    fn json_rule(&self) -> Option<&BindingRule> {
        self.rules.iter().find(|r| r.source() == ParamSource::Json)
    }

    /// External name of the field, for messages.
    ///
    /// The JSON rule's name wins; otherwise the declared identifier is used.
    #[must_use]
    pub fn binding_name(&self) -> &str {
        self.json_rule()
            .map_or(self.field_name.as_str(), BindingRule::name)
    }

    /// Binds the whole request body to a `Bytes`, `Vec<u8>` or `String` field.
    ///
    /// An empty body binds nothing. A body that is not UTF-8 cannot bind to a
    /// `String` field.
    pub fn bind_raw_body<T: Selector + ?Sized>(
        &self,
        rule: &BindingRule,
        target: &mut T,
        body: &Bytes,
    ) -> Result<bool, BindError> {
        if body.is_empty() {
            return self.absent(rule);
        }
        let Some(field) = target.select(&self.selector, true) else {
            return Ok(false);
        };

        let value = match field.kind() {
            FieldKind::Bytes | FieldKind::Slice(ScalarKind::U8) => FieldValue::Bytes(body.clone()),
            FieldKind::Scalar(ScalarKind::String) => match std::str::from_utf8(body) {
                Ok(text) => FieldValue::Scalar(ScalarValue::String(text.to_owned())),
                Err(_) => return Err(self.mismatch(rule)),
            },
            _ => return Err(self.mismatch(rule)),
        };

        if field.assign(value) {
            tracing::trace!(
                field = %self.field_name,
                source = %rule.source(),
                len = body.len(),
                "bound raw body"
            );
            Ok(true)
        } else {
            Err(self.mismatch(rule))
        }
    }

    /// Binds a single-valued path parameter.
    pub fn bind_path<T: Selector + ?Sized>(
        &self,
        rule: &BindingRule,
        target: &mut T,
        params: &PathParams,
    ) -> Result<bool, BindError> {
        match params.get(rule.name()) {
            Some(value) => self
                .bind_tokens(rule, target, std::slice::from_ref(&value))
                .map(|()| true),
            None => self.absent(rule),
        }
    }

    /// Binds a query parameter; every repeated value is a token.
    pub fn bind_query<T: Selector + ?Sized>(
        &self,
        rule: &BindingRule,
        target: &mut T,
        query: &MultiMap,
    ) -> Result<bool, BindError> {
        self.bind_map_strings(rule, target, query)
    }

    /// Binds a header; every repeated value is a token.
    ///
    /// `headers` must be keyed by lowercase names, as built by
    /// [`MultiMap::from_headers`].
    pub fn bind_header<T: Selector + ?Sized>(
        &self,
        rule: &BindingRule,
        target: &mut T,
        headers: &MultiMap,
    ) -> Result<bool, BindError> {
        self.bind_map_strings(rule, target, headers)
    }

    /// Binds every cookie sent under the rule's name.
    pub fn bind_cookie<T: Selector + ?Sized>(
        &self,
        rule: &BindingRule,
        target: &mut T,
        cookies: &Cookies,
    ) -> Result<bool, BindError> {
        let values: Vec<&str> = cookies.values(rule.name()).collect();
        if values.is_empty() {
            return self.absent(rule);
        }
        self.bind_tokens(rule, target, values.as_slice()).map(|()| true)
    }

    /// Binds or checks a body rule according to the negotiated codec.
    ///
    /// - [`BodyCodec::Form`] binds from `post_form` like a query parameter.
    /// - [`BodyCodec::Json`] checks presence with [`Self::check_require_json`].
    /// - [`BodyCodec::Protobuf`] checks presence with
    ///   [`Self::check_require_protobuf`].
    /// - [`BodyCodec::Unsupported`] always fails with the rule's content type
    ///   error.
    pub fn bind_or_require_body<T: Selector + ?Sized>(
        &self,
        rule: &BindingRule,
        target: &mut T,
        codec: BodyCodec,
        body_text: &str,
        post_form: &MultiMap,
        check_opt: bool,
    ) -> Result<bool, BindError> {
        match codec {
            BodyCodec::Form => self.bind_map_strings(rule, target, post_form),
            BodyCodec::Json => self
                .check_require_json(rule, target, body_text, check_opt)
                .map(|()| true),
            BodyCodec::Protobuf => self
                .check_require_protobuf(rule, target, check_opt)
                .map(|()| true),
            BodyCodec::Unsupported => {
                tracing::debug!(
                    field = %self.field_name,
                    source = %rule.source(),
                    "body codec does not support binding"
                );
                Err(rule.content_type_error().clone())
            }
        }
    }

    /// Verifies a JSON-bound field.
    ///
    /// Runs only when `check_opt` is set or the rule is required; otherwise
    /// the full-document decode is trusted. The rule's path must exist in
    /// `body_text` and the field must already have storage in the target.
    pub fn check_require_json<T: Selector + ?Sized>(
        &self,
        rule: &BindingRule,
        target: &mut T,
        body_text: &str,
        check_opt: bool,
    ) -> Result<(), BindError> {
        if !(check_opt || rule.is_required()) {
            return Ok(());
        }
        if !jsonpath::exists(body_text, rule.name_path()) {
            return Err(self.missing(rule));
        }
        if target.select(&self.selector, false).is_none() {
            return Err(self.missing(rule));
        }
        Ok(())
    }

    /// Verifies a protobuf-bound field.
    ///
    /// Runs only when `check_opt` is set and the rule is not already
    /// required; the field must have storage in the decoded target.
    pub fn check_require_protobuf<T: Selector + ?Sized>(
        &self,
        rule: &BindingRule,
        target: &mut T,
        check_opt: bool,
    ) -> Result<(), BindError> {
        if check_opt && !rule.is_required() && target.select(&self.selector, false).is_none() {
            return Err(self.missing(rule));
        }
        Ok(())
    }

    /// Binds from a name to values mapping (query, header or form).
    pub fn bind_map_strings<T: Selector + ?Sized>(
        &self,
        rule: &BindingRule,
        target: &mut T,
        values: &MultiMap,
    ) -> Result<bool, BindError> {
        match values.get(rule.name()) {
            Some(tokens) if !tokens.is_empty() => {
                self.bind_tokens(rule, target, tokens).map(|()| true)
            }
            _ => self.absent(rule),
        }
    }

    /// Coerces `tokens` into the field and assigns the result.
    ///
    /// A selector that does not resolve binds nothing and is not an error.
    pub fn bind_tokens<T: Selector + ?Sized, S: AsRef<str>>(
        &self,
        rule: &BindingRule,
        target: &mut T,
        tokens: &[S],
    ) -> Result<(), BindError> {
        let Some(field) = target.select(&self.selector, true) else {
            return Ok(());
        };

        match coerce(field.kind(), tokens) {
            Coercion::Set(value) => {
                if field.assign(value) {
                    tracing::trace!(
                        field = %self.field_name,
                        source = %rule.source(),
                        param = %rule.name(),
                        "bound"
                    );
                    Ok(())
                } else {
                    Err(self.mismatch(rule))
                }
            }
            Coercion::SkippedLeniently => {
                tracing::debug!(
                    field = %self.field_name,
                    source = %rule.source(),
                    param = %rule.name(),
                    "unparsable value skipped"
                );
                Ok(())
            }
            Coercion::Failed => Err(self.mismatch(rule)),
        }
    }

    /// Binds `rule` from the matching channel of `sources`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use desmos_bind::selector::{slot, Bindable, FieldTable};
    /// use desmos_bind::{BindOptions, BindingRule, FieldResolver, PathParams, RequestSources};
    /// use bytes::Bytes;
    /// use once_cell::sync::Lazy;
    ///
    /// #[derive(Default)]
    /// struct GetUser {
    ///     id: u64,
    /// }
    ///
    /// static FIELDS: Lazy<FieldTable<GetUser>> =
    ///     Lazy::new(|| FieldTable::<GetUser>::new().field("id", |t, _| slot(&mut t.id)));
    ///
    /// impl Bindable for GetUser {
    ///     fn field_table() -> &'static FieldTable<Self> {
    ///         &FIELDS
    ///     }
    /// }
    ///
    /// let (parts, ()) = http::Request::get("/users/7").body(()).unwrap().into_parts();
    /// let params: PathParams = [("id", "7")].into_iter().collect();
    /// let options = BindOptions::default();
    /// let sources = RequestSources::from_parts(&parts, Bytes::new(), params, &options).unwrap();
    ///
    /// let rule = BindingRule::path("id").required(true).build();
    /// let resolver = FieldResolver::new("id", "id").with_rule(rule.clone());
    ///
    /// let mut target = GetUser::default();
    /// assert!(resolver.bind(&rule, &mut target, &sources, false).unwrap());
    /// assert_eq!(target.id, 7);
    /// ```
    pub fn bind<T: Selector + ?Sized>(
        &self,
        rule: &BindingRule,
        target: &mut T,
        sources: &RequestSources,
        check_opt: bool,
    ) -> Result<bool, BindError> {
        match rule.source() {
            ParamSource::Path => self.bind_path(rule, target, sources.path_params()),
            ParamSource::Query => self.bind_query(rule, target, sources.query()),
            ParamSource::Header => self.bind_header(rule, target, sources.headers()),
            ParamSource::Cookie => self.bind_cookie(rule, target, sources.cookies()),
            ParamSource::Form | ParamSource::Json | ParamSource::Protobuf => self
                .bind_or_require_body(
                    rule,
                    target,
                    sources.codec(),
                    sources.body_text(),
                    sources.post_form(),
                    check_opt,
                ),
            ParamSource::RawBody => self.bind_raw_body(rule, target, sources.body()),
        }
    }

    fn absent(&self, rule: &BindingRule) -> Result<bool, BindError> {
        if rule.is_required() {
            Err(self.missing(rule))
        } else {
            Ok(false)
        }
    }

    fn missing(&self, rule: &BindingRule) -> BindError {
        tracing::debug!(
            field = %self.field_name,
            source = %rule.source(),
            param = %rule.name_path(),
            "required parameter missing"
        );
        rule.required_error().clone()
    }

    fn mismatch(&self, rule: &BindingRule) -> BindError {
        tracing::debug!(
            field = %self.field_name,
            source = %rule.source(),
            param = %rule.name_path(),
            "parameter type does not match binding data"
        );
        rule.type_error().clone()
    }
}
