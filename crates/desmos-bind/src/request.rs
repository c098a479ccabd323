//! Request materialization.
//!
//! [`RequestSources`] parses every channel of an incoming request once, so
//! that any number of fields and rules can bind from it without re-reading
//! headers or re-decoding the body.

use crate::codec::BodyCodec;
use crate::source::{Cookies, MultiMap, PathParams};
use bytes::Bytes;
use http::header;
use http::request::Parts;
use http::StatusCode;
use thiserror::Error;

/// Default upper bound on the body size accepted by
/// [`RequestSources::from_parts`] (2 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Options that shape how a request is materialized and bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindOptions {
    /// Default for the `check_opt` flag of the body requiredness checks.
    pub check_optional_json: bool,
    /// Bodies larger than this are rejected.
    pub max_body_bytes: usize,
    /// Content type assumed when a request carries none.
    pub default_content_type: Option<String>,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            check_optional_json: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            default_content_type: None,
        }
    }
}

/// Errors raised while materializing a request.
///
/// These concern the request as a whole; per-field failures are
/// [`BindError`](crate::BindError)s.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The body exceeds [`BindOptions::max_body_bytes`].
    #[error("payload too large: max {max} bytes, got {actual} bytes")]
    PayloadTooLarge {
        /// Configured limit.
        max: usize,
        /// Actual body length.
        actual: usize,
    },

    /// The query string is not valid URL encoding.
    #[error("invalid query string: {0}")]
    InvalidQuery(#[source] serde_urlencoded::de::Error),

    /// A URL-encoded form body could not be decoded.
    #[error("invalid form body: {0}")]
    InvalidForm(#[source] serde_urlencoded::de::Error),
}

impl RequestError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InvalidQuery(_) | Self::InvalidForm(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Every bindable channel of one request, parsed.
///
/// # Example
///
/// ```rust
/// use desmos_bind::{BindOptions, BodyCodec, PathParams, RequestSources};
/// use bytes::Bytes;
///
/// let (parts, ()) = http::Request::post("/users?page=2")
///     .header("content-type", "application/x-www-form-urlencoded")
///     .header("cookie", "session=abc")
///     .body(())
///     .unwrap()
///     .into_parts();
///
/// let sources = RequestSources::from_parts(
///     &parts,
///     Bytes::from_static(b"name=alice"),
///     PathParams::new(),
///     &BindOptions::default(),
/// )
/// .unwrap();
///
/// assert_eq!(sources.codec(), BodyCodec::Form);
/// assert_eq!(sources.query().first("page"), Some("2"));
/// assert_eq!(sources.post_form().first("name"), Some("alice"));
/// assert_eq!(sources.cookies().values("session").next(), Some("abc"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestSources {
    path_params: PathParams,
    query: MultiMap,
    headers: MultiMap,
    cookies: Cookies,
    codec: BodyCodec,
    body: Bytes,
    body_text: String,
    post_form: MultiMap,
}

impl RequestSources {
    /// Parses `parts` and `body`.
    ///
    /// The body text is the lossy UTF-8 rendering of the body. The post form
    /// is decoded only for URL-encoded bodies; multipart fields must be
    /// supplied with [`Self::with_post_form`] by a caller that has already
    /// read the stream.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] if the body is over the size limit or the
    /// query string or form body is malformed.
    pub fn from_parts(
        parts: &Parts,
        body: Bytes,
        path_params: PathParams,
        options: &BindOptions,
    ) -> Result<Self, RequestError> {
        if body.len() > options.max_body_bytes {
            tracing::debug!(
                max = options.max_body_bytes,
                actual = body.len(),
                "request body over limit"
            );
            return Err(RequestError::PayloadTooLarge {
                max: options.max_body_bytes,
                actual: body.len(),
            });
        }

        let query = match parts.uri.query() {
            Some(q) => MultiMap::from_query(q).map_err(RequestError::InvalidQuery)?,
            None => MultiMap::new(),
        };

        let content_type = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .or(options.default_content_type.as_deref());
        let codec = BodyCodec::from_content_type(content_type);

        let post_form = if codec == BodyCodec::Form && is_urlencoded(content_type) {
            MultiMap::from_form_bytes(&body).map_err(RequestError::InvalidForm)?
        } else {
            MultiMap::new()
        };

        let sources = Self {
            path_params,
            query,
            headers: MultiMap::from_headers(&parts.headers),
            cookies: Cookies::from_headers(&parts.headers),
            codec,
            body_text: String::from_utf8_lossy(&body).into_owned(),
            body,
            post_form,
        };

        tracing::trace!(
            codec = %sources.codec,
            body_len = sources.body.len(),
            query = sources.query.len(),
            cookies = sources.cookies.len(),
            "request sources materialized"
        );

        Ok(sources)
    }

    /// Replaces the path parameters.
    #[must_use]
    pub fn with_path_params(mut self, path_params: PathParams) -> Self {
        self.path_params = path_params;
        self
    }

    /// Replaces the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: MultiMap) -> Self {
        self.query = query;
        self
    }

    /// Replaces the headers. Names must be lowercase.
    #[must_use]
    pub fn with_headers(mut self, headers: MultiMap) -> Self {
        self.headers = headers;
        self
    }

    /// Replaces the cookies.
    #[must_use]
    pub fn with_cookies(mut self, cookies: Cookies) -> Self {
        self.cookies = cookies;
        self
    }

    /// Replaces the body and its text rendering.
    #[must_use]
    pub fn with_body(mut self, codec: BodyCodec, body: Bytes) -> Self {
        self.codec = codec;
        self.body_text = String::from_utf8_lossy(&body).into_owned();
        self.body = body;
        self
    }

    /// Replaces the post form.
    #[must_use]
    pub fn with_post_form(mut self, post_form: MultiMap) -> Self {
        self.post_form = post_form;
        self
    }

    /// Returns the path parameters.
    #[must_use]
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    /// Returns the query parameters.
    #[must_use]
    pub fn query(&self) -> &MultiMap {
        &self.query
    }

    /// Returns the headers, keyed by lowercase name.
    #[must_use]
    pub fn headers(&self) -> &MultiMap {
        &self.headers
    }

    /// Returns the cookies.
    #[must_use]
    pub fn cookies(&self) -> &Cookies {
        &self.cookies
    }

    /// Returns the negotiated body codec.
    #[must_use]
    pub fn codec(&self) -> BodyCodec {
        self.codec
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as text.
    #[must_use]
    pub fn body_text(&self) -> &str {
        &self.body_text
    }

    /// Returns the decoded form body.
    #[must_use]
    pub fn post_form(&self) -> &MultiMap {
        &self.post_form
    }
}

fn is_urlencoded(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.parse::<mime::Mime>().ok())
        .is_some_and(|m| m.type_() == mime::APPLICATION && m.subtype() == mime::WWW_FORM_URLENCODED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;

    fn parts(builder: http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_json_request() {
        let parts = parts(
            Request::post("/items?tag=a&tag=b")
                .header("Content-Type", "application/json")
                .header("X-Trace", "t1"),
        );
        let body = Bytes::from_static(br#"{"name":"x"}"#);

        let sources =
            RequestSources::from_parts(&parts, body, PathParams::new(), &BindOptions::default())
                .unwrap();

        assert_eq!(sources.codec(), BodyCodec::Json);
        assert_eq!(sources.body_text(), r#"{"name":"x"}"#);
        assert_eq!(sources.query().get("tag").unwrap(), ["a", "b"]);
        assert_eq!(sources.headers().first("x-trace"), Some("t1"));
        assert!(sources.post_form().is_empty());
    }

    #[test]
    fn test_missing_content_type_uses_default() {
        let parts = parts(Request::post("/"));
        let options = BindOptions {
            default_content_type: Some("application/json".into()),
            ..BindOptions::default()
        };

        let body = Bytes::from_static(b"{}");
        let sources =
            RequestSources::from_parts(&parts, body, PathParams::new(), &options).unwrap();
        assert_eq!(sources.codec(), BodyCodec::Json);

        let sources = RequestSources::from_parts(
            &parts,
            Bytes::new(),
            PathParams::new(),
            &BindOptions::default(),
        )
        .unwrap();
        assert_eq!(sources.codec(), BodyCodec::Unsupported);
    }

    #[test]
    fn test_body_over_limit() {
        let parts = parts(Request::post("/"));
        let options = BindOptions {
            max_body_bytes: 4,
            ..BindOptions::default()
        };

        let err = RequestSources::from_parts(
            &parts,
            Bytes::from_static(b"12345"),
            PathParams::new(),
            &options,
        )
        .unwrap_err();

        assert!(matches!(err, RequestError::PayloadTooLarge { max: 4, actual: 5 }));
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_multipart_post_form_left_to_caller() {
        let parts = parts(
            Request::post("/").header("content-type", "multipart/form-data; boundary=XyZ"),
        );

        let sources = RequestSources::from_parts(
            &parts,
            Bytes::from_static(b"--XyZ--"),
            PathParams::new(),
            &BindOptions::default(),
        )
        .unwrap();
        assert_eq!(sources.codec(), BodyCodec::Form);
        assert!(sources.post_form().is_empty());

        let sources = sources.with_post_form([("name", "bob")].into_iter().collect());
        assert_eq!(sources.post_form().first("name"), Some("bob"));
    }

    #[test]
    fn test_invalid_utf8_body_text_is_lossy() {
        let parts = parts(Request::post("/").header("content-type", "application/octet-stream"));

        let sources = RequestSources::from_parts(
            &parts,
            Bytes::from_static(b"a\xffb"),
            PathParams::new(),
            &BindOptions::default(),
        )
        .unwrap();
        assert_eq!(sources.body().as_ref(), b"a\xffb");
        assert_eq!(sources.body_text(), "a\u{fffd}b");
    }

    #[test]
    fn test_builders() {
        let sources = RequestSources::default()
            .with_path_params([("id", "1")].into_iter().collect())
            .with_cookies(Cookies::parse("a=1"))
            .with_body(BodyCodec::Json, Bytes::from_static(b"{}"));

        assert_eq!(sources.path_params().get("id"), Some("1"));
        assert_eq!(sources.cookies().len(), 1);
        assert_eq!(sources.codec(), BodyCodec::Json);
        assert_eq!(sources.body_text(), "{}");
    }
}
