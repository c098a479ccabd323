//! Materialized request sources.
//!
//! Each collection holds one channel of an incoming request, fully parsed:
//!
//! | Type | Channel | Shape |
//! |------|---------|-------|
//! | [`PathParams`] | Path segments | name → single value |
//! | [`MultiMap`] | Query, headers, form body | name → ordered values |
//! | [`Cookies`] | `Cookie` headers | ordered `(name, value)` pairs |

use http::header::{self, HeaderMap};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Maximum number of path parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Path parameters captured by the router.
///
/// # Example
///
/// ```rust
/// use desmos_bind::PathParams;
///
/// let mut params = PathParams::new();
/// params.push("user_id", "42");
///
/// assert_eq!(params.get("user_id"), Some("42"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathParams {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl PathParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value of the first parameter called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().map(|(n, v)| (n.into(), v.into())).collect(),
        }
    }
}

/// A name to ordered-values mapping.
///
/// Used for query strings, headers and form bodies, all of which may repeat a
/// key.
///
/// # Example
///
/// ```rust
/// use desmos_bind::MultiMap;
///
/// let query = MultiMap::from_query("id=1&id=2&q=rust+lang").unwrap();
///
/// assert_eq!(query.get("id"), Some(&["1".to_string(), "2".to_string()][..]));
/// assert_eq!(query.first("q"), Some("rust lang"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultiMap {
    inner: HashMap<String, Vec<String>>,
}

impl MultiMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a URL-encoded string (`a=1&a=2&b=3`).
    pub fn from_query(query: &str) -> Result<Self, serde_urlencoded::de::Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)?;
        Ok(pairs.into_iter().collect())
    }

    /// Parses a URL-encoded body.
    pub fn from_form_bytes(body: &[u8]) -> Result<Self, serde_urlencoded::de::Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;
        Ok(pairs.into_iter().collect())
    }

    /// Collects every header value, keyed by lowercase header name.
    ///
    /// Values that are not valid UTF-8 are decoded lossily rather than
    /// dropped, so a sent header is never reported missing.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut map = Self::new();
        for (name, value) in headers {
            map.append(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }
        map
    }

    /// Appends a value to `name`.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.entry(name.into()).or_default().push(value.into());
    }

    /// Replaces all values of `name`.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.inner.insert(name.into(), values);
    }

    /// Returns all values of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.inner.get(name).map(Vec::as_slice)
    }

    /// Returns the first value of `name`.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name)?.first().map(String::as_str)
    }

    /// Returns true if `name` is present (even with no values).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Returns the number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns an iterator over names and their values, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for MultiMap {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.append(name, value);
        }
        map
    }
}

impl From<HashMap<String, Vec<String>>> for MultiMap {
    fn from(inner: HashMap<String, Vec<String>>) -> Self {
        Self { inner }
    }
}

/// Request cookies in the order they were sent.
///
/// Repeated names are kept, since a browser may send several cookies with
/// the same name for different paths or domains.
///
/// # Example
///
/// ```rust
/// use desmos_bind::Cookies;
///
/// let cookies = Cookies::parse("session=a; theme=dark; session=b");
///
/// assert_eq!(cookies.values("session").collect::<Vec<_>>(), vec!["a", "b"]);
/// assert_eq!(cookies.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cookies {
    pairs: Vec<(String, String)>,
}

impl Cookies {
    /// Creates an empty cookie list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one `Cookie` header value.
    #[must_use]
    pub fn parse(header_value: &str) -> Self {
        let mut cookies = Self::new();
        cookies.extend_from_header(header_value);
        cookies
    }

    /// Collects cookies from every `Cookie` header.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = Self::new();
        for value in headers.get_all(header::COOKIE) {
            cookies.extend_from_header(&String::from_utf8_lossy(value.as_bytes()));
        }
        cookies
    }

    fn extend_from_header(&mut self, header_value: &str) {
        for cookie in header_value.split(';') {
            if let Some((name, value)) = cookie.trim().split_once('=') {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                // Remove surrounding quotes if present
                let value = value.trim().trim_matches('"');
                self.push(name, value);
            }
        }
    }

    /// Appends a cookie.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Returns every value sent under `name`, in order.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns an iterator over all cookies.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns the number of cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if there are no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Cookies {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(n, v)| (n.into(), v.into())).collect(),
        }
    }
}
