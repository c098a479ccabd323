//! Body codec negotiation.

use std::fmt;

/// Structured encoding of a request body, as far as binding is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BodyCodec {
    /// `application/x-www-form-urlencoded` or `multipart/form-data`
    Form,
    /// `application/json` and `+json` media types
    Json,
    /// `application/x-protobuf` / `application/protobuf`
    Protobuf,
    /// Anything else, including a missing content type
    #[default]
    Unsupported,
}

impl BodyCodec {
    /// Picks the codec for a `Content-Type` header value.
    ///
    /// Parameters such as `charset` are ignored.
    ///
    /// # Example
    ///
    /// ```rust
    /// use desmos_bind::BodyCodec;
    ///
    /// let codec = BodyCodec::from_content_type(Some("application/json; charset=utf-8"));
    /// assert_eq!(codec, BodyCodec::Json);
    /// assert_eq!(BodyCodec::from_content_type(Some("application/problem+json")), BodyCodec::Json);
    /// assert_eq!(BodyCodec::from_content_type(Some("text/plain")), BodyCodec::Unsupported);
    /// assert_eq!(BodyCodec::from_content_type(None), BodyCodec::Unsupported);
    /// ```
    #[must_use]
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(mime) = content_type.and_then(|ct| ct.parse::<mime::Mime>().ok()) else {
            return Self::Unsupported;
        };

        let (ty, sub) = (mime.type_(), mime.subtype());
        if (ty == mime::APPLICATION && sub == mime::WWW_FORM_URLENCODED)
            || (ty == mime::MULTIPART && sub == mime::FORM_DATA)
        {
            Self::Form
        } else if ty == mime::APPLICATION
            && (sub == mime::JSON || mime.suffix() == Some(mime::JSON))
        {
            Self::Json
        } else if ty == mime::APPLICATION && (sub == "x-protobuf" || sub == "protobuf") {
            Self::Protobuf
        } else {
            Self::Unsupported
        }
    }

    /// Returns true for the codecs body rules can bind from.
    #[must_use]
    pub fn is_supported(self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

impl fmt::Display for BodyCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Form => write!(f, "form"),
            Self::Json => write!(f, "json"),
            Self::Protobuf => write!(f, "protobuf"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}
