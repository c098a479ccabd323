//! Conversion of raw string tokens into typed field values.
//!
//! [`coerce`] never touches a target: it produces a fully converted
//! [`FieldValue`] (or reports why it did not), and the caller assigns it in a
//! single step. Scalar parse failures are lenient and report
//! [`Coercion::SkippedLeniently`]; slice failures are hard and report
//! [`Coercion::Failed`].

use bytes::Bytes;

/// Element type of a scalar field or of a slice field's items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// `String`
    String,
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `isize`
    Isize,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `usize`
    Usize,
    /// `f32`
    F32,
    /// `f64`
    F64,
}

/// Declared shape of a bindable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A single scalar value.
    Scalar(ScalarKind),
    /// A sequence of scalars, one per token.
    Slice(ScalarKind),
    /// A raw byte buffer.
    Bytes,
    /// Anything else; names the type for diagnostics.
    Unsupported(&'static str),
}

/// A converted scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// `String`
    String(String),
    /// `bool`
    Bool(bool),
    /// `i8`
    I8(i8),
    /// `i16`
    I16(i16),
    /// `i32`
    I32(i32),
    /// `i64`
    I64(i64),
    /// `isize`
    Isize(isize),
    /// `u8`
    U8(u8),
    /// `u16`
    U16(u16),
    /// `u32`
    U32(u32),
    /// `u64`
    U64(u64),
    /// `usize`
    Usize(usize),
    /// `f32`
    F32(f32),
    /// `f64`
    F64(f64),
}

/// A fully converted value ready to be assigned to a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Value for a [`FieldKind::Scalar`] field.
    Scalar(ScalarValue),
    /// Value for a [`FieldKind::Slice`] field.
    Slice(Vec<ScalarValue>),
    /// Value for a [`FieldKind::Bytes`] (or `Slice(U8)`) field.
    Bytes(Bytes),
}

/// Outcome of coercing a token sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Coercion {
    /// The tokens converted; assign this value.
    Set(FieldValue),
    /// A scalar token did not parse; the field stays as it was and the
    /// binding still counts as successful.
    SkippedLeniently,
    /// The tokens cannot be converted into this kind at all.
    Failed,
}

/// Converts `tokens` into a value of `kind`.
///
/// Scalars read only the first token. Slices convert every token, and a
/// single bad element fails the whole slice. An empty token sequence is
/// skipped; the bind operations never pass one.
///
/// # Example
///
/// ```rust
/// use desmos_bind::coerce::{coerce, Coercion, FieldKind, FieldValue, ScalarKind, ScalarValue};
///
/// let got = coerce(FieldKind::Scalar(ScalarKind::I64), &["42"]);
/// assert_eq!(got, Coercion::Set(FieldValue::Scalar(ScalarValue::I64(42))));
///
/// // Malformed scalars are skipped, not rejected.
/// let got = coerce(FieldKind::Scalar(ScalarKind::Bool), &["not-a-bool"]);
/// assert_eq!(got, Coercion::SkippedLeniently);
///
/// // Malformed slice elements reject the whole slice.
/// let got = coerce(FieldKind::Slice(ScalarKind::U8), &["1", "256"]);
/// assert_eq!(got, Coercion::Failed);
/// ```
pub fn coerce<S: AsRef<str>>(kind: FieldKind, tokens: &[S]) -> Coercion {
    let Some(first) = tokens.first() else {
        return Coercion::SkippedLeniently;
    };

    match kind {
        FieldKind::Scalar(scalar) => match parse_scalar(scalar, first.as_ref()) {
            Some(value) => Coercion::Set(FieldValue::Scalar(value)),
            None => Coercion::SkippedLeniently,
        },
        FieldKind::Slice(elem) => tokens
            .iter()
            .map(|token| parse_scalar(elem, token.as_ref()))
            .collect::<Option<Vec<_>>>()
            .map_or(Coercion::Failed, |items| {
                Coercion::Set(FieldValue::Slice(items))
            }),
        FieldKind::Bytes => tokens
            .iter()
            .map(|token| token.as_ref().parse::<u8>().ok())
            .collect::<Option<Vec<_>>>()
            .map_or(Coercion::Failed, |buf| {
                Coercion::Set(FieldValue::Bytes(Bytes::from(buf)))
            }),
        FieldKind::Unsupported(_) => Coercion::Failed,
    }
}

/// Parses a single token as `kind`.
///
/// Integers are base 10 and must fit the kind's width; `isize`/`usize` are
/// parsed at 64 bits and then narrowed to the platform width.
pub fn parse_scalar(kind: ScalarKind, token: &str) -> Option<ScalarValue> {
    let value = match kind {
        ScalarKind::String => ScalarValue::String(token.to_owned()),
        ScalarKind::Bool => ScalarValue::Bool(parse_bool(token)?),
        ScalarKind::I8 => ScalarValue::I8(token.parse().ok()?),
        ScalarKind::I16 => ScalarValue::I16(token.parse().ok()?),
        ScalarKind::I32 => ScalarValue::I32(token.parse().ok()?),
        ScalarKind::I64 => ScalarValue::I64(token.parse().ok()?),
        ScalarKind::Isize => {
            ScalarValue::Isize(isize::try_from(token.parse::<i64>().ok()?).ok()?)
        }
        ScalarKind::U8 => ScalarValue::U8(token.parse().ok()?),
        ScalarKind::U16 => ScalarValue::U16(token.parse().ok()?),
        ScalarKind::U32 => ScalarValue::U32(token.parse().ok()?),
        ScalarKind::U64 => ScalarValue::U64(token.parse().ok()?),
        ScalarKind::Usize => {
            ScalarValue::Usize(usize::try_from(token.parse::<u64>().ok()?).ok()?)
        }
        ScalarKind::F32 => ScalarValue::F32(parse_f32(token)?),
        ScalarKind::F64 => ScalarValue::F64(parse_f64(token)?),
    };
    Some(value)
}

/// Parses a boolean literal.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(token: &str) -> Option<bool> {
    match token {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn parse_f64(token: &str) -> Option<f64> {
    let value: f64 = token.parse().ok()?;
    if value.is_infinite() && !spells_infinity(token) {
        return None;
    }
    Some(value)
}

fn parse_f32(token: &str) -> Option<f32> {
    let value: f32 = token.parse().ok()?;
    if value.is_infinite() && !spells_infinity(token) {
        return None;
    }
    Some(value)
}

// "1e999" parses to infinity; only an explicit "inf"/"infinity" may.
fn spells_infinity(token: &str) -> bool {
    token
        .trim_start_matches(['+', '-'])
        .to_ascii_lowercase()
        .starts_with("inf")
}
