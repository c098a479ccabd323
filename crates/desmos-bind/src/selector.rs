//! Typed field access for binding targets.
//!
//! A binding target exposes its bindable fields through a [`FieldTable`]: one
//! [`FieldDescriptor`] per selector, each holding an accessor function that
//! walks from the target to the field and hands back a [`FieldSlot`]. Nested
//! optional structures are walked with [`descend`] / [`descend_opt`], which
//! allocate missing levels only when asked to.
//!
//! # Example
//!
//! ```rust
//! use desmos_bind::selector::{descend, slot, Bindable, FieldTable, Selector};
//! use once_cell::sync::Lazy;
//!
//! #[derive(Default)]
//! struct User {
//!     age: u32,
//! }
//!
//! #[derive(Default)]
//! struct Request {
//!     id: i64,
//!     user: Option<Box<User>>,
//! }
//!
//! static FIELDS: Lazy<FieldTable<Request>> = Lazy::new(|| {
//!     FieldTable::<Request>::new()
//!         .field("id", |r, _| slot(&mut r.id))
//!         .field("user.age", |r, init| descend(&mut r.user, init).and_then(|u| slot(&mut u.age)))
//! });
//!
//! impl Bindable for Request {
//!     fn field_table() -> &'static FieldTable<Self> {
//!         &FIELDS
//!     }
//! }
//!
//! let mut req = Request::default();
//! // Without initialization the missing `user` level is reported absent.
//! assert!(req.select("user.age", false).is_none());
//! assert!(req.user.is_none());
//! // With initialization it is allocated on the way down.
//! assert!(req.select("user.age", true).is_some());
//! assert!(req.user.is_some());
//! ```

use crate::coerce::{FieldKind, FieldValue, ScalarKind, ScalarValue};
use bytes::Bytes;
use std::fmt;

/// A settable location inside a target.
///
/// Implemented for every [`FieldType`]; implement it by hand for field types
/// that cannot be bound, reporting [`FieldKind::Unsupported`].
pub trait FieldSlot {
    /// Declared kind of the field.
    fn kind(&self) -> FieldKind;

    /// Replaces the field with `value`.
    ///
    /// Returns false, leaving the field untouched, when `value` does not fit.
    fn assign(&mut self, value: FieldValue) -> bool;
}

/// A Rust type that can receive a [`FieldValue`].
pub trait FieldType: Sized {
    /// Kind reported to the coercion layer.
    const KIND: FieldKind;

    /// Converts a value of [`Self::KIND`] into `Self`.
    fn from_value(value: FieldValue) -> Option<Self>;
}

/// A scalar type usable as the element of a `Vec` field.
pub trait SliceElement: Sized {
    /// Element kind.
    const ELEM: ScalarKind;

    /// Extracts `Self` from a matching scalar.
    fn from_scalar(value: ScalarValue) -> Option<Self>;
}

impl<T: FieldType> FieldSlot for T {
    fn kind(&self) -> FieldKind {
        T::KIND
    }

    fn assign(&mut self, value: FieldValue) -> bool {
        match T::from_value(value) {
            Some(converted) => {
                *self = converted;
                true
            }
            None => false,
        }
    }
}

macro_rules! impl_scalar_field_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl SliceElement for $ty {
                const ELEM: ScalarKind = ScalarKind::$variant;

                fn from_scalar(value: ScalarValue) -> Option<Self> {
                    match value {
                        ScalarValue::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }

            impl FieldType for $ty {
                const KIND: FieldKind = FieldKind::Scalar(ScalarKind::$variant);

                fn from_value(value: FieldValue) -> Option<Self> {
                    match value {
                        FieldValue::Scalar(scalar) => Self::from_scalar(scalar),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_scalar_field_type! {
    String => String,
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
}

impl<T: SliceElement> FieldType for Vec<T> {
    const KIND: FieldKind = FieldKind::Slice(T::ELEM);

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Slice(items) => items.into_iter().map(T::from_scalar).collect(),
            FieldValue::Bytes(buf) => buf
                .iter()
                .map(|b| T::from_scalar(ScalarValue::U8(*b)))
                .collect(),
            FieldValue::Scalar(_) => None,
        }
    }
}

impl FieldType for Bytes {
    const KIND: FieldKind = FieldKind::Bytes;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bytes(buf) => Some(buf),
            FieldValue::Slice(items) => items
                .into_iter()
                .map(u8::from_scalar)
                .collect::<Option<Vec<_>>>()
                .map(Bytes::from),
            FieldValue::Scalar(_) => None,
        }
    }
}

// `Option<T>` is the optional-field form of `T`: binding always stores `Some`.
impl<T: FieldType> FieldType for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn from_value(value: FieldValue) -> Option<Self> {
        T::from_value(value).map(Some)
    }
}

/// Accessor from a target to one of its fields.
///
/// The flag asks the accessor to allocate absent intermediate levels. When it
/// is false the accessor must not mutate the target and returns `None` if any
/// level is missing.
pub type Accessor<T> = for<'a> fn(&'a mut T, bool) -> Option<&'a mut dyn FieldSlot>;

/// One registered field of a target type.
pub struct FieldDescriptor<T> {
    selector: String,
    access: Accessor<T>,
}

impl<T> FieldDescriptor<T> {
    /// Returns the selector this descriptor answers to.
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Resolves the field inside `target`.
    pub fn resolve<'a>(&self, target: &'a mut T, init: bool) -> Option<&'a mut dyn FieldSlot> {
        (self.access)(target, init)
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

/// Registry of a target type's bindable fields, keyed by selector.
///
/// Built once per type (typically in a `once_cell::sync::Lazy` static) and
/// shared read-only across requests.
pub struct FieldTable<T> {
    fields: Vec<FieldDescriptor<T>>,
}

impl<T> Default for FieldTable<T> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<T> FieldTable<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a field. A later registration for the same selector wins.
    #[must_use]
    pub fn field(mut self, selector: impl Into<String>, access: Accessor<T>) -> Self {
        let selector = selector.into();
        self.fields.retain(|d| d.selector != selector);
        self.fields.push(FieldDescriptor { selector, access });
        self
    }

    /// Returns the descriptor for `selector`.
    #[must_use]
    pub fn get(&self, selector: &str) -> Option<&FieldDescriptor<T>> {
        self.fields.iter().find(|d| d.selector == selector)
    }

    /// Resolves `selector` inside `target`.
    pub fn select<'a>(
        &self,
        target: &'a mut T,
        selector: &str,
        init: bool,
    ) -> Option<&'a mut dyn FieldSlot> {
        self.get(selector)?.resolve(target, init)
    }

    /// Returns an iterator over the registered selectors, in registration order.
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldDescriptor::selector)
    }

    /// Returns the number of registered fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<T> fmt::Debug for FieldTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.selectors()).finish()
    }
}

/// Resolves selectors to field slots inside a request-scoped target.
pub trait Selector {
    /// Returns the slot at `selector`, allocating missing levels when `init`
    /// is true. Returns `None` for unknown selectors and, when `init` is
    /// false, for paths with a missing level.
    fn select(&mut self, selector: &str, init: bool) -> Option<&mut dyn FieldSlot>;
}

/// A target type with a static field table.
pub trait Bindable: Sized + 'static {
    /// Returns the type's field table.
    fn field_table() -> &'static FieldTable<Self>;
}

impl<T: Bindable> Selector for T {
    fn select(&mut self, selector: &str, init: bool) -> Option<&mut dyn FieldSlot> {
        T::field_table().select(self, selector, init)
    }
}

/// Wraps a field reference as a slot; the usual tail of an accessor.
pub fn slot<'a, V: FieldSlot + 'a>(value: &'a mut V) -> Option<&'a mut dyn FieldSlot> {
    Some(value as &mut dyn FieldSlot)
}

/// Steps into a boxed optional level, allocating it if `init` is set.
pub fn descend<S: Default>(level: &mut Option<Box<S>>, init: bool) -> Option<&mut S> {
    if level.is_none() {
        if !init {
            return None;
        }
        *level = Some(Box::default());
    }
    level.as_deref_mut()
}

/// Steps into an inline optional level, allocating it if `init` is set.
pub fn descend_opt<S: Default>(level: &mut Option<S>, init: bool) -> Option<&mut S> {
    if init {
        Some(level.get_or_insert_with(S::default))
    } else {
        level.as_mut()
    }
}
