//! # Desmos Bind
//!
//! Per-field request parameter binding.
//!
//! Each declared field of a binding target carries one [`BindingRule`] per
//! source it may be read from. A [`FieldResolver`] applies those rules, one
//! source at a time, against the parsed request held in [`RequestSources`]:
//! it locates the field through the target's [`selector::FieldTable`],
//! coerces the raw string tokens into the field's declared type, and reports
//! whether the field was bound.
//!
//! ## Sources
//!
//! | Source | Lookup | Operation |
//! |--------|--------|-----------|
//! | Path | single value by name | [`FieldResolver::bind_path`] |
//! | Query | all values by name | [`FieldResolver::bind_query`] |
//! | Header | all values, case-insensitive name | [`FieldResolver::bind_header`] |
//! | Cookie | every cookie with the name | [`FieldResolver::bind_cookie`] |
//! | Form / JSON / Protobuf | by negotiated [`BodyCodec`] | [`FieldResolver::bind_or_require_body`] |
//! | Raw body | whole body | [`FieldResolver::bind_raw_body`] |
//!
//! ## Leniency
//!
//! A scalar value that does not parse is skipped: the field keeps its value
//! and the bind still reports success. A slice with any element that does not
//! parse is rejected with the rule's type error. See [`coerce::Coercion`].
//!
//! ## Example
//!
//! ```rust
//! use desmos_bind::selector::{descend, slot, Bindable, FieldTable};
//! use desmos_bind::{BindErrorKind, BindingRule, FieldResolver, MultiMap};
//! use once_cell::sync::Lazy;
//!
//! #[derive(Default)]
//! struct Paging {
//!     limit: u32,
//! }
//!
//! #[derive(Default)]
//! struct Search {
//!     ids: Vec<i64>,
//!     paging: Option<Box<Paging>>,
//! }
//!
//! static FIELDS: Lazy<FieldTable<Search>> = Lazy::new(|| {
//!     FieldTable::<Search>::new()
//!         .field("ids", |s, _| slot(&mut s.ids))
//!         .field("paging.limit", |s, init| {
//!             descend(&mut s.paging, init).and_then(|p| slot(&mut p.limit))
//!         })
//! });
//!
//! impl Bindable for Search {
//!     fn field_table() -> &'static FieldTable<Self> {
//!         &FIELDS
//!     }
//! }
//!
//! let ids = FieldResolver::new("ids", "Ids")
//!     .with_rule(BindingRule::query("id").required(true).build());
//! let limit = FieldResolver::new("paging.limit", "Limit")
//!     .with_rule(BindingRule::query("limit").build());
//!
//! let query = MultiMap::from_query("id=1&id=2&limit=many").unwrap();
//! let mut search = Search::default();
//!
//! assert!(ids.bind_query(&ids.rules()[0], &mut search, &query).unwrap());
//! assert_eq!(search.ids, vec![1, 2]);
//!
//! // "many" is not a u32: skipped, but the level was still allocated.
//! assert!(limit.bind_query(&limit.rules()[0], &mut search, &query).unwrap());
//! assert_eq!(search.paging.as_ref().map(|p| p.limit), Some(0));
//!
//! let err = ids
//!     .bind_query(&ids.rules()[0], &mut Search::default(), &MultiMap::new())
//!     .unwrap_err();
//! assert_eq!(err.kind(), BindErrorKind::RequiredMissing);
//! assert_eq!(err.to_string(), "binding: expr_path=id, cause=missing required parameter");
//! ```

#![doc(html_root_url = "https://docs.rs/desmos-bind/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod codec;
pub mod coerce;
mod error;
pub mod jsonpath;
mod request;
mod resolver;
mod rule;
pub mod selector;
mod source;

pub use codec::BodyCodec;
pub use error::{default_error_factory, BindError, BindErrorKind, ErrorFactory, ParamSource};
pub use request::{BindOptions, RequestError, RequestSources, DEFAULT_MAX_BODY_BYTES};
pub use resolver::FieldResolver;
pub use rule::{BindingRule, BindingRuleBuilder};
pub use selector::{Bindable, FieldSlot, FieldTable, Selector};
pub use source::{Cookies, MultiMap, PathParams};

// Re-export useful types from dependencies
pub use bytes::Bytes;
