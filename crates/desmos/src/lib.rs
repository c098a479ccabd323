//! # Desmos
//!
//! **Per-field HTTP request parameter binding**
//!
//! Desmos fills the fields of a typed request target from the parts of an
//! HTTP request: path parameters, query string, headers, cookies, form,
//! JSON or protobuf bodies, and the raw body.
//!
//! - **Static field tables**: targets register typed accessors once; no
//!   runtime reflection
//! - **Shared rule errors**: every rule builds its errors up front and hands
//!   back the same error on every failure
//! - **Structured logs**: binding decisions are `tracing` events
//!
//! ## Quick Start
//!
//! ```rust
//! use desmos::prelude::*;
//! use desmos::bind::selector::slot;
//! use once_cell::sync::Lazy;
//!
//! #[derive(Default)]
//! struct GetOrder {
//!     id: u64,
//! }
//!
//! static FIELDS: Lazy<FieldTable<GetOrder>> =
//!     Lazy::new(|| FieldTable::<GetOrder>::new().field("id", |t, _| slot(&mut t.id)));
//!
//! impl Bindable for GetOrder {
//!     fn field_table() -> &'static FieldTable<Self> {
//!         &FIELDS
//!     }
//! }
//!
//! # fn main() -> Result<(), DesmosError> {
//! let options = DesmosConfig::default().bind_options();
//!
//! let (parts, ()) = http::Request::get("/orders?id=17").body(()).unwrap().into_parts();
//! let sources = RequestSources::from_parts(&parts, Bytes::new(), PathParams::new(), &options)?;
//!
//! let rule = BindingRule::query("id").required(true).build();
//! let resolver = FieldResolver::new("id", "ID").with_rule(rule.clone());
//!
//! let mut order = GetOrder::default();
//! resolver.bind(&rule, &mut order, &sources, options.check_optional_json)?;
//! assert_eq!(order.id, 17);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! | Crate | Module | Contents |
//! |-------|--------|----------|
//! | `desmos-bind` | [`bind`] | rules, resolver, coercion, selectors, request sources |
//! | `desmos-config` | [`config`] | layered TOML/JSON/env configuration |
//! | `desmos-telemetry` | [`telemetry`] | `tracing-subscriber` setup |

#![doc(html_root_url = "https://docs.rs/desmos/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;

pub use error::DesmosError;

// Re-export binding engine
pub use desmos_bind as bind;

// Re-export configuration
pub use desmos_config as config;

// Re-export logging setup
pub use desmos_telemetry as telemetry;

/// Validates `config`, installs its logging subscriber and returns the
/// binding options it describes.
///
/// # Errors
///
/// Returns [`DesmosError::Config`] for an invalid configuration and
/// [`DesmosError::Telemetry`] if logging cannot be installed (for example,
/// when a global subscriber already exists).
pub fn init(config: &desmos_config::DesmosConfig) -> Result<desmos_bind::BindOptions, DesmosError> {
    config.validate()?;
    desmos_telemetry::init_logging(&config.log_config())?;

    tracing::info!(
        service = %config.telemetry.service_name,
        environment = %config.telemetry.environment,
        max_body_bytes = config.binding.max_body_bytes,
        check_optional_json = config.binding.check_optional_json,
        "desmos initialized"
    );

    Ok(config.bind_options())
}

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use desmos::prelude::*;
/// ```
pub mod prelude {
    pub use crate::DesmosError;

    // Binding engine
    pub use desmos_bind::{
        BindError, BindErrorKind, BindOptions, Bindable, BindingRule, BodyCodec, Bytes, Cookies,
        FieldResolver, FieldTable, MultiMap, ParamSource, PathParams, RequestError,
        RequestSources, Selector,
    };

    // Configuration
    pub use desmos_config::{ConfigError, ConfigLoader, DesmosConfig};

    // Logging
    pub use desmos_telemetry::{init_logging, LogConfig, TelemetryError};
}
