//! Haystack value and namespace model
//!
//! This crate holds the small slice of the Haystack data model that the
//! filter engine needs: typed scalar values, records ([`Dict`]), references
//! between records and the namespace contracts used for type and
//! relationship tests.
//!
//! # Quick Start
//!
//! ```
//! use haystack_model_rs::prelude::*;
//!
//! let site = dict! {
//!     "id" => Ref::new("site"),
//!     "site" => Value::Marker,
//!     "area" => Number::with_unit(1200.0, "ft²"),
//! };
//! assert!(site.has("site"));
//! ```

pub mod defs;
pub mod dict;
pub mod error;
pub mod kind;
pub mod namespace;
pub mod prelude;
pub mod value;

pub use defs::DefNamespace;
pub use dict::Dict;
pub use error::{ModelError, ModelResult};
pub use kind::Kind;
pub use namespace::{Namespace, Reflection, RelationshipQuery, Resolver};
pub use value::{Number, Ref, Symbol, Uri, Value};
