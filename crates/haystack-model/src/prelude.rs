//! Prelude module for convenient imports.
//!
//! ```
//! use haystack_model_rs::prelude::*;
//!
//! // Now you have access to:
//! // - Value, Kind, Number, Ref, Symbol, Uri (values)
//! // - Dict and the dict! macro (records)
//! // - Namespace, Reflection, Resolver, RelationshipQuery (contracts)
//! // - DefNamespace (table driven namespace)
//! ```

pub use crate::defs::DefNamespace;
pub use crate::dict;
pub use crate::dict::Dict;
pub use crate::error::{ModelError, ModelResult};
pub use crate::kind::Kind;
pub use crate::namespace::{Namespace, Reflection, RelationshipQuery, Resolver};
pub use crate::value::{Number, Ref, Symbol, Uri, Value};
