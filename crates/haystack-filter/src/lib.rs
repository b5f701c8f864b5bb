//! Haystack filter engine
//!
//! Parses filter expressions such as `equip and siteRef->area > 1000ft²` into
//! an immutable AST, evaluates them against records, and rewrites them into
//! other dialects.
//!
//! - [`filter`] - tokens, lexer, parser, AST, evaluator and the rewriting
//!   visitors
//! - [`records`] - an in-memory record set that doubles as ref resolver
//!
//! # Quick Start
//!
//! ```
//! use haystack_filter_rs::prelude::*;
//! use haystack_model_rs::prelude::*;
//!
//! let mut records = RecordSet::new();
//! records.insert(dict! { "id" => Ref::new("s1"), "site" => Value::Marker });
//! records.insert(dict! {
//!     "id" => Ref::new("ahu1"),
//!     "equip" => Value::Marker,
//!     "siteRef" => Ref::new("s1"),
//! });
//!
//! let node = parse("equip and siteRef->site").unwrap();
//! let hits = records.query(&node, None);
//! assert_eq!(hits.len(), 1);
//! ```

pub mod filter;
pub mod records;

/// Common imports.
pub mod prelude {
    pub use crate::filter::{
        generate_implied, generate_v3, parse, render, EvalContext, FilterBuilder, FilterError,
        FilterParser, FilterResult, LegacyFilter, Node, NodeKind, NodeVisitor,
    };
    pub use crate::records::RecordSet;
}
