//! Filter expression parser, evaluator and rewriters for the Haystack filter
//! language.
//!
//! # Supported Syntax
//!
//! ## Tag tests
//! - `site` - records carrying the `site` tag
//! - `not site` - records without it
//! - `equipRef->siteRef->area` - paths follow refs from record to record
//!
//! ## Comparisons
//! - `==`, `!=`, `<`, `<=`, `>`, `>=` against a literal: `curVal > 70°F`,
//!   `dis == "AHU-1"`, `date >= 2024-01-01`, `siteRef == @s1`
//!
//! ## Namespace tests
//! - `^ahu` - records that fit the `ahu` type
//! - `inputs? ^elec @meter` (or `inputs-elec? @meter`) - relationship tests
//!
//! ## Wildcard dereference
//! - `equipRef *== @ahu` - follows `equipRef` repeatedly looking for `@ahu`
//!
//! ## Boolean Operators
//! - `and`, `or`, `not`, `()` - `and` binds tighter than `or`
//!
//! # Example
//!
//! ```
//! use haystack_filter_rs::filter::{self, EvalContext, NodeKind};
//! use haystack_model_rs::prelude::*;
//!
//! let node = filter::parse("site and area > 1000ft²").unwrap();
//! assert_eq!(node.kind(), NodeKind::Or);
//! assert_eq!(node.to_filter_text(), "site and area > 1000ft²");
//!
//! let site = dict! {
//!     "site" => Value::Marker,
//!     "area" => Number::with_unit(1200.0, "ft²"),
//! };
//! assert!(node.eval(&EvalContext::new(&site)));
//! ```

pub mod ast;
mod builder;
mod error;
mod evaluator;
mod implied;
mod legacy;
mod lexer;
mod parser;
mod source;
pub mod token;
mod verbatim;
pub mod visitor;

pub use ast::{Node, NodeKind};
pub use builder::FilterBuilder;
pub use error::{FilterError, FilterResult};
pub use evaluator::EvalContext;
pub use implied::{generate_implied, ImpliedVisitor};
pub use legacy::{generate_v3, LegacyFilter, LegacyVisitor, WILDCARD_MAX_DEPTH};
pub use lexer::Lexer;
pub use parser::FilterParser;
pub use source::{TokenList, TokenSource};
pub use token::{CmpOp, Token, TokenKind};
pub use verbatim::{render, VerbatimVisitor};
pub use visitor::NodeVisitor;

/// Parses filter text into a tree rooted at a [`Node::Or`].
///
/// # Errors
///
/// Returns a [`FilterError`] describing the first lexical or syntax problem.
pub fn parse(text: &str) -> FilterResult<Node> {
    FilterParser::parse_str(text)
}
