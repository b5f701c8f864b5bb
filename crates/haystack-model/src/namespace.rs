//! Contracts the filter engine consumes from its collaborators.
//!
//! - [`Resolver`] turns a [`Ref`] into the record it points at.
//! - [`Namespace`] answers type, relationship and implied-tag questions.

use std::sync::Arc;

use crate::dict::Dict;
use crate::value::{Ref, Symbol, Value};

/// Resolves references to records.
///
/// Any `Fn(&Ref) -> Option<Arc<Dict>>` closure is a resolver.
pub trait Resolver {
    /// Returns the record for `reference`, or `None` if it is unknown.
    fn resolve(&self, reference: &Ref) -> Option<Arc<Dict>>;
}

impl<F> Resolver for F
where
    F: Fn(&Ref) -> Option<Arc<Dict>>,
{
    fn resolve(&self, reference: &Ref) -> Option<Arc<Dict>> {
        self(reference)
    }
}

/// The result of reflecting a record against a namespace.
pub trait Reflection {
    /// Returns true if the reflected record is an instance of `type_name`.
    fn fits(&self, type_name: &Symbol) -> bool;
}

/// Arguments of a relationship test such as `inputs? ^elec @meter`.
#[derive(Clone, Copy)]
pub struct RelationshipQuery<'a> {
    /// The record being tested.
    pub subject: &'a Dict,
    /// Relationship name (`inputs`).
    pub rel_name: &'a str,
    /// Optional qualifying term (`^elec`).
    pub rel_term: Option<&'a Symbol>,
    /// Optional target record (`@meter`).
    pub reference: Option<&'a Ref>,
    /// Resolver for following refs, if the caller supplied one.
    pub resolve: Option<&'a dyn Resolver>,
}

impl std::fmt::Debug for RelationshipQuery<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationshipQuery")
            .field("rel_name", &self.rel_name)
            .field("rel_term", &self.rel_term)
            .field("reference", &self.reference)
            .field("has_resolver", &self.resolve.is_some())
            .finish()
    }
}

/// Taxonomy and type resolution.
pub trait Namespace {
    /// Looks up a def record by name.
    fn by_name(&self, name: &str) -> Option<&Dict>;

    /// Returns the symbols listed in a def's `impliedBy` tag.
    fn implied_by(&self, name: &str) -> Vec<Symbol> {
        self.by_name(name)
            .and_then(|def| def.get("impliedBy"))
            .map(Value::symbols)
            .unwrap_or_default()
    }

    /// Reflects a record into the set of defs it implements.
    fn reflect<'a>(&'a self, record: &'a Dict) -> Box<dyn Reflection + 'a>;

    /// Returns every subtype of `type_name`, excluding the type itself.
    fn subtypes_of(&self, type_name: &str) -> Vec<Symbol>;

    /// Returns the ref tags that implement a relationship, optionally
    /// narrowed to those whose target fits `term`.
    fn relationship_ref_tags(&self, rel_name: &str, term: Option<&Symbol>) -> Vec<String>;

    /// Returns true if the query's relationship holds for its subject.
    fn has_relationship(&self, query: &RelationshipQuery<'_>) -> bool;
}
