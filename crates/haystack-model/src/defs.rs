//! A table driven namespace built from def records.
//!
//! Each def is a [`Dict`] carrying a `def` symbol plus optional tags:
//!
//! - `is` - supertype symbol(s), giving nominal subtyping
//! - `impliedBy` - symbols that imply this def when it is absent
//! - `transitive` - marker on relationship defs that chain through refs
//! - `<relationship>: ^term` - on ref tag defs, the relationships they implement
//!
//! Conjunct defs such as `elec-meter` are fitted by any record carrying all
//! of their parts.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use log::trace;
use strsim::levenshtein;

use crate::dict::Dict;
use crate::error::{ModelError, ModelResult};
use crate::namespace::{Namespace, Reflection, RelationshipQuery, Resolver};
use crate::value::{Ref, Symbol, Value};

/// Maximum Levenshtein distance to consider a def name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 2;

/// Namespace over an explicit set of def records.
#[derive(Debug, Clone, Default)]
pub struct DefNamespace {
    defs: BTreeMap<String, Dict>,
}

impl DefNamespace {
    /// Creates an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a namespace from def records.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingDefSymbol`] if a record has no `def` symbol.
    pub fn from_defs(defs: impl IntoIterator<Item = Dict>) -> ModelResult<Self> {
        let mut namespace = Self::new();
        for def in defs {
            namespace.insert(def)?;
        }
        Ok(namespace)
    }

    /// Adds or replaces a def record.
    pub fn insert(&mut self, def: Dict) -> ModelResult<()> {
        let name = match def.get("def") {
            Some(Value::Symbol(symbol)) => symbol.name().to_string(),
            _ => return Err(ModelError::MissingDefSymbol),
        };
        self.defs.insert(name, def);
        Ok(())
    }

    /// Returns the number of defs.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Returns true if no defs are registered.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Iterates def names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }

    /// Returns `name` plus all of its transitive supertypes.
    pub fn inheritance(&self, name: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut pending = vec![name.to_string()];
        while let Some(current) = pending.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(supers) = self.defs.get(&current).and_then(|d| d.get("is")) {
                pending.extend(supers.symbols().into_iter().map(|s| s.name().to_string()));
            }
        }
        seen
    }

    /// Returns true if def `name` is `type_name` or one of its subtypes.
    pub fn is_subtype(&self, name: &str, type_name: &str) -> bool {
        name == type_name || self.inheritance(name).contains(type_name)
    }

    /// Finds the closest def name to an unknown one.
    pub fn suggest(&self, name: &str) -> Option<&str> {
        let (best, distance) = self
            .names()
            .map(|candidate| (candidate, levenshtein(name, candidate)))
            .min_by_key(|(_, d)| *d)?;

        if distance > 0 && distance <= MAX_SUGGESTION_DISTANCE {
            Some(best)
        } else {
            None
        }
    }

    /// Returns true if the relationship def is marked `transitive`.
    fn is_transitive(&self, rel_name: &str) -> bool {
        self.defs
            .get(rel_name)
            .is_some_and(|def| def.has("transitive"))
    }

    /// Checks a subject's ref tags against the query target, following refs
    /// through the resolver for transitive relationships.
    fn holds(
        &self,
        subject: &Dict,
        tags: &[String],
        target: Option<&Ref>,
        transitive: bool,
        resolve: Option<&dyn Resolver>,
        visited: &mut HashSet<Ref>,
    ) -> bool {
        for tag in tags {
            let Some(value) = subject.get(tag) else {
                continue;
            };
            for reference in value.refs() {
                match target {
                    None => return true,
                    Some(target) if target == reference => return true,
                    Some(_) => {}
                }

                if !transitive || !visited.insert(reference.clone()) {
                    continue;
                }
                let Some(next) = resolve.and_then(|r| r.resolve(reference)) else {
                    continue;
                };
                trace!("following {tag} to {reference}");
                if self.holds(&next, tags, target, transitive, resolve, visited) {
                    return true;
                }
            }
        }
        false
    }
}

/// The defs a record implements, as seen by a [`DefNamespace`].
struct DefReflection<'a> {
    namespace: &'a DefNamespace,
    entries: Vec<&'a str>,
}

impl Reflection for DefReflection<'_> {
    fn fits(&self, type_name: &Symbol) -> bool {
        self.entries
            .iter()
            .any(|entry| self.namespace.is_subtype(entry, type_name.name()))
    }
}

impl Namespace for DefNamespace {
    fn by_name(&self, name: &str) -> Option<&Dict> {
        self.defs.get(name)
    }

    fn reflect<'a>(&'a self, record: &'a Dict) -> Box<dyn Reflection + 'a> {
        let entries = self
            .defs
            .keys()
            .filter(|name| {
                let symbol = Symbol::new(name.as_str());
                if symbol.is_conjunct() {
                    symbol.parts().iter().all(|part| record.has(part))
                } else {
                    record.has(name)
                }
            })
            .map(String::as_str)
            .collect();

        Box::new(DefReflection {
            namespace: self,
            entries,
        })
    }

    fn subtypes_of(&self, type_name: &str) -> Vec<Symbol> {
        self.defs
            .keys()
            .filter(|name| name.as_str() != type_name && self.is_subtype(name, type_name))
            .map(|name| Symbol::new(name.as_str()))
            .collect()
    }

    fn relationship_ref_tags(&self, rel_name: &str, term: Option<&Symbol>) -> Vec<String> {
        self.defs
            .iter()
            .filter(|(_, def)| {
                let Some(targets) = def.get(rel_name) else {
                    return false;
                };
                match term {
                    None => true,
                    Some(term) => targets
                        .symbols()
                        .iter()
                        .any(|target| self.is_subtype(target.name(), term.name())),
                }
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn has_relationship(&self, query: &RelationshipQuery<'_>) -> bool {
        let tags = self.relationship_ref_tags(query.rel_name, query.rel_term);
        if tags.is_empty() {
            return false;
        }

        let mut visited = HashSet::new();
        self.holds(
            query.subject,
            &tags,
            query.reference,
            self.is_transitive(query.rel_name),
            query.resolve,
            &mut visited,
        )
    }
}
