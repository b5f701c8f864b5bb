//! An in-memory set of records, queryable with filters.
//!
//! The set resolves refs to its own records, so paths such as
//! `equipRef->siteRef->dis` and `*==` tests work across the records it holds.

use std::collections::BTreeMap;
use std::sync::Arc;

use haystack_model_rs::{Dict, Namespace, Ref, Resolver};
use log::{debug, warn};

use crate::filter::{EvalContext, Node};

/// Records keyed by their `id` ref.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: BTreeMap<String, Arc<Dict>>,
}

impl RecordSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, replacing any record with the same id.
    ///
    /// Returns false (and keeps nothing) if the record has no `id` ref.
    pub fn insert(&mut self, record: Dict) -> bool {
        let Some(id) = record.id().map(|r| r.id.clone()) else {
            warn!("skipping record without an id ref");
            return false;
        };
        self.records.insert(id, Arc::new(record));
        true
    }

    /// Looks up a record by ref.
    pub fn get(&self, reference: &Ref) -> Option<&Arc<Dict>> {
        self.records.get(&reference.id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Dict>> {
        self.records.values()
    }

    /// Returns true if the record `id` matches `filter`.
    ///
    /// Unknown ids never match.
    pub fn matches(&self, filter: &Node, id: &Ref) -> bool {
        self.get(id).is_some_and(|record| {
            filter.eval(&EvalContext::new(record).with_resolver(self))
        })
    }

    /// Returns every record that matches `filter`, in id order.
    pub fn query<'a>(
        &'a self,
        filter: &Node,
        namespace: Option<&'a dyn Namespace>,
    ) -> Vec<&'a Arc<Dict>> {
        let hits: Vec<_> = self
            .iter()
            .filter(|record| {
                let mut cx = EvalContext::new(record).with_resolver(self);
                if let Some(namespace) = namespace {
                    cx = cx.with_namespace(namespace);
                }
                filter.eval(&cx)
            })
            .collect();
        debug!("query '{filter}' matched {} of {} record(s)", hits.len(), self.len());
        hits
    }
}

impl Resolver for RecordSet {
    fn resolve(&self, reference: &Ref) -> Option<Arc<Dict>> {
        self.get(reference).cloned()
    }
}

impl FromIterator<Dict> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Dict>>(iter: I) -> Self {
        let mut set = Self::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse;
    use haystack_model_rs::{dict, Value};

    fn records() -> RecordSet {
        [
            dict! { "id" => Ref::new("s1"), "site" => Value::Marker, "dis" => "HQ" },
            dict! {
                "id" => Ref::new("ahu1"),
                "equip" => Value::Marker,
                "siteRef" => Ref::new("s1"),
            },
            dict! {
                "id" => Ref::new("p1"),
                "point" => Value::Marker,
                "equipRef" => Ref::new("ahu1"),
            },
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_insert_requires_id() {
        let mut set = RecordSet::new();
        assert!(!set.insert(dict! { "site" => Value::Marker }));
        assert!(set.is_empty());
    }

    #[test]
    fn test_matches_follows_refs_within_the_set() {
        let set = records();
        let node = parse("point and equipRef->siteRef->dis == \"HQ\"").unwrap();
        assert!(set.matches(&node, &Ref::new("p1")));
        assert!(!set.matches(&node, &Ref::new("ahu1")));
        assert!(!set.matches(&node, &Ref::new("missing")));
    }

    #[test]
    fn test_query_returns_records_in_id_order() {
        let set = records();
        let hits = set.query(&parse("site or equip").unwrap(), None);
        let ids: Vec<_> = hits.iter().filter_map(|r| r.id()).map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["ahu1", "s1"]);
    }

    #[test]
    fn test_query_wildcard() {
        let set = records();
        let hits = set.query(&parse("equipRef *== @ahu1").unwrap(), None);
        assert_eq!(hits.len(), 1);
    }
}
