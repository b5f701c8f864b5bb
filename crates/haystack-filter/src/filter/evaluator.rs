//! Filter evaluation against records.
//!
//! Every [`Node`] can be evaluated against an [`EvalContext`]. Evaluation is
//! total: a missing tag, an unresolvable ref or a kind mismatch makes the
//! enclosing predicate false, never an error.
//!
//! # Example
//!
//! ```
//! use haystack_filter_rs::filter::{self, EvalContext};
//! use haystack_model_rs::prelude::*;
//!
//! let node = filter::parse("point and curVal > 70°F").unwrap();
//! let record = dict! {
//!     "point" => Value::Marker,
//!     "curVal" => Number::with_unit(72.5, "°F"),
//! };
//! assert!(node.eval(&EvalContext::new(&record)));
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use haystack_model_rs::{Dict, Namespace, Ref, RelationshipQuery, Resolver, Value};
use log::trace;

use super::ast::{
    Cmp, Conjunction, Disjunction, Has, Missing, Node, Parens, RelationshipTest, TypeTest,
    WildcardEquals,
};
use super::token::PathToken;

/// Inputs for one evaluation: the subject record and the optional
/// collaborators used by type, relationship and ref-following tests.
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    record: &'a Dict,
    namespace: Option<&'a dyn Namespace>,
    resolve: Option<&'a dyn Resolver>,
}

impl<'a> EvalContext<'a> {
    /// Creates a context with no namespace and no resolver.
    pub fn new(record: &'a Dict) -> Self {
        Self {
            record,
            namespace: None,
            resolve: None,
        }
    }

    /// Attaches the namespace used by `^type` and relationship tests.
    pub fn with_namespace(mut self, namespace: &'a dyn Namespace) -> Self {
        self.namespace = Some(namespace);
        self
    }

    /// Attaches the resolver used to follow refs.
    pub fn with_resolver(mut self, resolve: &'a dyn Resolver) -> Self {
        self.resolve = Some(resolve);
        self
    }

    /// Returns the subject record.
    pub fn record(&self) -> &'a Dict {
        self.record
    }

    /// Returns the namespace, if any.
    pub fn namespace(&self) -> Option<&'a dyn Namespace> {
        self.namespace
    }

    /// Returns the resolver, if any.
    pub fn resolver(&self) -> Option<&'a dyn Resolver> {
        self.resolve
    }

    /// Resolves a ref through the resolver. Always `None` without one.
    pub fn resolve_ref(&self, reference: &Ref) -> Option<Arc<Dict>> {
        self.resolve.and_then(|resolve| resolve.resolve(reference))
    }

    /// Resolves a path against the subject record.
    pub fn resolve_path(&self, path: &PathToken) -> Vec<Value> {
        self.resolve_path_from(self.record, path)
    }

    /// Resolves a path against `record`.
    ///
    /// Each segment after the first is looked up on every value held so far:
    /// directly on dicts, on the resolved record for refs, and on each
    /// resolved record for lists of refs. An empty step ends resolution.
    pub fn resolve_path_from(&self, record: &Dict, path: &PathToken) -> Vec<Value> {
        let Some(first) = record.get(path.head()) else {
            return Vec::new();
        };

        let mut current = vec![first.clone()];
        for segment in path.tail() {
            let mut next = Vec::new();
            for value in &current {
                match value {
                    Value::Dict(dict) => next.extend(dict.get(segment).cloned()),
                    Value::Ref(reference) => next.extend(self.lookup(reference, segment)),
                    Value::List(items) => {
                        for reference in items.iter().filter_map(Value::as_reference) {
                            next.extend(self.lookup(reference, segment));
                        }
                    }
                    _ => {}
                }
            }

            trace!("{} -> {segment}: {} value(s)", path, next.len());
            if next.is_empty() {
                return next;
            }
            current = next;
        }
        current
    }

    /// Looks up `segment` on the record a ref points at.
    fn lookup(&self, reference: &Ref, segment: &str) -> Option<Value> {
        self.resolve_ref(reference)
            .and_then(|record| record.get(segment).cloned())
    }
}

impl std::fmt::Debug for EvalContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvalContext")
            .field("record", &self.record.id())
            .field("has_namespace", &self.namespace.is_some())
            .field("has_resolver", &self.resolve.is_some())
            .finish()
    }
}

impl Node {
    /// Returns true if the context's record matches this node.
    pub fn eval(&self, cx: &EvalContext<'_>) -> bool {
        match self {
            Node::Or(node) => node.eval(cx),
            Node::And(node) => node.eval(cx),
            Node::Parens(node) => node.eval(cx),
            Node::Has(node) => node.eval(cx),
            Node::Missing(node) => node.eval(cx),
            Node::Cmp(node) => node.eval(cx),
            Node::TypeTest(node) => node.eval(cx),
            Node::Relationship(node) => node.eval(cx),
            Node::WildcardEq(node) => node.eval(cx),
        }
    }

    /// Shorthand for evaluating against a bare record.
    pub fn matches(&self, record: &Dict) -> bool {
        self.eval(&EvalContext::new(record))
    }
}

impl Disjunction {
    pub fn eval(&self, cx: &EvalContext<'_>) -> bool {
        self.children().iter().any(|child| child.eval(cx))
    }
}

impl Conjunction {
    /// An empty conjunction is false.
    pub fn eval(&self, cx: &EvalContext<'_>) -> bool {
        !self.children().is_empty() && self.children().iter().all(|child| child.eval(cx))
    }
}

impl Parens {
    pub fn eval(&self, cx: &EvalContext<'_>) -> bool {
        self.inner().eval(cx)
    }
}

impl Has {
    pub fn eval(&self, cx: &EvalContext<'_>) -> bool {
        !cx.resolve_path(self.path()).is_empty()
    }
}

impl Missing {
    pub fn eval(&self, cx: &EvalContext<'_>) -> bool {
        cx.resolve_path(self.path()).is_empty()
    }
}

impl Cmp {
    /// True if any resolved value has the operand's kind and satisfies the
    /// operator.
    pub fn eval(&self, cx: &EvalContext<'_>) -> bool {
        let operand = self.value().value();
        cx.resolve_path(self.path())
            .iter()
            .any(|value| value.kind() == operand.kind() && self.op().test(value, operand))
    }
}

impl TypeTest {
    pub fn eval(&self, cx: &EvalContext<'_>) -> bool {
        cx.namespace()
            .is_some_and(|ns| ns.reflect(cx.record()).fits(self.symbol()))
    }
}

impl RelationshipTest {
    pub fn eval(&self, cx: &EvalContext<'_>) -> bool {
        let Some(ns) = cx.namespace() else {
            return false;
        };
        ns.has_relationship(&RelationshipQuery {
            subject: cx.record(),
            rel_name: self.name(),
            rel_term: self.term(),
            reference: self.reference(),
            resolve: cx.resolver(),
        })
    }
}

impl WildcardEquals {
    /// Follows the path from record to record until it reaches the target
    /// ref, runs out of refs, or revisits a ref.
    ///
    /// Only the first value at each step is followed.
    pub fn eval(&self, cx: &EvalContext<'_>) -> bool {
        let Some(mut current) = cx.resolve_path(self.path()).into_iter().next() else {
            return false;
        };

        let mut visited: HashSet<Ref> = HashSet::new();
        loop {
            let Value::Ref(reference) = &current else {
                return false;
            };
            if reference == self.reference() {
                return true;
            }
            if !visited.insert(reference.clone()) {
                trace!("{} *== {}: cycle at {reference}", self.path(), self.reference());
                return false;
            }

            let Some(record) = cx.resolve_ref(reference) else {
                return false;
            };
            let Some(next) = cx.resolve_path_from(&record, self.path()).into_iter().next() else {
                return false;
            };
            current = next;
        }
    }
}
