//! Lowering to the legacy (v3) filter dialect.
//!
//! The v3 dialect has no `^type` tests, relationship tests or `*==`. Those
//! are rewritten into plain tag and comparison terms using the namespace:
//!
//! - `^ahu` becomes `(ahu or ...)` over the type and its subtypes
//! - `inputs? ^elec` becomes `(elecIn or ...)` over the ref tags that
//!   implement the relationship; a target ref cannot be expressed, so it is
//!   dropped and [`LegacyFilter::requery`] is set
//! - `equipRef *== @ahu` becomes a chain of [`WILDCARD_MAX_DEPTH`]
//!   comparisons at increasing depth

use haystack_model_rs::{Namespace, Symbol};
use log::{debug, warn};

use super::ast::{
    Cmp, Conjunction, Disjunction, Has, Missing, Node, Parens, RelationshipTest, TypeTest,
    WildcardEquals,
};
use super::verbatim::{self, VerbatimVisitor};
use super::visitor::NodeVisitor;

/// Number of dereference levels a lowered `*==` covers.
pub const WILDCARD_MAX_DEPTH: usize = 10;

/// A filter lowered to the v3 dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyFilter {
    /// The lowered filter text.
    pub filter: String,
    /// True if the lowered filter is broader than the original, so results
    /// must be filtered again with the original filter.
    pub requery: bool,
}

/// Lowers a node to the v3 dialect.
pub fn generate_v3(node: &Node, namespace: &dyn Namespace) -> LegacyFilter {
    let mut visitor = LegacyVisitor::new(namespace);
    let filter = node.accept(&mut visitor);
    debug!("v3 lowering: {node} => {filter}");
    LegacyFilter {
        filter,
        requery: visitor.requery,
    }
}

/// Renders a type name as v3 terms; conjuncts become `(a and b)`.
fn type_term(symbol: &Symbol) -> String {
    if symbol.is_conjunct() {
        format!("({})", symbol.parts().join(" and "))
    } else {
        symbol.name().to_string()
    }
}

/// Joins alternatives with `or`, parenthesizing when there is more than one.
fn any_of(alternatives: Vec<String>) -> String {
    if alternatives.len() == 1 {
        alternatives.into_iter().collect()
    } else {
        format!("({})", alternatives.join(" or "))
    }
}

/// Visitor that lowers a filter to the v3 dialect.
pub struct LegacyVisitor<'a> {
    namespace: &'a dyn Namespace,
    requery: bool,
}

impl<'a> LegacyVisitor<'a> {
    pub fn new(namespace: &'a dyn Namespace) -> Self {
        Self {
            namespace,
            requery: false,
        }
    }

    /// True once any rewrite has widened the filter.
    pub fn requery(&self) -> bool {
        self.requery
    }

    fn join(&mut self, children: &[Node], separator: &str) -> String {
        children
            .iter()
            .map(|child| child.accept(self))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl NodeVisitor for LegacyVisitor<'_> {
    type Output = String;

    fn visit_or(&mut self, node: &Disjunction) -> String {
        self.join(node.children(), " or ")
    }

    fn visit_and(&mut self, node: &Conjunction) -> String {
        self.join(node.children(), " and ")
    }

    fn visit_parens(&mut self, node: &Parens) -> String {
        format!("({})", node.inner().accept(self))
    }

    fn visit_has(&mut self, node: &Has) -> String {
        VerbatimVisitor.visit_has(node)
    }

    fn visit_missing(&mut self, node: &Missing) -> String {
        VerbatimVisitor.visit_missing(node)
    }

    fn visit_cmp(&mut self, node: &Cmp) -> String {
        VerbatimVisitor.visit_cmp(node)
    }

    fn visit_type_test(&mut self, node: &TypeTest) -> String {
        let symbol = node.symbol();
        let mut alternatives = vec![type_term(symbol)];
        alternatives.extend(self.namespace.subtypes_of(symbol.name()).iter().map(type_term));
        any_of(alternatives)
    }

    fn visit_relationship(&mut self, node: &RelationshipTest) -> String {
        if node.reference().is_some() {
            self.requery = true;
        }

        let tags = self.namespace.relationship_ref_tags(node.name(), node.term());
        if tags.is_empty() {
            warn!(
                "no ref tags implement '{}'; lowering to a plain tag test",
                verbatim::render_relationship(node)
            );
            return node.name().to_string();
        }
        any_of(tags)
    }

    fn visit_wildcard_eq(&mut self, node: &WildcardEquals) -> String {
        let alternatives = (1..=WILDCARD_MAX_DEPTH)
            .map(|depth| format!("{} == {}", node.path().repeated(depth), node.reference()))
            .collect();
        any_of(alternatives)
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::*;
    use haystack_model_rs::{DefNamespace, Dict};

    fn def(name: &str) -> Dict {
        Dict::new().with("def", Symbol::new(name))
    }

    fn namespace() -> DefNamespace {
        DefNamespace::from_defs([
            def("equip"),
            def("ahu").with("is", Symbol::new("equip")),
            def("rtu").with("is", Symbol::new("ahu")),
            def("meter").with("is", Symbol::new("equip")),
            def("elec-meter").with("is", Symbol::new("meter")),
            def("inputs"),
            def("elecIn").with("inputs", Symbol::new("elec")),
            def("waterIn").with("inputs", Symbol::new("water")),
            def("elec"),
        ])
        .unwrap()
    }

    fn v3(text: &str) -> LegacyFilter {
        generate_v3(&parse(text).unwrap(), &namespace())
    }

    #[test]
    fn test_plain_terms_are_unchanged() {
        let lowered = v3("site and not foo or curVal > 5kW");
        assert_eq!(lowered.filter, "site and not foo or curVal > 5kW");
        assert!(!lowered.requery);
    }

    #[test]
    fn test_type_test_expands_subtypes() {
        assert_eq!(v3("^ahu").filter, "(ahu or rtu)");
        assert_eq!(v3("^rtu").filter, "rtu");
    }

    #[test]
    fn test_type_test_conjunct_subtype() {
        assert_eq!(v3("^meter").filter, "(meter or (elec and meter))");
    }

    #[test]
    fn test_relationship_lowering() {
        let lowered = v3("inputs?");
        assert_eq!(lowered.filter, "(elecIn or waterIn)");
        assert!(!lowered.requery);

        let lowered = v3("inputs? ^elec");
        assert_eq!(lowered.filter, "elecIn");
        assert!(!lowered.requery);
    }

    #[test]
    fn test_relationship_with_ref_sets_requery() {
        let lowered = v3("site and inputs? ^elec @meter");
        assert_eq!(lowered.filter, "site and elecIn");
        assert!(lowered.requery);
    }

    #[test]
    fn test_unknown_relationship_falls_back_to_tag() {
        assert_eq!(v3("outputs?").filter, "outputs");
    }

    #[test]
    fn test_wildcard_lowering_depth() {
        let lowered = v3("equipRef *== @ahu").filter;
        let inner = lowered
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .unwrap();
        let terms: Vec<&str> = inner.split(" or ").collect();
        assert_eq!(terms.len(), WILDCARD_MAX_DEPTH);
        assert_eq!(terms[0], "equipRef == @ahu");
        assert_eq!(terms[1], "equipRef->equipRef == @ahu");
        assert_eq!(terms[9].matches("equipRef").count(), 10);
    }
}
