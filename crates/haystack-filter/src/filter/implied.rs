//! Implied-tag expansion.
//!
//! A def may declare `impliedBy` symbols: tags that stand in for it when it
//! is absent. Expansion rewrites each term so records carrying only the
//! implying tags still match:
//!
//! ```text
//! impliedTag              =>  (impliedTag or (site and zone))
//! impliedTag->dis == "x"  =>  (impliedTag->dis == "x" or (site->dis == "x" and zone->dis == "x"))
//! not impliedTag          =>  (not impliedTag and (not site or not zone))
//! ```
//!
//! `^type` tests are first lowered to tag terms with the v3 rewrite and the
//! result is expanded again.

use std::collections::HashSet;

use haystack_model_rs::Namespace;
use log::{debug, warn};

use super::ast::{
    Cmp, Conjunction, Disjunction, Has, Missing, Node, Parens, RelationshipTest, TypeTest,
    WildcardEquals,
};
use super::legacy::generate_v3;
use super::parser::FilterParser;
use super::verbatim;
use super::visitor::NodeVisitor;

/// Expands implied tags throughout a node.
pub fn generate_implied(node: &Node, namespace: &dyn Namespace) -> String {
    let text = node.accept(&mut ImpliedVisitor::new(namespace));
    debug!("implied expansion: {node} => {text}");
    text
}

/// Visitor that expands implied tags.
pub struct ImpliedVisitor<'a> {
    namespace: &'a dyn Namespace,
}

impl<'a> ImpliedVisitor<'a> {
    pub fn new(namespace: &'a dyn Namespace) -> Self {
        Self { namespace }
    }

    fn join(&mut self, children: &[Node], separator: &str) -> String {
        children
            .iter()
            .map(|child| child.accept(self))
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Expands the term rendered by `term` for `name` and everything that
    /// implies it.
    ///
    /// With `negated` set the connectives are swapped, giving the De Morgan
    /// dual of the positive expansion.
    fn expand(&self, name: &str, negated: bool, term: &dyn Fn(&str) -> String) -> String {
        let mut visiting = HashSet::new();
        self.expand_from(name, negated, term, &mut visiting)
    }

    fn expand_from(
        &self,
        name: &str,
        negated: bool,
        term: &dyn Fn(&str) -> String,
        visiting: &mut HashSet<String>,
    ) -> String {
        let original = term(name);
        let implied = self.namespace.implied_by(name);
        if implied.is_empty() || !visiting.insert(name.to_string()) {
            return original;
        }

        let mut alternatives: Vec<String> = implied
            .iter()
            .map(|symbol| self.expand_from(symbol.name(), negated, term, visiting))
            .collect();
        visiting.remove(name);

        let (outer, inner) = if negated {
            (" and ", " or ")
        } else {
            (" or ", " and ")
        };
        let implied_text = if alternatives.len() > 1 {
            format!("({})", alternatives.join(inner))
        } else {
            alternatives.remove(0)
        };
        format!("({original}{outer}{implied_text})")
    }
}

impl NodeVisitor for ImpliedVisitor<'_> {
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
        let path = node.path();
        self.expand(path.head(), false, &|head: &str| {
            path.with_head(head).to_filter_text().to_string()
        })
    }

    fn visit_missing(&mut self, node: &Missing) -> String {
        let path = node.path();
        self.expand(path.head(), true, &|head: &str| {
            format!("not {}", path.with_head(head))
        })
    }

    fn visit_cmp(&mut self, node: &Cmp) -> String {
        self.expand(node.path().head(), false, &|head: &str| {
            verbatim::render(&Node::Cmp(node.with_path(node.path().with_head(head))))
        })
    }

    fn visit_type_test(&mut self, node: &TypeTest) -> String {
        let lowered = generate_v3(&Node::TypeTest(node.clone()), self.namespace).filter;
        match FilterParser::parse_str(&lowered) {
            Ok(reparsed) => reparsed.accept(self),
            Err(err) => {
                warn!("cannot expand lowered type test '{lowered}': {err}");
                lowered
            }
        }
    }

    fn visit_relationship(&mut self, node: &RelationshipTest) -> String {
        self.expand(node.name(), false, &|name: &str| {
            verbatim::render_relationship(&node.with_name(name))
        })
    }

    fn visit_wildcard_eq(&mut self, node: &WildcardEquals) -> String {
        self.expand(node.path().head(), false, &|head: &str| {
            verbatim::render(&Node::WildcardEq(
                node.with_path(node.path().with_head(head)),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::*;
    use haystack_model_rs::{DefNamespace, Dict, Symbol};

    fn def(name: &str) -> Dict {
        Dict::new().with("def", Symbol::new(name))
    }

    fn namespace() -> DefNamespace {
        DefNamespace::from_defs([
            def("impliedTag").with("impliedBy", vec![Symbol::new("site"), Symbol::new("zone")]),
            def("single").with("impliedBy", vec![Symbol::new("other")]),
            def("ahu").with("impliedBy", vec![Symbol::new("airHandler")]),
            def("rtu").with("is", Symbol::new("ahu")),
            def("loopA").with("impliedBy", vec![Symbol::new("loopB")]),
            def("loopB").with("impliedBy", vec![Symbol::new("loopA")]),
        ])
        .unwrap()
    }

    fn implied(text: &str) -> String {
        generate_implied(&parse(text).unwrap(), &namespace())
    }

    #[test]
    fn test_has_with_multiple_implied_tags() {
        assert_eq!(implied("impliedTag"), "(impliedTag or (site and zone))");
    }

    #[test]
    fn test_has_with_single_implied_tag() {
        assert_eq!(implied("single"), "(single or other)");
    }

    #[test]
    fn test_terms_without_implied_tags_are_unchanged() {
        assert_eq!(implied("site and foo == 1"), "site and foo == 1");
    }

    #[test]
    fn test_cmp_keeps_path_suffix_and_operand() {
        assert_eq!(
            implied("single->dis == \"x\""),
            "(single->dis == \"x\" or other->dis == \"x\")"
        );
    }

    #[test]
    fn test_missing_uses_de_morgan() {
        assert_eq!(
            implied("not impliedTag"),
            "(not impliedTag and (not site or not zone))"
        );
    }

    #[test]
    fn test_wildcard_expansion() {
        assert_eq!(
            implied("single *== @x"),
            "(single *== @x or other *== @x)"
        );
    }

    #[test]
    fn test_type_test_is_lowered_then_expanded() {
        assert_eq!(implied("^ahu"), "((ahu or airHandler) or rtu)");
    }

    #[test]
    fn test_cyclic_implied_by_terminates() {
        assert_eq!(implied("loopA"), "(loopA or (loopB or loopA))");
    }

    #[test]
    fn test_expanded_output_parses() {
        for text in ["impliedTag and not single", "^ahu or single->x > 2"] {
            assert!(parse(&implied(text)).is_ok());
        }
    }
}
