//! Canonical filter text.
//!
//! Rendering is idempotent: parsing the output of [`render`] and rendering it
//! again yields the same text.

use super::ast::{
    Cmp, Conjunction, Disjunction, Has, Missing, Node, Parens, RelationshipTest, TypeTest,
    WildcardEquals,
};
use super::visitor::NodeVisitor;

/// Renders a node as canonical filter text.
pub fn render(node: &Node) -> String {
    node.accept(&mut VerbatimVisitor)
}

/// Renders a relationship test as `name? ^term @ref`.
pub(crate) fn render_relationship(node: &RelationshipTest) -> String {
    let mut text = format!("{}?", node.name());
    if let Some(term) = node.term() {
        text.push(' ');
        text.push_str(&term.to_string());
    }
    if let Some(reference) = node.reference() {
        text.push(' ');
        text.push_str(&reference.to_string());
    }
    text
}

/// Re-renders each node exactly as written, in canonical spacing.
#[derive(Debug, Default, Clone, Copy)]
pub struct VerbatimVisitor;

impl VerbatimVisitor {
    fn join(&mut self, children: &[Node], separator: &str) -> String {
        children
            .iter()
            .map(|child| child.accept(self))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl NodeVisitor for VerbatimVisitor {
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
        node.path().to_filter_text().to_string()
    }

    fn visit_missing(&mut self, node: &Missing) -> String {
        format!("not {}", node.path())
    }

    fn visit_cmp(&mut self, node: &Cmp) -> String {
        format!(
            "{} {} {}",
            node.path(),
            node.op(),
            node.value().to_filter_text()
        )
    }

    fn visit_type_test(&mut self, node: &TypeTest) -> String {
        node.symbol().to_string()
    }

    fn visit_relationship(&mut self, node: &RelationshipTest) -> String {
        render_relationship(node)
    }

    fn visit_wildcard_eq(&mut self, node: &WildcardEquals) -> String {
        format!("{} *== {}", node.path(), node.reference())
    }
}
