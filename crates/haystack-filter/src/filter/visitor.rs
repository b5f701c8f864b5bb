//! Visitor protocol over the filter AST.

use super::ast::{
    Cmp, Conjunction, Disjunction, Has, Missing, Parens, RelationshipTest, TypeTest,
    WildcardEquals,
};

/// A consumer of filter trees, called back once per node kind.
///
/// [`Node::accept`](super::Node::accept) dispatches on the node kind, so a
/// visitor must handle every kind; composite visitors recurse by calling
/// `accept` on the children they care about.
///
/// # Example
///
/// ```
/// use haystack_filter_rs::filter::{self, visitor::NodeVisitor, ast::*};
///
/// /// Counts terminal nodes.
/// struct Terms;
///
/// impl NodeVisitor for Terms {
///     type Output = usize;
///
///     fn visit_or(&mut self, node: &Disjunction) -> usize {
///         node.children().iter().map(|c| c.accept(self)).sum()
///     }
///     fn visit_and(&mut self, node: &Conjunction) -> usize {
///         node.children().iter().map(|c| c.accept(self)).sum()
///     }
///     fn visit_parens(&mut self, node: &Parens) -> usize {
///         node.inner().accept(self)
///     }
///     fn visit_has(&mut self, _: &Has) -> usize { 1 }
///     fn visit_missing(&mut self, _: &Missing) -> usize { 1 }
///     fn visit_cmp(&mut self, _: &Cmp) -> usize { 1 }
///     fn visit_type_test(&mut self, _: &TypeTest) -> usize { 1 }
///     fn visit_relationship(&mut self, _: &RelationshipTest) -> usize { 1 }
///     fn visit_wildcard_eq(&mut self, _: &WildcardEquals) -> usize { 1 }
/// }
///
/// let node = filter::parse("site and (equip or point) and not foo").unwrap();
/// assert_eq!(node.accept(&mut Terms), 4);
/// ```
pub trait NodeVisitor {
    /// Result of visiting a node.
    type Output;

    fn visit_or(&mut self, node: &Disjunction) -> Self::Output;
    fn visit_and(&mut self, node: &Conjunction) -> Self::Output;
    fn visit_parens(&mut self, node: &Parens) -> Self::Output;
    fn visit_has(&mut self, node: &Has) -> Self::Output;
    fn visit_missing(&mut self, node: &Missing) -> Self::Output;
    fn visit_cmp(&mut self, node: &Cmp) -> Self::Output;
    fn visit_type_test(&mut self, node: &TypeTest) -> Self::Output;
    fn visit_relationship(&mut self, node: &RelationshipTest) -> Self::Output;
    fn visit_wildcard_eq(&mut self, node: &WildcardEquals) -> Self::Output;
}
