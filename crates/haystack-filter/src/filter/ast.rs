//! Abstract Syntax Tree (AST) for filter expressions.
//!
//! A parsed filter is a tree of [`Node`]s. Composite nodes ([`Disjunction`],
//! [`Conjunction`], [`Parens`]) only carry children; terminal nodes only
//! carry tokens. Nodes are immutable once built; rewriting produces new
//! nodes.

use std::fmt;

use haystack_model_rs::{Ref, Symbol};
use serde_json::json;

use super::token::{CmpOp, PathToken, RelationshipToken, Token, ValueToken};
use super::verbatim;
use super::visitor::NodeVisitor;

/// Discriminant of [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Or,
    And,
    Parens,
    Has,
    Missing,
    Cmp,
    TypeTest,
    Relationship,
    WildcardEq,
}

impl NodeKind {
    /// Returns the name used in debug output.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Or => "or",
            NodeKind::And => "and",
            NodeKind::Parens => "parens",
            NodeKind::Has => "has",
            NodeKind::Missing => "missing",
            NodeKind::Cmp => "cmp",
            NodeKind::TypeTest => "isA",
            NodeKind::Relationship => "relationship",
            NodeKind::WildcardEq => "wildcardEq",
        }
    }

    /// Returns true for nodes that carry children instead of tokens.
    pub fn is_composite(self) -> bool {
        matches!(self, NodeKind::Or | NodeKind::And | NodeKind::Parens)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Converts a path into the token the lexer would have produced for it.
fn path_token(path: &PathToken) -> Token {
    if path.is_single() {
        Token::Text(path.head().to_string())
    } else {
        Token::Path(path.clone())
    }
}

// ==================== Composite nodes ====================

/// `a or b or c`: true if any child is true.
#[derive(Debug, Clone, PartialEq)]
pub struct Disjunction {
    children: Vec<Node>,
}

impl Disjunction {
    /// Creates a disjunction of conjunctions.
    pub fn new(children: Vec<Conjunction>) -> Self {
        Self {
            children: children.into_iter().map(Node::And).collect(),
        }
    }

    /// Returns the conjunctions, each wrapped as a [`Node::And`].
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Wraps a single term as `Or[And[term]]`.
    pub fn single(term: Node) -> Self {
        Self::new(vec![Conjunction::new(vec![term])])
    }
}

/// `a and b and c`: true if every child is true.
#[derive(Debug, Clone, PartialEq)]
pub struct Conjunction {
    children: Vec<Node>,
}

impl Conjunction {
    /// Creates a conjunction of terms (terminal or parenthesized nodes).
    pub fn new(children: Vec<Node>) -> Self {
        debug_assert!(children
            .iter()
            .all(|c| !matches!(c, Node::Or(_) | Node::And(_))));
        Self { children }
    }

    /// Returns the terms.
    pub fn children(&self) -> &[Node] {
        &self.children
    }
}

/// `( ... )`: wraps exactly one disjunction.
#[derive(Debug, Clone, PartialEq)]
pub struct Parens {
    inner: Box<Node>,
}

impl Parens {
    /// Wraps a disjunction in parentheses.
    pub fn new(inner: Disjunction) -> Self {
        Self {
            inner: Box::new(Node::Or(inner)),
        }
    }

    /// Returns the wrapped [`Node::Or`].
    pub fn inner(&self) -> &Node {
        &self.inner
    }
}

// ==================== Terminal nodes ====================

/// `path`: true if the path resolves to at least one value.
#[derive(Debug, Clone, PartialEq)]
pub struct Has {
    path: PathToken,
}

impl Has {
    pub fn new(path: PathToken) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathToken {
        &self.path
    }
}

/// `not path`: true if the path resolves to nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Missing {
    path: PathToken,
}

impl Missing {
    pub fn new(path: PathToken) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathToken {
        &self.path
    }
}

/// `path op value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cmp {
    path: PathToken,
    op: CmpOp,
    value: ValueToken,
}

impl Cmp {
    pub fn new(path: PathToken, op: CmpOp, value: ValueToken) -> Self {
        Self { path, op, value }
    }

    pub fn path(&self) -> &PathToken {
        &self.path
    }

    pub fn op(&self) -> CmpOp {
        self.op
    }

    pub fn value(&self) -> &ValueToken {
        &self.value
    }

    /// Returns a copy of this comparison against a different path.
    pub fn with_path(&self, path: PathToken) -> Self {
        Self::new(path, self.op, self.value.clone())
    }
}

/// `^type`: true if the record fits the named type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeTest {
    symbol: Symbol,
}

impl TypeTest {
    pub fn new(symbol: Symbol) -> Self {
        Self { symbol }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }
}

/// `rel? ^term @ref`: true if the namespace confirms the relationship.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipTest {
    relationship: RelationshipToken,
    reference: Option<Ref>,
}

impl RelationshipTest {
    pub fn new(relationship: RelationshipToken, reference: Option<Ref>) -> Self {
        Self {
            relationship,
            reference,
        }
    }

    pub fn relationship(&self) -> &RelationshipToken {
        &self.relationship
    }

    /// Returns the relationship name.
    pub fn name(&self) -> &str {
        self.relationship.name()
    }

    /// Returns the qualifying term, if any.
    pub fn term(&self) -> Option<&Symbol> {
        self.relationship.term()
    }

    /// Returns the target ref, if any.
    pub fn reference(&self) -> Option<&Ref> {
        self.reference.as_ref()
    }

    /// Returns a copy of this test under a different relationship name.
    pub fn with_name(&self, name: &str) -> Self {
        Self::new(self.relationship.with_name(name), self.reference.clone())
    }
}

/// `path *== @ref`: true if following `path` repeatedly reaches `@ref`.
#[derive(Debug, Clone, PartialEq)]
pub struct WildcardEquals {
    path: PathToken,
    reference: Ref,
}

impl WildcardEquals {
    pub fn new(path: PathToken, reference: Ref) -> Self {
        Self { path, reference }
    }

    pub fn path(&self) -> &PathToken {
        &self.path
    }

    pub fn reference(&self) -> &Ref {
        &self.reference
    }

    /// Returns a copy of this test along a different path.
    pub fn with_path(&self, path: PathToken) -> Self {
        Self::new(path, self.reference.clone())
    }
}

// ==================== Node ====================

/// A node of a parsed filter.
///
/// Equality is structural: two nodes are equal if they have the same kind,
/// equal tokens and equal children.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Or(Disjunction),
    And(Conjunction),
    Parens(Parens),
    Has(Has),
    Missing(Missing),
    Cmp(Cmp),
    TypeTest(TypeTest),
    Relationship(RelationshipTest),
    WildcardEq(WildcardEquals),
}

impl Node {
    /// Returns the node kind.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Or(_) => NodeKind::Or,
            Node::And(_) => NodeKind::And,
            Node::Parens(_) => NodeKind::Parens,
            Node::Has(_) => NodeKind::Has,
            Node::Missing(_) => NodeKind::Missing,
            Node::Cmp(_) => NodeKind::Cmp,
            Node::TypeTest(_) => NodeKind::TypeTest,
            Node::Relationship(_) => NodeKind::Relationship,
            Node::WildcardEq(_) => NodeKind::WildcardEq,
        }
    }

    /// Returns the child nodes. Empty for terminal nodes.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Or(or) => or.children(),
            Node::And(and) => and.children(),
            Node::Parens(parens) => std::slice::from_ref(parens.inner()),
            _ => &[],
        }
    }

    /// Returns the tokens of a terminal node. Empty for composite nodes.
    pub fn tokens(&self) -> Vec<Token> {
        match self {
            Node::Or(_) | Node::And(_) | Node::Parens(_) => Vec::new(),
            Node::Has(has) => vec![path_token(has.path())],
            Node::Missing(missing) => vec![path_token(missing.path())],
            Node::Cmp(cmp) => vec![
                path_token(cmp.path()),
                Token::Cmp(cmp.op()),
                Token::Value(cmp.value().clone()),
            ],
            Node::TypeTest(test) => vec![Token::value(test.symbol().clone())],
            Node::Relationship(rel) => {
                let mut tokens = vec![Token::Relationship(rel.relationship().clone())];
                if let Some(reference) = rel.reference() {
                    tokens.push(Token::value(reference.clone()));
                }
                tokens
            }
            Node::WildcardEq(wildcard) => vec![
                path_token(wildcard.path()),
                Token::WildcardEq,
                Token::value(wildcard.reference().clone()),
            ],
        }
    }

    /// Dispatches to the visitor method for this node's kind.
    pub fn accept<V: NodeVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Node::Or(node) => visitor.visit_or(node),
            Node::And(node) => visitor.visit_and(node),
            Node::Parens(node) => visitor.visit_parens(node),
            Node::Has(node) => visitor.visit_has(node),
            Node::Missing(node) => visitor.visit_missing(node),
            Node::Cmp(node) => visitor.visit_cmp(node),
            Node::TypeTest(node) => visitor.visit_type_test(node),
            Node::Relationship(node) => visitor.visit_relationship(node),
            Node::WildcardEq(node) => visitor.visit_wildcard_eq(node),
        }
    }

    /// Renders the node as canonical filter text.
    pub fn to_filter_text(&self) -> String {
        verbatim::render(self)
    }

    /// Describes the node and its subtree for debugging.
    pub fn to_debug_json(&self) -> serde_json::Value {
        let kind = self.kind().name();
        if self.kind().is_composite() {
            let children: Vec<_> = self.children().iter().map(Node::to_debug_json).collect();
            json!({ "type": kind, "children": children })
        } else {
            let tokens: Vec<_> = self.tokens().iter().map(Token::to_debug_json).collect();
            json!({ "type": kind, "tokens": tokens })
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_filter_text())
    }
}
