//! Filter tokens.
//!
//! Tokens are immutable once built. Each one can render itself back to
//! filter text, compare structurally with another token (`PartialEq`) and
//! describe itself as a JSON debug structure.

use std::cmp::Ordering;
use std::fmt;

use haystack_model_rs::{Kind, Ref, Symbol, Value};
use once_cell::sync::OnceCell;
use serde_json::json;

use super::error::{FilterError, FilterResult};

/// Separator between path segments.
pub const PATH_SEPARATOR: &str = "->";

/// Discriminant of [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Text,
    Path,
    Value,
    Relationship,
    And,
    Or,
    Not,
    LParen,
    RParen,
    Cmp,
    WildcardEq,
    Eof,
}

impl TokenKind {
    /// Returns the lowercase name used in debug output.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Text => "text",
            TokenKind::Path => "path",
            TokenKind::Value => "value",
            TokenKind::Relationship => "relationship",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Not => "not",
            TokenKind::LParen => "lparen",
            TokenKind::RParen => "rparen",
            TokenKind::Cmp => "cmp",
            TokenKind::WildcardEq => "wildcardEq",
            TokenKind::Eof => "eof",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ==================== Comparison operators ====================

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    /// All operators, in the order they are documented.
    pub const ALL: [CmpOp; 6] = [
        CmpOp::Eq,
        CmpOp::Ne,
        CmpOp::Lt,
        CmpOp::Le,
        CmpOp::Gt,
        CmpOp::Ge,
    ];

    /// Returns the operator's filter text.
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }

    /// Applies the operator to two values of the same kind.
    ///
    /// Equality operators use value equality; ordering operators use the
    /// three-way comparison.
    pub fn test(self, lhs: &Value, rhs: &Value) -> bool {
        match self {
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
            CmpOp::Lt => lhs.compare_to(rhs) == Ordering::Less,
            CmpOp::Le => lhs.compare_to(rhs) != Ordering::Greater,
            CmpOp::Gt => lhs.compare_to(rhs) == Ordering::Greater,
            CmpOp::Ge => lhs.compare_to(rhs) != Ordering::Less,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ==================== Paths ====================

/// Returns true if `name` is a valid tag name / path segment.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A non-empty sequence of tag names, written `a->b->c`.
#[derive(Debug, Clone)]
pub struct PathToken {
    segments: Vec<String>,
    text: OnceCell<String>,
}

impl PathToken {
    /// Builds a path from already validated segments.
    pub(crate) fn from_segments(segments: Vec<String>) -> Self {
        debug_assert!(!segments.is_empty());
        Self {
            segments,
            text: OnceCell::new(),
        }
    }

    /// Parses `a->b->c` into a path.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidLiteral`] if any segment is not a valid
    /// tag name.
    pub fn parse(text: &str) -> FilterResult<Self> {
        let segments: Vec<String> = text
            .split(PATH_SEPARATOR)
            .map(|s| s.trim().to_string())
            .collect();
        if segments.iter().all(|s| is_identifier(s)) {
            Ok(Self::from_segments(segments))
        } else {
            Err(FilterError::invalid_literal(text, 0))
        }
    }

    /// Returns the path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the first segment.
    pub fn head(&self) -> &str {
        &self.segments[0]
    }

    /// Returns the segments after the first.
    pub fn tail(&self) -> &[String] {
        &self.segments[1..]
    }

    /// Returns true for single-segment paths.
    pub fn is_single(&self) -> bool {
        self.segments.len() == 1
    }

    /// Returns a copy of this path with its first segment replaced.
    pub fn with_head(&self, head: &str) -> Self {
        let mut segments = self.segments.clone();
        segments[0] = head.to_string();
        Self::from_segments(segments)
    }

    /// Returns this path repeated `times` times (`a->b->a->b` for 2).
    pub fn repeated(&self, times: usize) -> Self {
        let segments = std::iter::repeat(self.segments.iter().cloned())
            .take(times.max(1))
            .flatten()
            .collect();
        Self::from_segments(segments)
    }

    /// Returns the path as filter text. Computed once and cached.
    pub fn to_filter_text(&self) -> &str {
        self.text.get_or_init(|| self.segments.join(PATH_SEPARATOR))
    }
}

impl PartialEq for PathToken {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_filter_text())
    }
}

// ==================== Values ====================

/// A literal value in filter text.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueToken {
    value: Value,
}

impl ValueToken {
    /// Wraps a scalar value.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Returns the wrapped value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the kind of the wrapped value.
    pub fn kind(&self) -> Kind {
        self.value.kind()
    }

    /// Returns the ref if this is a ref literal.
    pub fn as_ref_value(&self) -> Option<&Ref> {
        self.value.as_reference()
    }

    /// Returns the symbol if this is a symbol literal.
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match &self.value {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the value as filter text.
    pub fn to_filter_text(&self) -> String {
        self.value.to_filter_text()
    }
}

// ==================== Relationships ====================

/// A relationship name with an optional qualifying term, e.g. `inputs?`
/// or `inputs-elec?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipToken {
    name: String,
    term: Option<Symbol>,
}

impl RelationshipToken {
    /// Creates a relationship token.
    pub fn new(name: impl Into<String>, term: Option<Symbol>) -> Self {
        Self {
            name: name.into(),
            term,
        }
    }

    /// Returns the relationship name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the qualifying term.
    pub fn term(&self) -> Option<&Symbol> {
        self.term.as_ref()
    }

    /// Returns a copy of this token with a different name.
    pub fn with_name(&self, name: &str) -> Self {
        Self::new(name, self.term.clone())
    }

    /// Returns a copy of this token with a term attached.
    pub fn with_term(&self, term: Symbol) -> Self {
        Self::new(self.name.clone(), Some(term))
    }

    /// Renders the compact token form (`inputs-elec?`).
    pub fn to_filter_text(&self) -> String {
        match &self.term {
            Some(term) => format!("{}-{}?", self.name, term.name()),
            None => format!("{}?", self.name),
        }
    }
}

// ==================== Token ====================

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A single identifier, also usable as a one-segment path.
    Text(String),
    /// A multi-segment path.
    Path(PathToken),
    /// A literal value.
    Value(ValueToken),
    /// A relationship name with an optional term.
    Relationship(RelationshipToken),
    And,
    Or,
    Not,
    LParen,
    RParen,
    Cmp(CmpOp),
    /// The wildcard dereference operator `*==`.
    WildcardEq,
    /// End of input.
    Eof,
}

impl Token {
    /// Returns the token kind.
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Text(_) => TokenKind::Text,
            Token::Path(_) => TokenKind::Path,
            Token::Value(_) => TokenKind::Value,
            Token::Relationship(_) => TokenKind::Relationship,
            Token::And => TokenKind::And,
            Token::Or => TokenKind::Or,
            Token::Not => TokenKind::Not,
            Token::LParen => TokenKind::LParen,
            Token::RParen => TokenKind::RParen,
            Token::Cmp(_) => TokenKind::Cmp,
            Token::WildcardEq => TokenKind::WildcardEq,
            Token::Eof => TokenKind::Eof,
        }
    }

    /// Convenience constructor for a path token from `a->b` text.
    ///
    /// Single segments become [`Token::Text`].
    pub fn path(text: &str) -> FilterResult<Self> {
        let path = PathToken::parse(text)?;
        Ok(if path.is_single() {
            Token::Text(path.head().to_string())
        } else {
            Token::Path(path)
        })
    }

    /// Convenience constructor for a value token.
    pub fn value(value: impl Into<Value>) -> Self {
        Token::Value(ValueToken::new(value))
    }

    /// Returns the token as a path if it is a text or path token.
    pub fn as_path(&self) -> Option<PathToken> {
        match self {
            Token::Text(text) => Some(PathToken::from_segments(vec![text.clone()])),
            Token::Path(path) => Some(path.clone()),
            _ => None,
        }
    }

    /// Renders the token back to filter text.
    pub fn to_filter_text(&self) -> String {
        match self {
            Token::Text(text) => text.clone(),
            Token::Path(path) => path.to_filter_text().to_string(),
            Token::Value(value) => value.to_filter_text(),
            Token::Relationship(rel) => rel.to_filter_text(),
            Token::And => "and".to_string(),
            Token::Or => "or".to_string(),
            Token::Not => "not".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::Cmp(op) => op.symbol().to_string(),
            Token::WildcardEq => "*==".to_string(),
            Token::Eof => String::new(),
        }
    }

    /// Describes the token for debugging.
    pub fn to_debug_json(&self) -> serde_json::Value {
        let kind = self.kind().name();
        match self {
            Token::Text(text) => json!({ "type": kind, "text": text }),
            Token::Path(path) => json!({ "type": kind, "segments": path.segments() }),
            Token::Value(value) => json!({
                "type": kind,
                "kind": value.kind().name(),
                "text": value.to_filter_text(),
            }),
            Token::Relationship(rel) => json!({
                "type": kind,
                "name": rel.name(),
                "term": rel.term().map(Symbol::name),
            }),
            Token::Cmp(op) => json!({ "type": kind, "op": op.symbol() }),
            _ => json!({ "type": kind }),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Eof => f.write_str("end of input"),
            other => f.write_str(&other.to_filter_text()),
        }
    }
}
