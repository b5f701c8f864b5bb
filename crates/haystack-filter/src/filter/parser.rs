//! Recursive descent parser for filter expressions.

use log::debug;

use super::ast::{
    Cmp, Conjunction, Disjunction, Has, Missing, Node, Parens, RelationshipTest, TypeTest,
    WildcardEquals,
};
use super::error::{FilterError, FilterResult};
use super::lexer::Lexer;
use super::source::TokenSource;
use super::token::{PathToken, RelationshipToken, Token};

/// Parser for Haystack filter expressions.
///
/// The parser pulls tokens from any [`TokenSource`], keeping one token of
/// lookahead plus a second one when it needs to tell `not foo` apart from
/// the (rejected) `not foo == 1`.
///
/// # Grammar
///
/// ```text
/// filter       ::= or_expr
/// or_expr      ::= and_expr ("or" and_expr)*
/// and_expr     ::= term ("and" term)*
/// term         ::= "not" path | atom
/// atom         ::= "(" or_expr ")" | cmp | wildcard | has | isa | relationship
/// cmp          ::= path cmp_op value
/// wildcard     ::= path "*==" ref
/// has          ::= path
/// isa          ::= symbol
/// relationship ::= rel_name ("-" term)? "?" symbol? ref?
/// ```
///
/// # Operator Precedence (highest to lowest)
///
/// 1. `not` - applies to the single following path
/// 2. `and` - binary, left-associative
/// 3. `or` - binary, left-associative
///
/// # Example
///
/// ```
/// use haystack_filter_rs::filter::{FilterParser, Node, NodeKind};
///
/// let node = FilterParser::parse_str("site or equip and point").unwrap();
/// assert_eq!(node.kind(), NodeKind::Or);
/// assert_eq!(node.children().len(), 2);
/// ```
pub struct FilterParser<S> {
    source: S,
    current: Token,
    lookahead: Option<Token>,
}

impl<'a> FilterParser<Lexer<'a>> {
    /// Tokenizes and parses filter text.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::EmptyExpression` if the input is blank, a lexical
    /// error for malformed literals, or a syntax error for malformed
    /// expressions.
    pub fn parse_str(input: &'a str) -> FilterResult<Node> {
        debug!("parsing filter: {input}");
        FilterParser::new(Lexer::new(input)).parse()
    }
}

impl<S: TokenSource> FilterParser<S> {
    /// Creates a parser over a token source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            current: Token::Eof,
            lookahead: None,
        }
    }

    /// Parses the whole token stream into a tree rooted at a [`Node::Or`].
    ///
    /// # Errors
    ///
    /// Returns `FilterError::EmptyExpression` if the source yields no tokens,
    /// and `FilterError::UnexpectedToken` if tokens remain after a complete
    /// expression.
    pub fn parse(mut self) -> FilterResult<Node> {
        self.current = self.pull()?;
        if self.current == Token::Eof {
            return Err(FilterError::EmptyExpression);
        }

        let root = self.parse_or_expr()?;

        // Check that we consumed all tokens
        if self.current != Token::Eof {
            return Err(FilterError::unexpected_token(self.current.to_filter_text()));
        }

        Ok(Node::Or(root))
    }

    /// Takes the next token from the lookahead slot or the source.
    fn pull(&mut self) -> FilterResult<Token> {
        match self.lookahead.take() {
            Some(token) => Ok(token),
            None => self.source.next_token(),
        }
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> FilterResult<Token> {
        let next = self.pull()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// Returns the token after the current one without consuming anything.
    fn peek_next(&mut self) -> FilterResult<&Token> {
        let token = match self.lookahead.take() {
            Some(token) => token,
            None => self.source.next_token()?,
        };
        Ok(self.lookahead.insert(token))
    }

    /// Parses OR expressions: `and_expr ("or" and_expr)*`
    fn parse_or_expr(&mut self) -> FilterResult<Disjunction> {
        let mut children = vec![self.parse_and_expr()?];

        while self.current == Token::Or {
            self.advance()?; // consume 'or'
            children.push(self.parse_and_expr()?);
        }

        Ok(Disjunction::new(children))
    }

    /// Parses AND expressions: `term ("and" term)*`
    fn parse_and_expr(&mut self) -> FilterResult<Conjunction> {
        let mut children = vec![self.parse_term()?];

        while self.current == Token::And {
            self.advance()?; // consume 'and'
            children.push(self.parse_term()?);
        }

        Ok(Conjunction::new(children))
    }

    /// Parses `"not" path | atom`.
    fn parse_term(&mut self) -> FilterResult<Node> {
        if self.current != Token::Not {
            return self.parse_atom();
        }
        self.advance()?; // consume 'not'

        let path = match self.current.as_path() {
            Some(path) => path,
            None if self.current == Token::Eof => return Err(FilterError::UnexpectedEndOfInput),
            None => return Err(FilterError::invalid_negation(self.current.to_filter_text())),
        };

        let next = self.peek_next()?;
        if matches!(next, Token::Cmp(_) | Token::WildcardEq) {
            return Err(FilterError::invalid_negation(format!("{path} {next}")));
        }

        self.advance()?; // consume path
        Ok(Node::Missing(Missing::new(path)))
    }

    /// Parses a parenthesized group or a single predicate.
    fn parse_atom(&mut self) -> FilterResult<Node> {
        match self.advance()? {
            Token::LParen => {
                let inner = self.parse_or_expr()?;
                match self.current {
                    Token::RParen => {
                        self.advance()?; // consume ')'
                        Ok(Node::Parens(Parens::new(inner)))
                    }
                    Token::Eof => Err(FilterError::UnclosedParenthesis),
                    ref other => Err(FilterError::unexpected_token(other.to_filter_text())),
                }
            }

            token @ (Token::Text(_) | Token::Path(_)) => match token.as_path() {
                Some(path) => self.parse_path_predicate(path),
                None => Err(FilterError::unexpected_token(token.to_filter_text())),
            },

            Token::Value(value) => match value.as_symbol() {
                Some(symbol) => Ok(Node::TypeTest(TypeTest::new(symbol.clone()))),
                None => Err(FilterError::unexpected_token(value.to_filter_text())),
            },

            Token::Relationship(relationship) => self.parse_relationship(relationship),

            Token::WildcardEq => Err(FilterError::EmptyWildcardPath),
            Token::Eof => Err(FilterError::UnexpectedEndOfInput),

            other => Err(FilterError::unexpected_token(other.to_filter_text())),
        }
    }

    /// Parses what may follow a path: a comparison, `*==`, or nothing.
    fn parse_path_predicate(&mut self, path: PathToken) -> FilterResult<Node> {
        match self.current {
            Token::Cmp(op) => {
                self.advance()?; // consume operator
                match self.advance()? {
                    Token::Value(value) => Ok(Node::Cmp(Cmp::new(path, op, value))),
                    Token::Eof => Err(FilterError::UnexpectedEndOfInput),
                    other => Err(FilterError::invalid_comparison_operand(
                        other.to_filter_text(),
                    )),
                }
            }
            Token::WildcardEq => {
                self.advance()?; // consume '*=='
                match self.advance()? {
                    Token::Value(value) => match value.as_ref_value() {
                        Some(reference) => Ok(Node::WildcardEq(WildcardEquals::new(
                            path,
                            reference.clone(),
                        ))),
                        None => Err(FilterError::invalid_wildcard_operand(value.to_filter_text())),
                    },
                    Token::Eof => Err(FilterError::UnexpectedEndOfInput),
                    other => Err(FilterError::invalid_wildcard_operand(other.to_filter_text())),
                }
            }
            _ => Ok(Node::Has(Has::new(path))),
        }
    }

    /// Parses the optional `^term` and `@ref` after a relationship name.
    fn parse_relationship(&mut self, relationship: RelationshipToken) -> FilterResult<Node> {
        let mut relationship = relationship;

        let term = match &self.current {
            Token::Value(value) => value.as_symbol().cloned(),
            _ => None,
        };
        if let Some(term) = term {
            if relationship.term().is_some() {
                return Err(FilterError::DuplicateRelationshipTerm {
                    relationship: relationship.name().to_string(),
                });
            }
            relationship = relationship.with_term(term);
            self.advance()?; // consume term
        }

        let reference = match &self.current {
            Token::Value(value) => value.as_ref_value().cloned(),
            _ => None,
        };
        if reference.is_some() {
            self.advance()?; // consume ref
        }

        Ok(Node::Relationship(RelationshipTest::new(
            relationship,
            reference,
        )))
    }
}
