//! Pull-based token supply for the parser.

use std::collections::VecDeque;

use super::error::FilterResult;
use super::token::Token;

/// Supplies tokens to the parser one at a time.
///
/// Once exhausted a source keeps returning [`Token::Eof`].
pub trait TokenSource {
    /// Returns the next token.
    fn next_token(&mut self) -> FilterResult<Token>;
}

/// A canned token sequence, used to drive the parser without a lexer.
#[derive(Debug, Clone, Default)]
pub struct TokenList {
    tokens: VecDeque<Token>,
}

impl TokenList {
    /// Creates a source from a list of tokens. A trailing `Eof` is optional.
    pub fn new(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }
}

impl TokenSource for TokenList {
    fn next_token(&mut self) -> FilterResult<Token> {
        Ok(self.tokens.pop_front().unwrap_or(Token::Eof))
    }
}

impl<S: TokenSource + ?Sized> TokenSource for &mut S {
    fn next_token(&mut self) -> FilterResult<Token> {
        (**self).next_token()
    }
}

impl<S: TokenSource + ?Sized> TokenSource for Box<S> {
    fn next_token(&mut self) -> FilterResult<Token> {
        (**self).next_token()
    }
}
