//! Error types for the filter lexer and parser.

use thiserror::Error;

/// A specialized Result type for filter parsing operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while tokenizing or parsing a filter.
///
/// Evaluation never fails: a missing tag or a kind mismatch is simply a
/// non-match, so only syntax problems are represented here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// The filter expression is empty.
    #[error("filter expression is empty")]
    EmptyExpression,

    /// An unexpected token was encountered during parsing.
    #[error("unexpected token: {token}")]
    UnexpectedToken {
        /// The unexpected token, rendered as filter text.
        token: String,
    },

    /// An unexpected end of input was encountered.
    #[error("unexpected end of expression")]
    UnexpectedEndOfInput,

    /// An unclosed parenthesis was found.
    #[error("unclosed parenthesis")]
    UnclosedParenthesis,

    /// The right-hand side of a comparison was not a literal value.
    #[error("expected a value after comparison operator, found {token}")]
    InvalidComparisonOperand {
        /// The offending token.
        token: String,
    },

    /// `*==` appeared without a path on its left.
    #[error("wildcard equals requires a path")]
    EmptyWildcardPath,

    /// The right-hand side of `*==` was not a ref.
    #[error("wildcard equals requires a ref, found {token}")]
    InvalidWildcardOperand {
        /// The offending token.
        token: String,
    },

    /// `not` was applied to something other than a plain path.
    #[error("only a path can be negated, found {token}")]
    InvalidNegation {
        /// The token following `not`.
        token: String,
    },

    /// A relationship carried a term both in its name and after the `?`.
    #[error("relationship '{relationship}' has more than one term")]
    DuplicateRelationshipTerm {
        /// The relationship name.
        relationship: String,
    },

    /// A character that cannot start any token.
    #[error("unexpected character '{character}' at position {position}")]
    UnexpectedCharacter {
        /// The character that could not be tokenized.
        character: char,
        /// Byte offset in the input.
        position: usize,
    },

    /// A string or uri literal was not closed.
    #[error("unterminated literal starting at position {position}")]
    UnterminatedLiteral {
        /// Byte offset of the opening quote.
        position: usize,
    },

    /// A literal was recognised but its contents are not valid.
    #[error("invalid literal '{text}' at position {position}")]
    InvalidLiteral {
        /// The literal text.
        text: String,
        /// Byte offset in the input.
        position: usize,
    },
}

impl FilterError {
    /// Creates an unexpected token error.
    pub fn unexpected_token(token: impl Into<String>) -> Self {
        FilterError::UnexpectedToken {
            token: token.into(),
        }
    }

    /// Creates an invalid comparison operand error.
    pub fn invalid_comparison_operand(token: impl Into<String>) -> Self {
        FilterError::InvalidComparisonOperand {
            token: token.into(),
        }
    }

    /// Creates an invalid wildcard operand error.
    pub fn invalid_wildcard_operand(token: impl Into<String>) -> Self {
        FilterError::InvalidWildcardOperand {
            token: token.into(),
        }
    }

    /// Creates an invalid negation error.
    pub fn invalid_negation(token: impl Into<String>) -> Self {
        FilterError::InvalidNegation {
            token: token.into(),
        }
    }

    /// Creates an invalid literal error.
    pub fn invalid_literal(text: impl Into<String>, position: usize) -> Self {
        FilterError::InvalidLiteral {
            text: text.into(),
            position,
        }
    }

    /// Returns the byte offset for lexical errors.
    pub fn position(&self) -> Option<usize> {
        match self {
            FilterError::UnexpectedCharacter { position, .. }
            | FilterError::UnterminatedLiteral { position }
            | FilterError::InvalidLiteral { position, .. } => Some(*position),
            _ => None,
        }
    }
}
