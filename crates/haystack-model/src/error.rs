//! Error types for the value model.

use thiserror::Error;

/// A specialized Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building values or namespaces.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A ref id or symbol contained characters outside the allowed set.
    #[error("invalid {what} name: '{name}'")]
    InvalidName {
        /// What kind of name was being validated ("ref", "symbol").
        what: &'static str,
        /// The rejected name.
        name: String,
    },

    /// A def record was missing its `def` symbol tag.
    #[error("def record is missing its 'def' symbol")]
    MissingDefSymbol,
}

impl ModelError {
    /// Creates an invalid name error.
    pub fn invalid_name(what: &'static str, name: impl Into<String>) -> Self {
        ModelError::InvalidName {
            what,
            name: name.into(),
        }
    }
}
