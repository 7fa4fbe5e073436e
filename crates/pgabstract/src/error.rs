//! Error types for pgabstract

use std::fmt::Display;
use thiserror::Error;

/// Result type alias for clause compilation
pub type SqlResult<T> = Result<T, SqlError>;

/// Reasons a clause cannot be compiled.
///
/// Every error is raised before any SQL is returned; there is no partial
/// result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    /// The value's shape matches no rule of the clause it was given to
    #[error("Unsupported {shape} for {context}")]
    UnsupportedShape { context: String, shape: String },

    /// A `[name, alias]` field has fewer than two parts
    #[error("Malformed field alias: {0}")]
    MalformedAlias(String),

    /// A join descriptor lacks a target or a key pair
    #[error("Malformed join: {0}")]
    MalformedJoin(String),

    /// An `on_conflict` value is not `[target, {set}]`
    #[error("Malformed on_conflict: {0}")]
    MalformedConflictSpec(String),

    /// A `for` scalar other than `update`
    #[error("for value \"{0}\" is not allowed")]
    DisallowedForValue(String),

    /// Empty or otherwise unusable identifier
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

impl SqlError {
    /// Create an unsupported-shape error for a clause context.
    pub fn unsupported(context: impl Into<String>, shape: impl Display) -> Self {
        Self::UnsupportedShape {
            context: context.into(),
            shape: shape.to_string(),
        }
    }

    /// Create a malformed join error
    pub fn malformed_join(message: impl Into<String>) -> Self {
        Self::MalformedJoin(message.into())
    }

    /// Create a malformed on_conflict error
    pub fn malformed_conflict(message: impl Into<String>) -> Self {
        Self::MalformedConflictSpec(message.into())
    }

    /// Create an invalid identifier error
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidIdentifier(message.into())
    }

    /// The clause context named by an unsupported-shape error.
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::UnsupportedShape { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Check if this is an unsupported-shape error
    pub fn is_unsupported_shape(&self) -> bool {
        matches!(self, Self::UnsupportedShape { .. })
    }

    /// Check if this is a disallowed `for` value error
    pub fn is_disallowed_for_value(&self) -> bool {
        matches!(self, Self::DisallowedForValue(_))
    }
}
