//! Error types for sqlcraft

use thiserror::Error;

/// Result type alias for sqlcraft operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Error types for statement construction and rendering
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SqlError {
    /// A fluent call received a null-equivalent, empty or out-of-range value.
    ///
    /// Raised at the call site, before any tree mutation occurs.
    #[error("Invalid argument `{argument}`: {message}")]
    InvalidArgument {
        argument: &'static str,
        message: String,
    },

    /// A builder was driven through an illegal call sequence.
    ///
    /// Most illegal sequences are unreachable by construction (each builder
    /// phase only exposes the next legal operations); this covers the rest.
    #[error("Invalid builder state: {0}")]
    InvalidState(String),

    /// A render delegate failed while producing text.
    #[error("Render error: {0}")]
    Render(String),
}

impl SqlError {
    /// Create an invalid-argument error naming the offending parameter.
    pub fn invalid_argument(argument: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            message: message.into(),
        }
    }

    /// Create an invalid-state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Create a render error.
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Check if this is an invalid-argument error.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}
