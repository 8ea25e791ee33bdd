//! Error types for the todo repository and the API client.
//!
//! # Design
//! `TodoError` is the repository's failure taxonomy. "Not found" for lookups,
//! updates and deletes is a success value (`None` / `false`), so
//! `TodoError::NotFound` only shows up where an operation cannot produce a
//! result without the record, such as toggling completion.
//!
//! `ApiError` is what `TodoClient` reports when parsing a server response.

/// One or more field rules violated by a candidate record.
///
/// Displays as `Validation error: <message>, <message>, ...`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Validation error: {}", .messages.join(", "))]
pub struct ValidationError {
    messages: Vec<String>,
}

impl ValidationError {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// Per-field messages in the order the fields were checked.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

/// Errors returned by `TodoRepository` and `TodoStore` operations.
#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The identifier is not structurally valid for the store.
    #[error("Invalid todo ID")]
    InvalidId,

    #[error("Todo not found")]
    NotFound,

    /// The backing store was unreachable or returned an unexpected fault.
    #[error("store failure: {0}")]
    Store(String),
}

impl TodoError {
    pub fn store(err: impl std::fmt::Display) -> Self {
        TodoError::Store(err.to_string())
    }
}

/// Errors returned by `TodoClient` parse methods.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server returned 404: the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned an unexpected status. `message` is the envelope's
    /// `error` field when present, otherwise the raw body.
    #[error("HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_joins_messages() {
        let err = ValidationError::new(vec![
            "Title is required".to_string(),
            "Completed must be a boolean".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation error: Title is required, Completed must be a boolean"
        );
    }

    #[test]
    fn todo_error_is_transparent_over_validation() {
        let err = TodoError::from(ValidationError::new(vec!["Title too long".to_string()]));
        assert_eq!(err.to_string(), "Validation error: Title too long");
    }
}
