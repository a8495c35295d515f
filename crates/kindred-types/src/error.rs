use std::time::Duration;

use thiserror::Error;

use crate::profile::ProfileKind;

/// Errors from profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile name cannot be empty")]
    EmptyName,

    #[error("cannot delete protected default profile '{0}'")]
    Protected(String),

    #[error("invalid profile kind: '{0}'")]
    InvalidKind(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Errors from session save/load operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session name cannot be empty")]
    EmptyName,

    #[error("no stored {kind} profile named '{name}'")]
    UnknownProfile { kind: ProfileKind, name: String },

    #[error("session not found")]
    NotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Errors from the conversation engine.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("no generation backend loaded")]
    NoModelLoaded,

    #[error(transparent)]
    Generation(#[from] GenerateError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Errors from text-generation backends.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("generation cancelled")]
    Cancelled,

    #[error("failed to load model: {0}")]
    ModelLoad(String),
}

/// Errors from image generation.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("steps must be between 1-100, got {0}")]
    StepsOutOfRange(u16),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("failed to write image: {0}")]
    Storage(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Errors from repository operations (used by trait definitions in kindred-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_error_display() {
        let err = ProfileError::Protected("Guest".to_string());
        assert_eq!(
            err.to_string(),
            "cannot delete protected default profile 'Guest'"
        );
    }

    #[test]
    fn test_unknown_profile_display() {
        let err = SessionError::UnknownProfile {
            kind: ProfileKind::Chatbot,
            name: "Aria".to_string(),
        };
        assert_eq!(err.to_string(), "no stored chatbot profile named 'Aria'");
    }

    #[test]
    fn test_generate_timeout_display() {
        let err = GenerateError::Timeout(Duration::from_secs(30));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_repository_error_wraps_into_profile_error() {
        let err: ProfileError = RepositoryError::Connection.into();
        assert_eq!(err.to_string(), "database connection error");
    }
}
