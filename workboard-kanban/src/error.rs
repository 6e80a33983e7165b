//! Error types for the kanban engine

use std::path::PathBuf;
use thiserror::Error;
use workboard_common::{ErrorSeverity, Severity};

/// Result type for kanban operations
pub type Result<T> = std::result::Result<T, KanbanError>;

/// Errors that can occur in kanban operations
#[derive(Debug, Error)]
pub enum KanbanError {
    /// Status not present in the workflow or catalogue
    #[error("status not found: {id}")]
    StatusNotFound { id: String },

    /// Workflow referenced by an entity type is not registered
    #[error("workflow not found: {id}")]
    WorkflowNotFound { id: String },

    /// Board or workflow configuration is unusable
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Transition edge rejected when editing a workflow
    #[error("invalid transition {from} -> {to}: {message}")]
    InvalidTransitionEdge {
        from: String,
        to: String,
        message: String,
    },

    /// Transition edge already exists
    #[error("duplicate transition {from} -> {to}")]
    DuplicateTransition { from: String, to: String },

    /// Filter key is not registered on the toolbar
    #[error("unknown filter: {key}")]
    UnknownFilter { key: String },

    /// Filter value storage failed
    #[error("storage error at {path}: {message}")]
    Storage { path: PathBuf, message: String },

    /// Loading board configuration failed
    #[error(transparent)]
    Config(#[from] workboard_config::ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KanbanError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a status-not-found error
    pub fn status_not_found(id: impl Into<String>) -> Self {
        Self::StatusNotFound { id: id.into() }
    }

    /// Create an invalid edge error
    pub fn invalid_edge(
        from: impl Into<String>,
        to: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidTransitionEdge {
            from: from.into(),
            to: to.into(),
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Storage {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Storage { .. })
    }
}

impl Severity for KanbanError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Configuration { .. } | Self::WorkflowNotFound { .. } | Self::Config(_) => {
                ErrorSeverity::Critical
            }
            Self::StatusNotFound { .. }
            | Self::InvalidTransitionEdge { .. }
            | Self::DuplicateTransition { .. }
            | Self::UnknownFilter { .. } => ErrorSeverity::Warning,
            Self::Storage { .. } | Self::Io(_) | Self::Json(_) => ErrorSeverity::Error,
        }
    }
}

/// Failures reported by an entity store when saving or loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// The store refused the entity as invalid
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Someone else changed the entity since it was loaded
    #[error("concurrent modification of {id}")]
    Concurrency { id: String },

    /// The entity was deleted
    #[error("entity not found: {id}")]
    NotFound { id: String },

    /// Any other store failure
    #[error("persistence failure: {message}")]
    Other { message: String },
}

impl PersistenceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Concurrency failures are resolved by reloading and retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Concurrency { .. })
    }
}

impl Severity for PersistenceError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Validation { .. } | Self::NotFound { .. } => ErrorSeverity::Warning,
            Self::Concurrency { .. } | Self::Other { .. } => ErrorSeverity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KanbanError::status_not_found("review");
        assert_eq!(err.to_string(), "status not found: review");

        let err = KanbanError::invalid_edge("a", "a", "self transition");
        assert_eq!(err.to_string(), "invalid transition a -> a: self transition");
    }

    #[test]
    fn test_severity() {
        assert_eq!(
            KanbanError::configuration("no statuses").severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(
            KanbanError::UnknownFilter { key: "x".into() }.severity(),
            ErrorSeverity::Warning
        );
        assert_eq!(
            PersistenceError::Concurrency { id: "1".into() }.severity(),
            ErrorSeverity::Error
        );
    }

    #[test]
    fn test_retryable() {
        assert!(PersistenceError::Concurrency { id: "1".into() }.is_retryable());
        assert!(!PersistenceError::validation("bad").is_retryable());
        assert!(!KanbanError::configuration("x").is_retryable());
    }
}
