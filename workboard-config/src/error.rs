//! Error types for the configuration system

use std::path::PathBuf;
use thiserror::Error;
use workboard_common::{ErrorSeverity, Severity};

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Configuration parsing failed
    #[error("Failed to parse configuration: {source}")]
    ParseError { source: Box<figment::Error> },

    /// Configuration validation failed
    #[error("Configuration validation failed: {message}")]
    ValidationError { message: String },

    /// Configuration file format not supported
    #[error("Unsupported configuration file format: {format}")]
    UnsupportedFormat { format: String },
}

impl ConfigError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::ParseError {
            source: Box::new(error),
        }
    }
}

impl Severity for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        // A board cannot be laid out without a valid configuration
        ErrorSeverity::Critical
    }
}
