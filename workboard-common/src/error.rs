//! Error severity classification shared by every Workboard error type.

/// Severity levels for error classification
///
/// - **Warning**: an expected, locally recoverable outcome. The user is told
///   and the session continues (for example a rejected transition).
/// - **Error**: an operation failed but the session stays usable.
/// - **Critical**: the view cannot be rendered or configuration is broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Potential issue but operation can proceed
    Warning,
    /// Operation failed but the session can continue
    Error,
    /// The session cannot continue without intervention
    Critical,
}

impl ErrorSeverity {
    /// Lowercase label used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for error types that have severity levels
///
/// ```rust
/// use workboard_common::{ErrorSeverity, Severity};
///
/// #[derive(Debug)]
/// enum MyError {
///     Broken,
///     Missing,
/// }
///
/// impl Severity for MyError {
///     fn severity(&self) -> ErrorSeverity {
///         match self {
///             MyError::Broken => ErrorSeverity::Critical,
///             MyError::Missing => ErrorSeverity::Error,
///         }
///     }
/// }
///
/// assert_eq!(MyError::Broken.severity(), ErrorSeverity::Critical);
/// ```
pub trait Severity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(ErrorSeverity::Warning.to_string(), "warning");
        assert_eq!(ErrorSeverity::Critical.as_str(), "critical");
    }
}
