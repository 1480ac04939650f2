use thiserror::Error;

/// Process exit status for a successful run (including previews and no-ops)
pub const EXIT_SUCCESS: u8 = 0;
/// Process exit status when the index, authentication or a deletion failed
pub const EXIT_FAILURE: u8 = 1;
/// Process exit status for invalid arguments, configuration or input data
pub const EXIT_VALIDATION: u8 = 2;
/// Process exit status when a safety check aborted the run
pub const EXIT_SAFETY: u8 = 3;
/// Process exit status when the user interrupted the run
pub const EXIT_INTERRUPTED: u8 = 130;

/// Unified error type for cleanup operations
#[derive(Error, Debug)]
pub enum CleanupError {
    #[error("Invalid version identifier '{version}': {reason}")]
    Format { version: String, reason: String },

    #[error("Safety check failed: {0}")]
    Safety(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Failed to delete version '{version}': {reason}")]
    Delete { version: String, reason: String },

    #[error("Failed to delete {failed}/{total} versions")]
    PartialDeletion {
        failed: usize,
        total: usize,
        /// Versions that were removed before the run gave up
        deleted: Vec<String>,
        /// `(version, reason)` for every failed attempt
        failures: Vec<(String, String)>,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in pypi-cleanup
pub type Result<T> = std::result::Result<T, CleanupError>;

impl CleanupError {
    /// Create a format error for an unparseable version identifier
    pub fn format(version: impl Into<String>, reason: impl Into<String>) -> Self {
        CleanupError::Format {
            version: version.into(),
            reason: reason.into(),
        }
    }

    /// Create a safety error with context
    pub fn safety(msg: impl Into<String>) -> Self {
        CleanupError::Safety(msg.into())
    }

    /// Create an authentication error with context
    pub fn authentication(msg: impl Into<String>) -> Self {
        CleanupError::Authentication(msg.into())
    }

    /// Create an index-unavailable error with context
    pub fn index_unavailable(msg: impl Into<String>) -> Self {
        CleanupError::IndexUnavailable(msg.into())
    }

    /// Create a per-version delete failure
    pub fn delete(version: impl Into<String>, reason: impl Into<String>) -> Self {
        CleanupError::Delete {
            version: version.into(),
            reason: reason.into(),
        }
    }

    /// Create a validation error with context
    pub fn validation(msg: impl Into<String>) -> Self {
        CleanupError::Validation(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        CleanupError::Config(msg.into())
    }

    /// Map the error onto the process exit status reported by the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            CleanupError::Format { .. }
            | CleanupError::Validation(_)
            | CleanupError::Config(_) => EXIT_VALIDATION,
            CleanupError::Safety(_) => EXIT_SAFETY,
            CleanupError::Authentication(_)
            | CleanupError::IndexUnavailable(_)
            | CleanupError::Delete { .. }
            | CleanupError::PartialDeletion { .. }
            | CleanupError::Http(_)
            | CleanupError::Io(_) => EXIT_FAILURE,
        }
    }
}
