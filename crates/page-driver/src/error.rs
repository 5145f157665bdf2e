//! Error types for the page boundary.

use thiserror::Error;

/// Errors surfaced by [`crate::PageDriver`] implementations.
#[derive(Debug, Error, Clone)]
pub enum DriverError {
    /// Browser process or protocol I/O failed
    #[error("browser I/O error: {0}")]
    Io(String),

    /// Navigation did not complete within the deadline
    #[error("navigation timeout: {0}")]
    NavTimeout(String),

    /// A bounded wait elapsed without the condition holding
    #[error("wait timed out: {0}")]
    Timeout(String),

    /// Script evaluation failed in the page
    #[error("script evaluation failed: {0}")]
    Eval(String),

    /// An element the caller explicitly required is not in the DOM
    #[error("element not found: {0}")]
    NotFound(String),

    /// Internal driver error
    #[error("internal driver error: {0}")]
    Internal(String),
}

impl DriverError {
    /// True for conditions that mean "the page got there too late", not
    /// "the browser is broken".
    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::NavTimeout(_) | DriverError::Timeout(_))
    }
}
