//! Result and error types for Comprar.

use thiserror::Error;

/// Result type for Comprar operations
pub type ComprarResult<T> = Result<T, ComprarError>;

/// Errors that can occur while driving the storefront
#[derive(Debug, Error)]
pub enum ComprarError {
    /// No selector candidate resolved to a visible element.
    ///
    /// Not always fatal: an empty removal list legitimately resolves to
    /// nothing. Callers that require the element use
    /// [`crate::locator::FallbackLocator::require`], which produces this.
    #[error("element '{name}' not found: none of {candidates} candidate(s) matched a visible element within {waited_ms}ms")]
    ElementNotFound {
        /// Logical element name
        name: String,
        /// Number of candidates tried
        candidates: usize,
        /// Total time spent across candidates
        waited_ms: u64,
    },

    /// An expected native dialog never arrived within its bound.
    ///
    /// Always a failure; silence where a confirmation was expected means
    /// the action under test did not reach the user.
    #[error("dialog did not appear within {ms}ms for action '{action}'")]
    DialogTimeout {
        /// Logical name of the triggering action
        action: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// A polling loop exhausted its budget before its postcondition held
    #[error("did not converge on '{description}' within {ms}ms")]
    ConvergenceExhausted {
        /// What the poll was waiting for
        description: String,
        /// Budget in milliseconds
        ms: u64,
    },

    /// An index no longer corresponds to the current render state
    #[error("stale reference: index {index} but only {count} '{name}' element(s) remain")]
    StaleReference {
        /// Logical element name
        name: String,
        /// Requested index
        index: usize,
        /// Live match count
        count: usize,
    },

    /// Browser executable not found
    #[error("Browser not found. Install Chromium or set CHROMIUM_PATH")]
    BrowserNotFound,

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Page-level driver error
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Generic bounded wait expired
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Rendered text did not parse as the expected value
    #[error("could not parse {what} from {text:?}")]
    Parse {
        /// What was being extracted (price, count, date, ...)
        what: &'static str,
        /// The offending text
        text: String,
    },

    /// Scenario assertion failed
    #[error("Assertion failed: {message}")]
    Assertion {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ComprarError {
    /// True for the two fatal workflow outcomes that must never be
    /// downgraded to success by a caller.
    #[must_use]
    pub fn is_workflow_fatal(&self) -> bool {
        matches!(
            self,
            Self::DialogTimeout { .. } | Self::ConvergenceExhausted { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_not_found_message() {
        let err = ComprarError::ElementNotFound {
            name: "remove button".to_string(),
            candidates: 3,
            waited_ms: 1500,
        };
        let msg = err.to_string();
        assert!(msg.contains("remove button"));
        assert!(msg.contains('3'));
        assert!(msg.contains("1500"));
    }

    #[test]
    fn test_dialog_timeout_is_fatal() {
        let err = ComprarError::DialogTimeout {
            action: "cancel order".to_string(),
            ms: 5000,
        };
        assert!(err.is_workflow_fatal());
    }

    #[test]
    fn test_convergence_exhausted_is_fatal() {
        let err = ComprarError::ConvergenceExhausted {
            description: "pending order count == 0".to_string(),
            ms: 10_000,
        };
        assert!(err.is_workflow_fatal());
    }

    #[test]
    fn test_not_found_is_not_workflow_fatal() {
        let err = ComprarError::ElementNotFound {
            name: "banner".to_string(),
            candidates: 1,
            waited_ms: 100,
        };
        assert!(!err.is_workflow_fatal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ComprarError = io.into();
        assert!(matches!(err, ComprarError::Io(_)));
    }

    #[test]
    fn test_stale_reference_message() {
        let err = ComprarError::StaleReference {
            name: "order card".to_string(),
            index: 4,
            count: 2,
        };
        assert!(err.to_string().contains("stale reference"));
    }
}
