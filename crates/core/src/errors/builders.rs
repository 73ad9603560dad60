//! Builder methods for creating errors with context

use super::types::{CleanupFailure, Error};

impl Error {
    /// Create an invalid construction error
    #[must_use]
    pub fn invalid_construction(group: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidConstruction {
            group: group.into(),
            message: message.into(),
        }
    }

    /// Create a cleanup failure error from the failures collected during a free
    #[must_use]
    pub fn cleanup_failed(group: impl Into<String>, failures: Vec<CleanupFailure>) -> Self {
        Error::CleanupFailed {
            group: group.into(),
            failures,
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }
}

impl CleanupFailure {
    /// Record a failed handler invocation
    #[must_use]
    pub fn new(group: impl Into<String>, position: usize, message: impl Into<String>) -> Self {
        CleanupFailure {
            group: group.into(),
            position,
            message: message.into(),
        }
    }
}
