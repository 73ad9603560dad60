//! Core error type definitions

use std::fmt;

/// Result type alias for janitor operations
pub type Result<T> = std::result::Result<T, Error>;

/// A single cleanup handler invocation that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupFailure {
    /// Dotted path of the group that owned the item
    pub group: String,
    /// Zero-based position of the item in its group's release order
    pub position: usize,
    /// Error or panic message reported by the handler
    pub message: String,
}

impl fmt::Display for CleanupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.group, self.position, self.message)
    }
}

/// Core error type for janitor operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A group could not be built from the supplied parts
    #[error("cannot construct group '{group}': {message}")]
    InvalidConstruction { group: String, message: String },

    /// One or more cleanup handlers failed while a group was being freed
    #[error("{}", format_cleanup_failures(.group, .failures))]
    CleanupFailed {
        group: String,
        failures: Vec<CleanupFailure>,
    },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

fn format_cleanup_failures(group: &str, failures: &[CleanupFailure]) -> String {
    match failures {
        [only] => format!("freeing group '{group}' left 1 failed cleanup: {only}"),
        _ => {
            let listed = failures
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            format!(
                "freeing group '{group}' left {} failed cleanups: {listed}",
                failures.len()
            )
        }
    }
}

impl Error {
    /// Failures carried by a [`Error::CleanupFailed`], empty for every other variant
    pub fn failures(&self) -> &[CleanupFailure] {
        match self {
            Error::CleanupFailed { failures, .. } => failures,
            _ => &[],
        }
    }
}
