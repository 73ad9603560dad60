//! Core errors, configuration, and constants for `janitor`.
//!
//! This crate holds the pieces shared by every janitor crate without knowing
//! anything about groups themselves.
//!
//! ## Key Components
//!
//! - **`errors`**: The `Error` enum and `Result` alias, plus `CleanupFailure`,
//!   the record of a single cleanup handler that did not complete.
//! - **`config`**: `GroupConfig` and `FailurePolicy`, the settings a group is
//!   created with and passes down to its children.
//! - **`constants`**: Default names and environment variable names.

pub mod config;
pub mod constants;
pub mod errors;

pub use self::{
    config::{FailurePolicy, GroupConfig},
    constants::*,
    errors::{CleanupFailure, Error, Result},
};
