//! Error types and result alias for janitor operations

mod builders;
mod conversions;
mod types;

pub use types::{CleanupFailure, Error, Result};
