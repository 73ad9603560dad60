/// Constants used throughout the janitor codebase
// Group naming
pub const DEFAULT_GROUP_NAME: &str = "janitor";
pub const CHILD_NAME_SEPARATOR: &str = ".";

// Environment variable names
pub const JANITOR_LOG_VAR: &str = "JANITOR_LOG";

// Filter used when neither JANITOR_LOG nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "warn";
