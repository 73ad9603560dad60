//! Group configuration
//!
//! `GroupConfig` carries the settings that shape how a group reports and
//! releases its items. It is plain data: cloned into every group at creation
//! and inherited by children created through `extend`.

use crate::constants::{CHILD_NAME_SEPARATOR, DEFAULT_GROUP_NAME};
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// What `free` does with handler failures once every item has been released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Return every failure of the freed subtree as `Error::CleanupFailed`
    #[default]
    Collect,
    /// Log failures and report success
    Log,
}

/// Settings for a single group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupConfig {
    /// Label used in logs and failure paths
    pub name: String,

    /// How handler failures surface from `free`
    pub failure_policy: FailurePolicy,

    /// Free the group when its last handle is dropped
    pub release_on_drop: bool,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_GROUP_NAME.to_string(),
            failure_policy: FailurePolicy::default(),
            release_on_drop: false,
        }
    }
}

impl GroupConfig {
    /// Default settings under a different name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON; absent fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::configuration("group name must not be empty"));
        }
        Ok(())
    }

    /// Configuration inherited by the child created at `index`
    pub fn child(&self, index: usize) -> Self {
        self.child_named(format!("{}{CHILD_NAME_SEPARATOR}{index}", self.name))
    }

    /// Configuration inherited by a child that carries its own name
    pub fn child_named(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}
