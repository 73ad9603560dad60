//! Fallible group construction

use super::{CleanupHandler, Group};
use janitor_core::{Error, GroupConfig, Result};

/// Builder for groups that need a name, a configuration, or a fallible handler.
///
/// Unlike [`Group::new`], nothing forces a handler to be supplied, so
/// [`GroupBuilder::build`] checks for one and fails fast with
/// [`Error::InvalidConstruction`].
pub struct GroupBuilder<T: 'static> {
    name: Option<String>,
    config: Option<GroupConfig>,
    handler: Option<CleanupHandler<T>>,
    items: Vec<T>,
}

impl<T: 'static> Default for GroupBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> GroupBuilder<T> {
    pub fn new() -> Self {
        Self {
            name: None,
            config: None,
            handler: None,
            items: Vec::new(),
        }
    }

    /// Name the group, overriding the configuration's name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn config(mut self, config: GroupConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn handler(mut self, handler: impl Fn(T) + 'static) -> Self {
        self.handler = Some(CleanupHandler::infallible(handler));
        self
    }

    pub fn fallible_handler(mut self, handler: impl Fn(T) -> anyhow::Result<()> + 'static) -> Self {
        self.handler = Some(CleanupHandler::fallible(handler));
        self
    }

    /// Initial items, appended in order; may be called repeatedly
    pub fn items(mut self, items: impl IntoIterator<Item = T>) -> Self {
        self.items.extend(items);
        self
    }

    /// Build a standalone group
    pub fn build(self) -> Result<Group<T>> {
        let config = self.config.unwrap_or_default();
        let config = resolve(config, self.name)?;
        let handler = require_handler(&config, self.handler)?;
        Ok(Group::from_parts(config, handler, self.items))
    }

    /// Build the group as a child of `parent`.
    ///
    /// Without an explicit configuration the child inherits the parent's,
    /// named after its position among the parent's children.
    pub fn attach_to<P: 'static>(self, parent: &Group<P>) -> Result<Group<T>> {
        let config = self
            .config
            .unwrap_or_else(|| parent.next_child_config());
        let config = resolve(config, self.name)?;
        let handler = require_handler(&config, self.handler)?;
        Ok(parent.attach(config, handler, self.items))
    }
}

fn resolve(mut config: GroupConfig, name: Option<String>) -> Result<GroupConfig> {
    if let Some(name) = name {
        config.name = name;
    }
    config
        .validate()
        .map_err(|err| Error::invalid_construction(&config.name, err.to_string()))?;
    Ok(config)
}

fn require_handler<T>(
    config: &GroupConfig,
    handler: Option<CleanupHandler<T>>,
) -> Result<CleanupHandler<T>> {
    handler.ok_or_else(|| Error::invalid_construction(&config.name, "no cleanup handler supplied"))
}
