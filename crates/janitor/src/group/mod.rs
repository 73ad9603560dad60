//! Resource groups
//!
//! A [`Group`] owns an ordered list of items, the handler that releases them,
//! and any child groups spawned from it with [`Group::extend`]. Freeing a
//! group releases its own items in insertion order and then frees each child
//! in creation order, depth first.
//!
//! Groups are single-threaded: the handle is an `Rc` and every operation runs
//! to completion before returning. No borrow of the group is held while a
//! cleanup handler runs, so handlers may call back into the group they are
//! being released from.

mod builder;
mod disconnect;
mod entries;
mod handler;

pub use builder::GroupBuilder;
pub use disconnect::DisconnectFn;
pub use handler::CleanupHandler;

use disconnect::Detach;
use entries::{Entries, Ticket};
use janitor_core::{CleanupFailure, Error, FailurePolicy, GroupConfig, Result};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, debug_span, error, warn};

/// The capability a parent holds on each child, independent of the child's item type
trait Release {
    fn name(&self) -> &str;
    fn release(&self) -> Vec<CleanupFailure>;
}

/// Handle to a group of items released together.
///
/// Cloning the handle is cheap and every clone observes the same group.
pub struct Group<T: 'static> {
    shared: Rc<Shared<T>>,
}

struct Shared<T: 'static> {
    config: GroupConfig,
    handler: CleanupHandler<T>,
    state: RefCell<State<T>>,
}

struct State<T> {
    entries: Entries<T>,
    children: Vec<Rc<dyn Release>>,
    spawned: usize,
    freed: bool,
}

impl<T: 'static> Group<T> {
    /// Create an empty group released by `handler`
    pub fn new(handler: impl Fn(T) + 'static) -> Self {
        Self::with_items(handler, Vec::new())
    }

    /// Create a group pre-populated with `items`; the handler is not invoked
    pub fn with_items(handler: impl Fn(T) + 'static, items: impl IntoIterator<Item = T>) -> Self {
        Self::from_parts(
            GroupConfig::default(),
            CleanupHandler::infallible(handler),
            items,
        )
    }

    /// Create an empty group whose handler can report failures
    pub fn fallible(handler: impl Fn(T) -> anyhow::Result<()> + 'static) -> Self {
        Self::from_parts(
            GroupConfig::default(),
            CleanupHandler::fallible(handler),
            Vec::new(),
        )
    }

    pub fn builder() -> GroupBuilder<T> {
        GroupBuilder::new()
    }

    pub(crate) fn from_parts(
        config: GroupConfig,
        handler: CleanupHandler<T>,
        items: impl IntoIterator<Item = T>,
    ) -> Self {
        let mut entries = Entries::new();
        // Initial items are never handed a disconnect handle
        let ticket = entries.issue();
        for item in items {
            entries.push(ticket, item);
        }
        debug!(group = %config.name, items = entries.len(), "created group");

        Self {
            shared: Rc::new(Shared {
                config,
                handler,
                state: RefCell::new(State {
                    entries,
                    children: Vec::new(),
                    spawned: 0,
                    freed: false,
                }),
            }),
        }
    }

    /// Append one item; the returned handle withdraws exactly this record
    pub fn add(&self, item: T) -> DisconnectFn {
        self.insert(vec![item])
    }

    /// Append every item of `items` in order; the returned handle withdraws all of them
    pub fn add_many(&self, items: impl IntoIterator<Item = T>) -> DisconnectFn {
        self.insert(items.into_iter().collect())
    }

    fn insert(&self, items: Vec<T>) -> DisconnectFn {
        let mut state = self.shared.state.borrow_mut();
        if state.freed {
            drop(state);
            self.shared.release_late(items);
            return DisconnectFn::inert();
        }

        let ticket = state.entries.issue();
        let inserted = items.len();
        for item in items {
            state.entries.push(ticket, item);
        }
        debug!(
            group = %self.name(),
            inserted,
            total = state.entries.len(),
            "added items"
        );

        let weak = Rc::downgrade(&self.shared);
        let target: Weak<dyn Detach> = weak;
        DisconnectFn::new(target, ticket, inserted)
    }

    /// Create a child group of another item type, freed along with this one
    pub fn extend<A: 'static>(&self, handler: impl Fn(A) + 'static) -> Group<A> {
        self.extend_with_items(handler, Vec::new())
    }

    /// Create a pre-populated child group
    pub fn extend_with_items<A: 'static>(
        &self,
        handler: impl Fn(A) + 'static,
        items: impl IntoIterator<Item = A>,
    ) -> Group<A> {
        self.attach(
            self.next_child_config(),
            CleanupHandler::infallible(handler),
            items.into_iter().collect(),
        )
    }

    /// Create a child group whose handler can report failures
    pub fn extend_fallible<A: 'static>(
        &self,
        handler: impl Fn(A) -> anyhow::Result<()> + 'static,
    ) -> Group<A> {
        self.attach(
            self.next_child_config(),
            CleanupHandler::fallible(handler),
            Vec::new(),
        )
    }

    /// Configuration the next child inherits when it brings none of its own
    pub(crate) fn next_child_config(&self) -> GroupConfig {
        let spawned = self.shared.state.borrow().spawned;
        self.shared.config.child(spawned)
    }

    pub(crate) fn attach<A: 'static>(
        &self,
        config: GroupConfig,
        handler: CleanupHandler<A>,
        items: Vec<A>,
    ) -> Group<A> {
        let child = Group::from_parts(config, handler, items);
        let mut state = self.shared.state.borrow_mut();
        state.spawned += 1;

        if state.freed {
            drop(state);
            warn!(
                group = %self.name(),
                child = %child.name(),
                "extended a freed group, releasing the child immediately"
            );
            let failures = child.shared.release_all();
            if !failures.is_empty() {
                warn!(
                    group = %child.name(),
                    failures = failures.len(),
                    "released child of a freed group with failed cleanups"
                );
            }
            return child;
        }

        let handle: Rc<dyn Release> = child.shared.clone();
        state.children.push(handle);
        debug!(group = %self.name(), child = %child.name(), "attached child group");
        child
    }

    /// Release every item, then free every child.
    ///
    /// A failing handler never stops the rest of the subtree from being
    /// released. With [`FailurePolicy::Collect`] the failures come back as
    /// [`Error::CleanupFailed`]; with [`FailurePolicy::Log`] they are only
    /// logged. Freeing an already freed group does nothing.
    pub fn free(&self) -> Result<()> {
        let failures = self.shared.release_all();
        if failures.is_empty() {
            return Ok(());
        }

        match self.shared.config.failure_policy {
            FailurePolicy::Collect => Err(Error::cleanup_failed(self.name(), failures)),
            FailurePolicy::Log => {
                warn!(
                    group = %self.name(),
                    failures = failures.len(),
                    "freed group with failed cleanups"
                );
                Ok(())
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.config.name
    }

    pub fn config(&self) -> &GroupConfig {
        &self.shared.config
    }

    /// Number of live items, excluding children
    pub fn len(&self) -> usize {
        self.shared.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_freed(&self) -> bool {
        self.shared.state.borrow().freed
    }

    /// Snapshot of the live items in release order
    pub fn items(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.shared.state.borrow().entries.iter().cloned().collect()
    }

    pub fn handler(&self) -> CleanupHandler<T> {
        self.shared.handler.clone()
    }

    pub fn child_count(&self) -> usize {
        self.shared.state.borrow().children.len()
    }

    /// Names of the attached children in creation order
    pub fn child_names(&self) -> Vec<String> {
        self.shared
            .state
            .borrow()
            .children
            .iter()
            .map(|child| child.name().to_string())
            .collect()
    }

    /// Whether both handles refer to the same group
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<T: 'static> Shared<T> {
    fn release_all(&self) -> Vec<CleanupFailure> {
        let _span = debug_span!("free", group = %self.config.name).entered();

        let (items, children) = {
            let mut state = self.state.borrow_mut();
            if state.freed {
                debug!("group already freed");
                return Vec::new();
            }
            state.freed = true;
            (state.entries.take_all(), state.children.clone())
        };
        debug!(
            items = items.len(),
            children = children.len(),
            "releasing group"
        );

        let mut failures = self.run_handler(items);
        for child in children {
            failures.extend(child.release());
        }
        failures
    }

    fn run_handler(&self, items: Vec<T>) -> Vec<CleanupFailure> {
        items
            .into_iter()
            .enumerate()
            .filter_map(|(position, item)| {
                let message = self.handler.call_isolated(item).err()?;
                error!(
                    group = %self.config.name,
                    position,
                    %message,
                    "cleanup handler failed"
                );
                Some(CleanupFailure::new(&self.config.name, position, message))
            })
            .collect()
    }

    /// Items added after the group was freed are released on the spot
    fn release_late(&self, items: Vec<T>) {
        warn!(
            group = %self.config.name,
            items = items.len(),
            "added to a freed group, releasing immediately"
        );
        let failures = self.run_handler(items);
        if !failures.is_empty() {
            warn!(
                group = %self.config.name,
                failures = failures.len(),
                "released late items with failed cleanups"
            );
        }
    }
}

impl<T: 'static> Release for Shared<T> {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn release(&self) -> Vec<CleanupFailure> {
        self.release_all()
    }
}

impl<T: 'static> Detach for Shared<T> {
    fn detach(&self, ticket: Ticket) -> usize {
        // Removed items are dropped only after the borrow is released
        let removed = self.state.borrow_mut().entries.remove(ticket);
        let count = removed.len();
        debug!(group = %self.config.name, removed = count, "disconnected items");
        drop(removed);
        count
    }
}

impl<T: 'static> Drop for Shared<T> {
    fn drop(&mut self) {
        if !self.config.release_on_drop || self.state.get_mut().freed {
            return;
        }
        let failures = self.release_all();
        if !failures.is_empty() {
            warn!(
                group = %self.config.name,
                failures = failures.len(),
                "released dropped group with failed cleanups"
            );
        }
    }
}

impl<T: 'static> Clone for Group<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: 'static> fmt::Debug for Group<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("Group")
            .field("name", &self.shared.config.name)
            .field("items", &state.entries.len())
            .field("children", &state.children.len())
            .field("freed", &state.freed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn recorder<T: 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(T) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |item: T| sink.borrow_mut().push(item))
    }

    #[test]
    fn test_free_in_insertion_order() {
        let (log, handler) = recorder();
        let group = Group::new(handler);
        group.add(1);
        group.add(2);

        group.free().unwrap();
        assert_eq!(*log.borrow(), vec![1, 2]);
        assert!(group.is_empty());
        assert!(group.is_freed());
    }

    #[test]
    fn test_initial_items_not_released_at_creation() {
        let (log, handler) = recorder();
        let group = Group::with_items(handler, [3, 4]);
        assert!(log.borrow().is_empty());
        assert_eq!(group.items(), vec![3, 4]);

        group.add(5);
        group.free().unwrap();
        assert_eq!(*log.borrow(), vec![3, 4, 5]);
    }

    #[test]
    fn test_disconnect_removes_only_own_record() {
        let (log, handler) = recorder();
        let group = Group::new(handler);
        let first = group.add("x");
        let _second = group.add("x");

        assert_eq!(first.disconnect(), 1);
        assert_eq!(first.disconnect(), 0);
        assert_eq!(group.len(), 1);

        group.free().unwrap();
        assert_eq!(*log.borrow(), vec!["x"]);
    }

    #[test]
    fn test_add_many_disconnect() {
        let (log, handler) = recorder();
        let group = Group::new(handler);
        group.add(0);
        let batch = group.add_many([1, 2, 3]);
        group.add(4);
        assert_eq!(batch.len(), 3);

        assert_eq!(batch.disconnect(), 3);
        group.free().unwrap();
        assert_eq!(*log.borrow(), vec![0, 4]);
    }

    #[test]
    fn test_empty_add_many() {
        let (log, handler) = recorder::<u8>();
        let group = Group::new(handler);
        let batch = group.add_many(Vec::new());
        assert!(batch.is_empty());
        assert_eq!(batch.disconnect(), 0);
        group.free().unwrap();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_children_named_after_parent() {
        let root = Group::builder()
            .name("root")
            .handler(|_: u8| {})
            .build()
            .unwrap();
        let first = root.extend(|_: String| {});
        let second = root.extend(|_: bool| {});

        assert_eq!(first.name(), "root.0");
        assert_eq!(second.name(), "root.1");
        assert_eq!(first.extend(|_: u8| {}).name(), "root.0.0");
        assert_eq!(root.child_count(), 2);
        assert_eq!(root.child_names(), vec!["root.0", "root.1"]);
    }

    #[test]
    fn test_double_free_skips_children() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let root = Group::new(|_: ()| {});
        let child = root.extend(move |_: ()| counter.set(counter.get() + 1));
        child.add(());

        root.free().unwrap();
        root.free().unwrap();
        child.free().unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(root.child_count(), 1);
    }

    #[test]
    fn test_handler_identity() {
        let group = Group::new(|_: u8| {});
        assert!(group.handler().ptr_eq(&group.clone().handler()));
        assert!(group.ptr_eq(&group.clone()));
    }

    #[test]
    fn test_debug_output() {
        let group = Group::new(|_: u8| {});
        group.add(1);
        let rendered = format!("{group:?}");
        assert!(rendered.contains("name: \"janitor\""));
        assert!(rendered.contains("items: 1"));
        assert!(rendered.contains("freed: false"));
    }
}
