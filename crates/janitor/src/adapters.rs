//! Cleanup handlers for common kinds of resource.
//!
//! Each adapter is an ordinary function that can be passed wherever a group
//! expects a handler. The shortcut constructors below wire them up:
//!
//! - [`Group::callbacks`] runs deferred closures.
//! - [`Group::connections`] disconnects subscriptions.
//! - [`Group::objects`] destroys owned objects.

use crate::group::{DisconnectFn, Group};
use tracing::warn;

/// A deferred zero-argument callback
pub type Callback = Box<dyn FnOnce()>;

/// A subscription or connection that can be severed
pub trait Disconnect {
    fn disconnect(&mut self);
}

/// An owned object with an explicit teardown
pub trait Destroy {
    fn destroy(self);
}

/// Handler that invokes a deferred callback
pub fn call(callback: Callback) {
    callback()
}

/// Handler that severs a connection
pub fn disconnect<C: Disconnect>(mut connection: C) {
    connection.disconnect()
}

/// Handler that destroys an owned object
pub fn destroy<D: Destroy>(object: D) {
    object.destroy()
}

impl Disconnect for DisconnectFn {
    fn disconnect(&mut self) {
        DisconnectFn::disconnect(self);
    }
}

impl<T: 'static> Destroy for Group<T> {
    fn destroy(self) {
        if let Err(err) = self.free() {
            warn!(group = %self.name(), %err, "destroyed group with failed cleanups");
        }
    }
}

impl Group<Callback> {
    pub fn callbacks() -> Self {
        Group::new(call)
    }

    /// Queue `callback` to run when the group is freed
    pub fn defer(&self, callback: impl FnOnce() + 'static) -> DisconnectFn {
        self.add(Box::new(callback))
    }
}

impl<C: Disconnect + 'static> Group<C> {
    pub fn connections() -> Self {
        Group::new(disconnect::<C>)
    }
}

impl<D: Destroy + 'static> Group<D> {
    pub fn objects() -> Self {
        Group::new(destroy::<D>)
    }
}

impl<T: 'static> Group<T> {
    pub fn extend_callbacks(&self) -> Group<Callback> {
        self.extend(call)
    }

    pub fn extend_connections<C: Disconnect + 'static>(&self) -> Group<C> {
        self.extend(disconnect::<C>)
    }

    pub fn extend_objects<D: Destroy + 'static>(&self) -> Group<D> {
        self.extend(destroy::<D>)
    }
}
