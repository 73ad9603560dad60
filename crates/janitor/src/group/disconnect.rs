//! Handles that withdraw the items of a single add call

use super::entries::Ticket;
use std::cell::Cell;
use std::fmt;
use std::rc::Weak;

/// Storage that can drop the records of one ticket
pub(crate) trait Detach {
    fn detach(&self, ticket: Ticket) -> usize;
}

/// Returned by `Group::add` and `Group::add_many`.
///
/// Disconnecting removes exactly the records inserted by the call that
/// produced this handle, so the items are skipped when the group is freed.
/// The handle only holds a weak reference: disconnecting after the group was
/// freed or dropped does nothing. Dropping the handle does not disconnect.
pub struct DisconnectFn {
    link: Option<(Weak<dyn Detach>, Ticket)>,
    len: usize,
    connected: Cell<bool>,
}

impl DisconnectFn {
    pub(crate) fn new(target: Weak<dyn Detach>, ticket: Ticket, len: usize) -> Self {
        Self {
            link: Some((target, ticket)),
            len,
            connected: Cell::new(true),
        }
    }

    /// A handle that was never attached to live storage
    pub(crate) fn inert() -> Self {
        Self {
            link: None,
            len: 0,
            connected: Cell::new(false),
        }
    }

    /// Remove the records this handle covers; returns how many were still present
    pub fn disconnect(&self) -> usize {
        if !self.connected.replace(false) {
            return 0;
        }
        match &self.link {
            Some((target, ticket)) => target.upgrade().map_or(0, |storage| storage.detach(*ticket)),
            None => 0,
        }
    }

    /// False once `disconnect` has been called
    pub fn is_connected(&self) -> bool {
        self.connected.get()
    }

    /// Number of records the originating call inserted
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for DisconnectFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisconnectFn")
            .field("len", &self.len)
            .field("connected", &self.connected.get())
            .finish()
    }
}
