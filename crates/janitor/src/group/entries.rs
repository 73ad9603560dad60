//! Ordered item storage with per-call removal

/// Identifies the records inserted by one `add`/`add_many` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Ticket(u64);

struct Slot<T> {
    ticket: Ticket,
    item: T,
}

/// Items in insertion order, each tagged with the ticket of the call that added it.
///
/// Values are never compared: removal goes by ticket, so the same value added
/// by two calls occupies two independent slots.
pub(crate) struct Entries<T> {
    slots: Vec<Slot<T>>,
    next_ticket: u64,
}

impl<T> Entries<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_ticket: 0,
        }
    }

    pub(crate) fn issue(&mut self) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    pub(crate) fn push(&mut self, ticket: Ticket, item: T) {
        self.slots.push(Slot { ticket, item });
    }

    /// Detach every slot carrying `ticket`, keeping the order of the rest.
    ///
    /// The removed items are handed back so the caller decides when they drop.
    pub(crate) fn remove(&mut self, ticket: Ticket) -> Vec<T> {
        let (removed, kept): (Vec<Slot<T>>, Vec<Slot<T>>) = std::mem::take(&mut self.slots)
            .into_iter()
            .partition(|slot| slot.ticket == ticket);
        self.slots = kept;
        removed.into_iter().map(|slot| slot.item).collect()
    }

    /// Detach every item, oldest first
    pub(crate) fn take_all(&mut self) -> Vec<T> {
        std::mem::take(&mut self.slots)
            .into_iter()
            .map(|slot| slot.item)
            .collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().map(|slot| &slot.item)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}
