//! Property-based tests for group release ordering and scoped removal
//!
//! Each case builds a group from a random series of add/add_many calls,
//! disconnects a random subset of them, and checks what free releases.

use janitor::{DisconnectFn, Group};
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// One add call: a single item, or a batch handed to add_many
#[derive(Debug, Clone)]
enum Call {
    Add(u8),
    AddMany(Vec<u8>),
}

impl Call {
    fn items(&self) -> Vec<u8> {
        match self {
            Call::Add(item) => vec![*item],
            Call::AddMany(items) => items.clone(),
        }
    }
}

/// Small value range so duplicates are common
fn arb_call() -> impl Strategy<Value = Call> {
    prop_oneof![
        (0_u8..4).prop_map(Call::Add),
        prop::collection::vec(0_u8..4, 0..5).prop_map(Call::AddMany),
    ]
}

fn arb_calls_with_mask() -> impl Strategy<Value = Vec<(Call, bool)>> {
    prop::collection::vec((arb_call(), any::<bool>()), 0..24)
}

fn recording_group() -> (Rc<RefCell<Vec<u8>>>, Group<u8>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    (log, Group::new(move |item: u8| sink.borrow_mut().push(item)))
}

fn apply(group: &Group<u8>, call: &Call) -> DisconnectFn {
    match call {
        Call::Add(item) => group.add(*item),
        Call::AddMany(items) => group.add_many(items.iter().copied()),
    }
}

proptest! {
    /// Property: free releases surviving items in exact insertion order
    #[test]
    fn prop_release_preserves_insertion_order(calls in prop::collection::vec(arb_call(), 0..24)) {
        let (log, group) = recording_group();
        let expected: Vec<u8> = calls.iter().flat_map(Call::items).collect();
        for call in &calls {
            apply(&group, call);
        }

        prop_assert_eq!(group.items(), expected.clone());
        group.free().unwrap();
        prop_assert_eq!(log.borrow().clone(), expected);
        prop_assert!(group.is_empty());
    }

    /// Property: disconnecting a call removes exactly the records it inserted
    #[test]
    fn prop_disconnect_is_scoped_to_its_call(calls in arb_calls_with_mask()) {
        let (log, group) = recording_group();
        let handles: Vec<DisconnectFn> = calls.iter().map(|(call, _)| apply(&group, call)).collect();

        for ((call, remove), handle) in calls.iter().zip(&handles) {
            if *remove {
                prop_assert_eq!(handle.disconnect(), call.items().len());
                prop_assert_eq!(handle.disconnect(), 0);
            }
        }

        let expected: Vec<u8> = calls
            .iter()
            .filter(|(_, remove)| !remove)
            .flat_map(|(call, _)| call.items())
            .collect();
        group.free().unwrap();
        prop_assert_eq!(log.borrow().clone(), expected);
    }

    /// Property: repeated frees never release an item twice
    #[test]
    fn prop_free_is_idempotent(calls in prop::collection::vec(arb_call(), 0..24), frees in 1_usize..4) {
        let (log, group) = recording_group();
        let (child_log, child) = {
            let log = Rc::new(RefCell::new(Vec::new()));
            let sink = Rc::clone(&log);
            (log, group.extend(move |item: u8| sink.borrow_mut().push(item)))
        };
        for call in &calls {
            apply(&group, call);
            apply(&child, call);
        }
        let total: usize = calls.iter().map(|call| call.items().len()).sum();

        for _ in 0..frees {
            group.free().unwrap();
        }
        child.free().unwrap();

        prop_assert_eq!(log.borrow().len(), total);
        prop_assert_eq!(child_log.borrow().len(), total);
    }

    /// Property: freeing one group leaves another holding the same values untouched
    #[test]
    fn prop_groups_are_independent(calls in prop::collection::vec(arb_call(), 0..24)) {
        let (first_log, first) = recording_group();
        let (second_log, second) = recording_group();
        for call in &calls {
            apply(&first, call);
            apply(&second, call);
        }
        let expected: Vec<u8> = calls.iter().flat_map(Call::items).collect();

        first.free().unwrap();

        prop_assert_eq!(first_log.borrow().clone(), expected.clone());
        prop_assert!(second_log.borrow().is_empty());
        prop_assert_eq!(second.items(), expected);
    }
}
