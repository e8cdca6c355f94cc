//! Property-based tests for the store primitive
//!
//! Each property drives a store through a random sequence of partial updates
//! and checks merge preservation and notification counts.

use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use state_store::{define_state, listener, PartialState, Store};

define_state! {
    #[derive(PartialEq)]
    pub struct Record {
        pub name: Option<String>,
        pub count: i64,
        pub enabled: bool,
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// One randomly generated update: each field is either unmentioned or set
#[derive(Debug, Clone)]
struct Update {
    name: Option<Option<String>>,
    count: Option<i64>,
    enabled: Option<bool>,
}

impl Update {
    fn to_partial(&self) -> RecordPartial {
        RecordPartial {
            name: self.name.clone(),
            count: self.count,
            enabled: self.enabled,
        }
    }
}

fn record_strategy() -> impl Strategy<Value = Record> {
    (proptest::option::of("[a-z]{1,8}"), any::<i64>(), any::<bool>())
        .prop_map(|(name, count, enabled)| Record { name, count, enabled })
}

fn update_strategy() -> impl Strategy<Value = Update> {
    (
        proptest::option::of(proptest::option::of("[a-z]{1,8}")),
        proptest::option::of(any::<i64>()),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(name, count, enabled)| Update { name, count, enabled })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Immediately after construction `get()` is the initializer's value
    #[test]
    fn prop_get_returns_initial_state(initial in record_strategy()) {
        let expected = initial.clone();
        let store = Store::create(move |_set, _get| initial);

        prop_assert_eq!(&*store.get(), &expected);
        prop_assert_eq!(store.version(), 0);
    }

    /// Unmentioned fields survive; mentioned fields (including `None`) win
    #[test]
    fn prop_shallow_merge(initial in record_strategy(), update in update_strategy()) {
        let store = Store::new(initial.clone());

        store.merge(update.to_partial());
        let after = store.get();

        match &update.name {
            Some(name) => prop_assert_eq!(&after.name, name),
            None => prop_assert_eq!(&after.name, &initial.name),
        }
        prop_assert_eq!(after.count, update.count.unwrap_or(initial.count));
        prop_assert_eq!(after.enabled, update.enabled.unwrap_or(initial.enabled));
    }

    /// Every listener sees every `set` exactly once, with the committed value
    #[test]
    fn prop_listener_called_once_per_set(
        initial in record_strategy(),
        updates in proptest::collection::vec(update_strategy(), 0..20),
    ) {
        let store = Store::new(initial);
        let calls = Arc::new(AtomicUsize::new(0));
        let last_seen = Arc::new(parking_lot::Mutex::new(None));

        let calls_clone = Arc::clone(&calls);
        let last_seen_clone = Arc::clone(&last_seen);
        let _handle = store.subscribe(listener(move |state: &Arc<Record>| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            *last_seen_clone.lock() = Some(Arc::clone(state));
        }));

        for update in &updates {
            store.set(PartialState::literal(update.to_partial()));
            let seen = last_seen.lock().clone();
            prop_assert!(seen.map(|s| Arc::ptr_eq(&s, &store.get())).unwrap_or(false));
        }

        prop_assert_eq!(calls.load(Ordering::SeqCst), updates.len());
        prop_assert_eq!(store.version(), updates.len() as u64);
    }

    /// After unsubscribing, no further notifications arrive
    #[test]
    fn prop_no_calls_after_unsubscribe(
        before in proptest::collection::vec(update_strategy(), 0..10),
        after in proptest::collection::vec(update_strategy(), 0..10),
    ) {
        let store = Store::new(Record { name: None, count: 0, enabled: false });
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_clone = Arc::clone(&calls);
        let handle = store.subscribe(listener(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        }));

        for update in &before {
            store.merge(update.to_partial());
        }
        handle.unsubscribe();
        handle.unsubscribe();
        for update in &after {
            store.merge(update.to_partial());
        }

        prop_assert_eq!(calls.load(Ordering::SeqCst), before.len());
    }

    /// A computed update is evaluated against the state at the time of `set`
    #[test]
    fn prop_computed_update_reads_live_state(steps in 1usize..50) {
        let store = Store::new(Record { name: None, count: 0, enabled: false });

        for _ in 0..steps {
            store.update(|r| RecordPartial::default().count(r.count + 1));
        }

        prop_assert_eq!(store.get().count, steps as i64);
    }
}
