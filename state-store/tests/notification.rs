//! Notification policy tests: fan-out, isolation, and re-entrancy

use rstest::{fixture, rstest};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use state_store::{define_state, listener, Listener, Store, StoreError};

define_state! {
    pub struct Cars {
        pub cars: u32,
        pub owner: Option<String>,
    }
}

#[fixture]
fn store() -> Store<Cars> {
    Store::new(Cars {
        cars: 0,
        owner: None,
    })
}

fn recorder(log: &Arc<Mutex<Vec<Arc<Cars>>>>) -> Listener<Cars> {
    let log = Arc::clone(log);
    listener(move |state: &Arc<Cars>| log.lock().push(Arc::clone(state)))
}

#[rstest]
fn two_listeners_receive_the_same_value(store: Store<Cars>) {
    let first = Arc::new(Mutex::new(Vec::new()));
    let second = Arc::new(Mutex::new(Vec::new()));
    let _a = store.subscribe(recorder(&first));
    let _b = store.subscribe(recorder(&second));

    store.merge(CarsPartial::default().cars(1));

    let first = first.lock();
    let second = second.lock();
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert!(Arc::ptr_eq(&first[0], &second[0]));
}

#[rstest]
#[case::first(0)]
#[case::middle(1)]
#[case::last(2)]
fn panicking_listener_does_not_starve_others(store: Store<Cars>, #[case] faulty: usize) {
    let calls = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..3)
        .map(|i| {
            let calls = Arc::clone(&calls);
            store.subscribe(listener(move |_: &Arc<Cars>| {
                if i == faulty {
                    panic!("listener {} failed", i);
                }
                calls.fetch_add(1, Ordering::SeqCst);
            }))
        })
        .collect();

    store.merge(CarsPartial::default().cars(1));

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.get().cars, 1);
    assert_eq!(handles.len(), 3);
}

#[rstest]
#[case(1)]
#[case(5)]
#[case(25)]
fn every_set_notifies_even_within_one_handler(store: Store<Cars>, #[case] sets: u32) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let _handle = store.subscribe(recorder(&log));

    // Simulates one external event handler issuing several writes
    for _ in 0..sets {
        store.update(|c| CarsPartial::default().cars(c.cars + 1));
    }

    let seen: Vec<u32> = log.lock().iter().map(|c| c.cars).collect();
    assert_eq!(seen, (1..=sets).collect::<Vec<_>>());
}

#[rstest]
fn notification_happens_before_set_returns(store: Store<Cars>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let _handle = store.subscribe(recorder(&log));

    store.merge(CarsPartial::default().owner(Some("n.elyousfi".to_string())));
    assert_eq!(log.lock().len(), 1);

    store.merge(CarsPartial::default().owner(None));
    let log = log.lock();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].owner, None);
}

#[rstest]
fn listener_can_read_other_store(store: Store<Cars>) {
    let mirror = Store::new(Cars {
        cars: 100,
        owner: None,
    });
    let observed = Arc::new(AtomicUsize::new(0));

    let mirror_reader = mirror.getter();
    let observed_clone = Arc::clone(&observed);
    let _handle = store.subscribe(listener(move |state: &Arc<Cars>| {
        if let Ok(mirror) = mirror_reader.get() {
            observed_clone.store((mirror.cars + state.cars) as usize, Ordering::SeqCst);
        }
    }));

    store.merge(CarsPartial::default().cars(2));

    assert_eq!(observed.load(Ordering::SeqCst), 102);
}

#[rstest]
fn setter_reports_dropped_store(store: Store<Cars>) {
    let setter = store.setter();
    drop(store);

    assert_eq!(
        setter.merge(CarsPartial::default().cars(1)),
        Err(StoreError::Dropped)
    );
}
