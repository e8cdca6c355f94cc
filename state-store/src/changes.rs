//! Blocking iteration over committed states
//!
//! For consumers that would rather pull than be called back, a store can
//! forward every committed state into a channel:
//! - Blocking: `recv()`, `for change in changes`
//! - Non-blocking: `try_recv()`, `try_iter()`
//! - Timeout: `recv_timeout()`, `timeout_iter()`

use std::fmt;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use crate::listener::{listener, Unsubscribe};
use crate::state::State;
use crate::store::Store;

/// One committed state, as delivered to a [`StateChanges`] iterator
pub struct StateChange<T> {
    /// The state right after the commit
    pub state: Arc<T>,

    /// When the notification was delivered
    pub timestamp: Instant,
}

impl<T> StateChange<T> {
    /// Create a change stamped with the current time
    pub fn new(state: Arc<T>) -> Self {
        Self {
            state,
            timestamp: Instant::now(),
        }
    }
}

impl<T> Clone for StateChange<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            timestamp: self.timestamp,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StateChange<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateChange")
            .field("state", &self.state)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// Iterator over a store's committed states
///
/// Holds one subscription for its lifetime; dropping it unsubscribes.
/// Blocking calls return `None` once the store is gone.
///
/// The channel is unbounded: every commit queues one [`StateChange`] until it
/// is read, and `set` never blocks on a slow reader. An iterator nobody
/// drains grows by one entry per commit, so drain it or drop it.
pub struct StateChanges<T: State> {
    rx: mpsc::Receiver<StateChange<T>>,
    subscription: Unsubscribe,
}

impl<T: State> StateChanges<T> {
    fn new(store: &Store<T>) -> Self {
        let (tx, rx) = mpsc::channel();

        let subscription = store.subscribe(listener(move |state: &Arc<T>| {
            // The receiver may already be gone while the store is mid-pass
            let _ = tx.send(StateChange::new(Arc::clone(state)));
        }));

        Self { rx, subscription }
    }

    /// Block until the next commit
    ///
    /// Returns `None` if the store has been dropped.
    pub fn recv(&self) -> Option<StateChange<T>> {
        self.rx.recv().ok()
    }

    /// Block until the next commit or the timeout expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<StateChange<T>> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Take a pending change without blocking
    pub fn try_recv(&self) -> Option<StateChange<T>> {
        self.rx.try_recv().ok()
    }

    /// Drain the changes that are already queued
    pub fn try_iter(&self) -> TryIter<'_, T> {
        TryIter { inner: self }
    }

    /// Blocking iterator that stops after `timeout` without a commit
    pub fn timeout_iter(&self, timeout: Duration) -> TimeoutIter<'_, T> {
        TimeoutIter {
            inner: self,
            timeout,
        }
    }
}

impl<T: State> Iterator for StateChanges<T> {
    type Item = StateChange<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

impl<T: State> Drop for StateChanges<T> {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

/// Non-blocking iterator over queued changes
pub struct TryIter<'a, T: State> {
    inner: &'a StateChanges<T>,
}

impl<'a, T: State> Iterator for TryIter<'a, T> {
    type Item = StateChange<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}

/// Blocking iterator with a per-item timeout
pub struct TimeoutIter<'a, T: State> {
    inner: &'a StateChanges<T>,
    timeout: Duration,
}

impl<'a, T: State> Iterator for TimeoutIter<'a, T> {
    type Item = StateChange<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.recv_timeout(self.timeout)
    }
}

impl<T: State> Store<T> {
    /// Subscribe a channel-backed [`StateChanges`] iterator
    ///
    /// Backed by an unbounded channel. Commits keep queueing while the
    /// iterator is alive and unread; drop it when no longer polled.
    pub fn changes(&self) -> StateChanges<T> {
        StateChanges::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define_state;
    use std::thread;

    define_state! {
        struct Cars {
            cars: u32,
        }
    }

    #[test]
    fn test_try_recv_empty() {
        let store = Store::new(Cars { cars: 0 });
        let changes = store.changes();

        assert!(changes.try_recv().is_none());
    }

    #[test]
    fn test_try_iter_drains_in_commit_order() {
        let store = Store::new(Cars { cars: 0 });
        let changes = store.changes();

        for n in 1..=3 {
            store.merge(CarsPartial::default().cars(n));
        }

        let seen: Vec<u32> = changes.try_iter().map(|c| c.state.cars).collect();
        assert_eq!(seen, vec![1, 2, 3]);
        assert!(changes.try_recv().is_none());
    }

    #[test]
    fn test_recv_timeout_expires() {
        let store = Store::new(Cars { cars: 0 });
        let changes = store.changes();

        let start = Instant::now();
        assert!(changes.recv_timeout(Duration::from_millis(50)).is_none());
        assert!(start.elapsed() >= Duration::from_millis(45));
    }

    #[test]
    fn test_recv_from_other_thread() {
        let store = Store::new(Cars { cars: 0 });
        let changes = store.changes();

        let writer = store.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            writer.merge(CarsPartial::default().cars(7));
        });

        let change = changes.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(change.state.cars, 7);
        handle.join().unwrap();
    }

    #[test]
    fn test_timeout_iter_stops_when_idle() {
        let store = Store::new(Cars { cars: 0 });
        let changes = store.changes();
        store.merge(CarsPartial::default().cars(1));

        let count = changes.timeout_iter(Duration::from_millis(20)).count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_undrained_iterator_queues_every_commit() {
        let store = Store::new(Cars { cars: 0 });
        let changes = store.changes();

        for n in 1..=100 {
            store.merge(CarsPartial::default().cars(n));
        }

        assert_eq!(changes.try_iter().count(), 100);

        drop(changes);
        store.merge(CarsPartial::default().cars(0));
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let store = Store::new(Cars { cars: 0 });
        let changes = store.changes();
        assert_eq!(store.listener_count(), 1);

        drop(changes);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_recv_ends_when_store_dropped() {
        let store = Store::new(Cars { cars: 0 });
        let changes = store.changes();

        drop(store);
        assert!(changes.recv().is_none());
    }
}
