//! StoreView - a render-side binding to one store
//!
//! A view is what a mounted UI consumer holds: a cached copy of the latest
//! state, refreshed by exactly one listener, plus a flag telling the render
//! loop that a redraw is due. Dropping the view is the consumer's teardown
//! and unregisters its listener.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::listener::{listener, Unsubscribe};
use crate::state::State;
use crate::store::Store;

/// Cached, self-refreshing view of a store's state
///
/// # Example
///
/// ```rust,ignore
/// let view = store.view();
///
/// loop {
///     if view.take_changed() {
///         render(&view.current());
///     }
///     // ... handle input, which may call actions on the store
/// }
/// ```
pub struct StoreView<T: State> {
    cached: Arc<Mutex<Arc<T>>>,
    changed: Arc<AtomicBool>,
    subscription: Unsubscribe,
}

impl<T: State> StoreView<T> {
    fn new(store: &Store<T>) -> Self {
        let cached = Arc::new(Mutex::new(store.read()));
        let changed = Arc::new(AtomicBool::new(false));

        let cached_in_listener = Arc::clone(&cached);
        let changed_in_listener = Arc::clone(&changed);
        let subscription = store.subscribe(listener(move |state: &Arc<T>| {
            *cached_in_listener.lock() = Arc::clone(state);
            changed_in_listener.store(true, Ordering::Release);
        }));

        // A commit may have landed between the first read and the subscribe
        *cached.lock() = store.read();

        Self {
            cached,
            changed,
            subscription,
        }
    }

    /// The most recently delivered state
    pub fn current(&self) -> Arc<T> {
        Arc::clone(&self.cached.lock())
    }

    /// Whether a notification arrived since the last `take_changed`
    pub fn has_changed(&self) -> bool {
        self.changed.load(Ordering::Acquire)
    }

    /// Clear and return the redraw flag
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }
}

impl<T: State> Drop for StoreView<T> {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

impl<T: State> Store<T> {
    /// Mount a [`StoreView`] on this store
    ///
    /// Registers one listener for the lifetime of the view.
    pub fn view(&self) -> StoreView<T> {
        StoreView::new(self)
    }
}
