//! Listener registry and unsubscribe handles
//!
//! Listeners are keyed by identity (the `Arc` allocation). Subscribing the
//! same [`Listener`] twice is a no-op; both returned handles refer to the one
//! registry entry. Iteration is in insertion order, but that order is not
//! part of the contract.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// A callback invoked with the new state after each committed `set`
pub type Listener<T> = Arc<dyn Fn(&Arc<T>) + Send + Sync>;

/// Wrap a closure as a [`Listener`]
///
/// Keep the returned `Arc` around if you need to subscribe the same listener
/// again; a fresh call to `listener` always yields a new identity.
pub fn listener<T, F>(f: F) -> Listener<T>
where
    F: Fn(&Arc<T>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Identifier for one registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

struct Entry<T> {
    id: ListenerId,
    listener: Listener<T>,
}

/// Insertion-ordered set of listeners keyed by `Arc` identity
pub(crate) struct ListenerRegistry<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> ListenerRegistry<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Add a listener, returning its id and whether a new entry was created
    pub(crate) fn insert(&mut self, listener: Listener<T>) -> (ListenerId, bool) {
        if let Some(existing) = self.entries.iter().find(|e| same_listener(&e.listener, &listener)) {
            return (existing.id, false);
        }

        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, listener });
        (id, true)
    }

    /// Remove an entry, returning whether it existed
    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Copy of the current listeners, for iteration outside the lock
    pub(crate) fn snapshot(&self) -> Vec<(ListenerId, Listener<T>)> {
        self.entries
            .iter()
            .map(|e| (e.id, Arc::clone(&e.listener)))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

// Compare data pointers only; vtable pointers for one closure type may differ
// between codegen units.
fn same_listener<T>(a: &Listener<T>, b: &Listener<T>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

type Detach = Box<dyn FnOnce() -> bool + Send>;

/// Handle returned by `subscribe`; removes that listener from the store
///
/// Unsubscribing is idempotent: only the first call has an effect.
/// Dropping the handle does **not** unsubscribe. A listener whose handle is
/// lost keeps firing until the store itself is dropped.
pub struct Unsubscribe {
    id: ListenerId,
    detach: Mutex<Option<Detach>>,
}

impl Unsubscribe {
    pub(crate) fn new(id: ListenerId, detach: Detach) -> Self {
        Self {
            id,
            detach: Mutex::new(Some(detach)),
        }
    }

    /// Remove the listener from the store
    ///
    /// Returns `true` if this call removed a registry entry. Later calls, and
    /// calls after the store is gone, return `false`.
    pub fn unsubscribe(&self) -> bool {
        let detach = self.detach.lock().take();
        match detach {
            Some(detach) => detach(),
            None => false,
        }
    }

    /// The registry entry this handle refers to
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether `unsubscribe` has already been called on this handle
    pub fn is_unsubscribed(&self) -> bool {
        self.detach.lock().is_none()
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("id", &self.id)
            .field("unsubscribed", &self.is_unsubscribed())
            .finish()
    }
}
