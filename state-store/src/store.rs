//! The store: shared, observable, mutable state
//!
//! A [`Store<T>`] owns the current state (behind an `Arc`, replaced on every
//! commit) and a registry of listeners. Updates are shallow merges of a
//! [`PartialState`]; every committed update notifies every listener
//! synchronously before `set` returns.
//!
//! # Architecture
//!
//! ```text
//! Store<T>  (clonable handle)
//!     │
//!     └── Arc<Inner<T>>
//!             ├── state: RwLock<Arc<T>>          swapped on commit
//!             ├── version: AtomicU64             commit counter
//!             ├── listeners: Mutex<ListenerRegistry<T>>
//!             └── commit: ReentrantMutex<()>     serialises read→merge→replace→notify
//!
//! SetState<T> / GetState<T>  (bound handles, Weak<Inner<T>>)
//! ```
//!
//! # Self-reference
//!
//! [`Store::create`] hands the initializer a [`SetState`] and [`GetState`]
//! already bound to the store being built, so action fields on the state can
//! update their own store. The bound handles are weak: a state record holding
//! actions does not keep its own store alive.
//!
//! # Notification policy
//!
//! - The registry is snapshotted before a pass; subscribing or unsubscribing
//!   from inside a listener only affects later passes.
//! - A panicking listener is logged and skipped; the rest still run and the
//!   panic never reaches the caller of `set`.
//! - A `set` issued from inside a listener (same thread) commits immediately
//!   and runs its own full pass. The outer pass then stops: listeners it had
//!   not reached yet already saw the newer state, so no listener is ever
//!   handed a state older than one it has already received.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex, RwLock};

use crate::error::{Result, StoreError};
use crate::listener::{Listener, ListenerId, ListenerRegistry, Unsubscribe};
use crate::state::{PartialState, State};

// ============================================================================
// Inner - the shared store body
// ============================================================================

struct Inner<T: State> {
    state: RwLock<Arc<T>>,
    version: AtomicU64,
    listeners: Mutex<ListenerRegistry<T>>,
    commit: ReentrantMutex<()>,
}

impl<T: State> Inner<T> {
    fn new(initial: T) -> Self {
        Self {
            state: RwLock::new(Arc::new(initial)),
            version: AtomicU64::new(0),
            listeners: Mutex::new(ListenerRegistry::new()),
            commit: ReentrantMutex::new(()),
        }
    }

    fn get(&self) -> Arc<T> {
        Arc::clone(&self.state.read())
    }

    fn set(&self, partial: PartialState<T>) {
        let _commit = self.commit.lock();

        let current = self.get();
        let computed = partial.is_computed();
        let next = Arc::new(current.merge(partial.resolve(&current)));

        *self.state.write() = Arc::clone(&next);
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;

        tracing::trace!(
            state = std::any::type_name::<T>(),
            version,
            computed,
            "State committed"
        );

        self.notify(&next, version);
    }

    fn notify(&self, state: &Arc<T>, version: u64) {
        let listeners = self.listeners.lock().snapshot();

        for (id, listener) in listeners {
            // A nested `set` from an earlier listener already delivered a newer
            // state to the whole registry; the rest of this pass is stale.
            let latest = self.version.load(Ordering::SeqCst);
            if latest != version {
                tracing::trace!(version, latest, "Notification pass superseded by a nested commit");
                break;
            }

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener(state)));
            if let Err(payload) = outcome {
                tracing::warn!(
                    listener = %id,
                    version,
                    reason = panic_message(payload.as_ref()),
                    "Listener panicked during notification, continuing with the rest"
                );
            }
        }
    }

    fn subscribe(self: &Arc<Self>, listener: Listener<T>) -> Unsubscribe {
        let (id, inserted) = self.listeners.lock().insert(listener);
        tracing::debug!(listener = %id, inserted, "Listener subscribed");

        let weak = Arc::downgrade(self);
        Unsubscribe::new(
            id,
            Box::new(move || match weak.upgrade() {
                Some(inner) => inner.unsubscribe(id),
                None => false,
            }),
        )
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        let removed = self.listeners.lock().remove(id);
        if removed {
            tracing::debug!(listener = %id, "Listener unsubscribed");
        }
        removed
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

// ============================================================================
// Store<T> - the owning handle
// ============================================================================

/// Observable state container with shallow-merge updates
///
/// Cloning a `Store` yields another handle to the same state. Construct each
/// store once at start-up and pass handles to the consumers and to the other
/// stores that read from it.
///
/// # Example
///
/// ```rust
/// use state_store::{define_state, listener, Action, Store};
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
///
/// define_state! {
///     pub struct Counter {
///         pub count: u32,
///         pub bump: Action,
///     }
/// }
///
/// let store = Store::<Counter>::create(|set, _get| Counter {
///     count: 0,
///     bump: Action::new("bump", move || {
///         set.update(|s: &Counter| CounterPartial::default().count(s.count + 1))
///     }),
/// });
///
/// let seen = Arc::new(AtomicU32::new(0));
/// let seen_in_listener = Arc::clone(&seen);
/// let handle = store.subscribe(listener(move |s: &Arc<Counter>| {
///     seen_in_listener.store(s.count, Ordering::SeqCst);
/// }));
///
/// store.get().bump.call().unwrap();
/// assert_eq!(store.get().count, 1);
/// assert_eq!(seen.load(Ordering::SeqCst), 1);
///
/// handle.unsubscribe();
/// ```
pub struct Store<T: State> {
    inner: Arc<Inner<T>>,
}

impl<T: State> Store<T> {
    /// Build a store from an initializer receiving bound `set` and `get`
    ///
    /// The initializer runs exactly once, synchronously, before this returns.
    /// Its return value is the initial state. The handles it receives stay
    /// bound to this store for its whole life; calling them *during* the
    /// initializer yields [`StoreError::Uninitialized`].
    pub fn create<F>(initializer: F) -> Self
    where
        F: FnOnce(SetState<T>, GetState<T>) -> T,
    {
        let ready = Arc::new(AtomicBool::new(false));

        let inner = Arc::new_cyclic(|weak: &Weak<Inner<T>>| {
            let bound = Bound {
                inner: weak.clone(),
                ready: Arc::clone(&ready),
            };
            let initial = initializer(SetState { bound: bound.clone() }, GetState { bound });
            Inner::new(initial)
        });
        ready.store(true, Ordering::Release);

        tracing::debug!(state = std::any::type_name::<T>(), "Store created");
        Self { inner }
    }

    /// Build a store from a ready-made initial state
    pub fn new(initial: T) -> Self {
        Self::create(|_, _| initial)
    }

    /// The current state
    pub fn get(&self) -> Arc<T> {
        self.inner.get()
    }

    /// The current state, for the rendering side
    ///
    /// Same value as [`get`](Self::get). Pair it with a subscription (or use
    /// [`view`](Self::view)) to re-read on every notification.
    pub fn read(&self) -> Arc<T> {
        self.inner.get()
    }

    /// Merge a partial update and notify every listener
    pub fn set(&self, partial: PartialState<T>) {
        self.inner.set(partial);
    }

    /// Merge a literal partial record
    pub fn merge(&self, partial: T::Partial) {
        self.inner.set(PartialState::Literal(partial));
    }

    /// Merge a partial record computed from the live state
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T::Partial + Send + 'static,
    {
        self.inner.set(PartialState::computed(f));
    }

    /// Register a listener for future commits
    ///
    /// Subscribing a listener that is already registered is a no-op and
    /// returns a handle to the existing entry.
    pub fn subscribe(&self, listener: Listener<T>) -> Unsubscribe {
        self.inner.subscribe(listener)
    }

    /// A bound `set` handle, e.g. for another store's actions
    pub fn setter(&self) -> SetState<T> {
        SetState {
            bound: self.bound(),
        }
    }

    /// A bound `get` handle, e.g. for cross-store reads
    pub fn getter(&self) -> GetState<T> {
        GetState {
            bound: self.bound(),
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    /// Number of commits since construction
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::SeqCst)
    }

    fn bound(&self) -> Bound<T> {
        Bound {
            inner: Arc::downgrade(&self.inner),
            ready: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl<T: State> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: State> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &std::any::type_name::<T>())
            .field("version", &self.version())
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

// ============================================================================
// Bound handles
// ============================================================================

struct Bound<T: State> {
    inner: Weak<Inner<T>>,
    ready: Arc<AtomicBool>,
}

impl<T: State> Bound<T> {
    fn upgrade(&self) -> Result<Arc<Inner<T>>> {
        match self.inner.upgrade() {
            Some(inner) => Ok(inner),
            None if self.ready.load(Ordering::Acquire) => Err(StoreError::Dropped),
            None => Err(StoreError::Uninitialized),
        }
    }
}

impl<T: State> Clone for Bound<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            ready: Arc::clone(&self.ready),
        }
    }
}

/// The `set` operation bound to one store
///
/// Fails only when used before the store finished construction or after
/// every [`Store`] handle is gone.
pub struct SetState<T: State> {
    bound: Bound<T>,
}

impl<T: State> SetState<T> {
    /// Merge a partial update and notify every listener
    pub fn set(&self, partial: PartialState<T>) -> Result<()> {
        self.bound.upgrade()?.set(partial);
        Ok(())
    }

    /// Merge a literal partial record
    pub fn merge(&self, partial: T::Partial) -> Result<()> {
        self.set(PartialState::Literal(partial))
    }

    /// Merge a partial record computed from the live state
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&T) -> T::Partial + Send + 'static,
    {
        self.set(PartialState::computed(f))
    }
}

impl<T: State> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            bound: self.bound.clone(),
        }
    }
}

impl<T: State> fmt::Debug for SetState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SetState<{}>", std::any::type_name::<T>())
    }
}

/// The `get` operation bound to one store
pub struct GetState<T: State> {
    bound: Bound<T>,
}

impl<T: State> GetState<T> {
    /// The current state of the bound store
    pub fn get(&self) -> Result<Arc<T>> {
        Ok(self.bound.upgrade()?.get())
    }
}

impl<T: State> Clone for GetState<T> {
    fn clone(&self) -> Self {
        Self {
            bound: self.bound.clone(),
        }
    }
}

impl<T: State> fmt::Debug for GetState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GetState<{}>", std::any::type_name::<T>())
    }
}
