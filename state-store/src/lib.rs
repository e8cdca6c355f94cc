//! Observable State Stores
//!
//! A small, synchronous primitive for shared, mutable application state:
//! create a store, read it, write to it with partial updates, and subscribe
//! to changes.
//!
//! # Features
//!
//! - **Shallow merge**: updates name only the fields they change; an explicit
//!   `None` on an optional field clears it
//! - **Computed updates**: derive the next partial state from the live state
//! - **Self-referential actions**: the initializer receives `set`/`get` bound
//!   to the store being built
//! - **Cross-store reads**: one store's action may read another's `get()`
//! - **Synchronous notification**: every commit reaches every listener before
//!   `set` returns; a panicking listener cannot starve the others
//!
//! # Quick Start
//!
//! ```rust
//! use state_store::{define_state, Action, Store};
//!
//! define_state! {
//!     pub struct UserState {
//!         pub user: Option<String>,
//!         pub login: Action,
//!     }
//! }
//!
//! define_state! {
//!     pub struct CarsState {
//!         pub cars: u32,
//!         pub increment: Action,
//!     }
//! }
//!
//! let users = Store::<UserState>::create(|set, _get| UserState {
//!     user: None,
//!     login: Action::new("login", move || {
//!         set.merge(UserStatePartial::default().user(Some("n.elyousfi".to_string())))
//!     }),
//! });
//!
//! let current_user = users.getter();
//! let cars = Store::<CarsState>::create(move |set, _get| CarsState {
//!     cars: 0,
//!     increment: Action::new("increment", move || {
//!         let logged_in = current_user.get()?.user.is_some();
//!         set.update(move |s: &CarsState| {
//!             if logged_in {
//!                 CarsStatePartial::default().cars(s.cars + 1)
//!             } else {
//!                 CarsStatePartial::default()
//!             }
//!         })
//!     }),
//! });
//!
//! cars.get().increment.call().unwrap();
//! assert_eq!(cars.get().cars, 0);
//!
//! users.get().login.call().unwrap();
//! cars.get().increment.call().unwrap();
//! assert_eq!(cars.get().cars, 1);
//! ```
//!
//! # Architecture
//!
//! ```text
//! Store<T>
//!     │
//!     ├── state: Arc<T>                replaced on every commit
//!     │
//!     ├── listeners: ListenerRegistry  insertion-ordered, identity-keyed
//!     │       │
//!     │       ├── StoreView<T>         cached copy + redraw flag
//!     │       └── StateChanges<T>      mpsc-backed iterator
//!     │
//!     └── SetState<T> / GetState<T>    weak handles for actions
//! ```

// Modules
pub mod action;
pub mod changes;
pub mod error;
pub mod listener;
pub mod logging;
pub mod state;
pub mod store;
pub mod view;

// Re-exports - Public API
pub use action::Action;
pub use changes::{StateChange, StateChanges, TimeoutIter, TryIter};
pub use error::{Result, StoreError};
pub use listener::{listener, Listener, ListenerId, Unsubscribe};
pub use state::{PartialState, State};
pub use store::{GetState, SetState, Store};
pub use view::StoreView;

#[doc(hidden)]
pub mod __private {
    pub use paste::paste;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::action::Action;
    pub use crate::define_state;
    pub use crate::listener::{listener, Listener, Unsubscribe};
    pub use crate::state::{PartialState, State};
    pub use crate::store::{GetState, SetState, Store};
    pub use crate::view::StoreView;
}
