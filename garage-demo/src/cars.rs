//! Car counter store, gated on the user store

use state_store::{define_state, Action, GetState, Store};

use crate::user::UserState;

define_state! {
    /// How many cars have been added, plus the actions that change it
    pub struct CarsState {
        pub cars: u32,
        pub increment: Action,
        pub clear: Action,
    }
}

/// Create the cars store
///
/// `increment` only counts while someone is signed in to `users`; the user
/// is read at the moment the update is applied. `clear` resets to zero
/// unconditionally.
pub fn create_cars_store(users: &Store<UserState>) -> Store<CarsState> {
    let users = users.getter();

    Store::<CarsState>::create(move |set, _get| {
        let set_increment = set.clone();
        CarsState {
            cars: 0,
            increment: Action::new("increment", move || {
                let users = users.clone();
                set_increment.update(move |state: &CarsState| increment_if_logged_in(state, &users))
            }),
            clear: Action::new("clear", move || set.merge(CarsStatePartial::default().cars(0))),
        }
    })
}

fn increment_if_logged_in(state: &CarsState, users: &GetState<UserState>) -> CarsStatePartial {
    match users.get() {
        Ok(session) if session.is_logged_in() => CarsStatePartial::default().cars(state.cars + 1),
        Ok(_) => {
            tracing::debug!("Ignoring increment while signed out");
            CarsStatePartial::default()
        }
        Err(e) => {
            tracing::warn!("User store unavailable, treating as signed out: {}", e);
            CarsStatePartial::default()
        }
    }
}
