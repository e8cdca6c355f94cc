//! User session store

use state_store::{define_state, Action, Store};

/// The user `login` signs in as
pub const DEFAULT_USER: &str = "n.elyousfi";

define_state! {
    /// Who is signed in, plus the actions that change it
    pub struct UserState {
        /// `None` while signed out
        pub user: Option<String>,
        pub login: Action,
        pub logout: Action,
    }
}

impl UserState {
    /// Signed in means a non-empty user name; `Some("")` counts as signed out
    pub fn is_logged_in(&self) -> bool {
        self.user.as_deref().is_some_and(|user| !user.is_empty())
    }
}

/// Create the user store, initially signed out
pub fn create_user_store() -> Store<UserState> {
    Store::<UserState>::create(|set, _get| {
        let set_login = set.clone();
        UserState {
            user: None,
            login: Action::new("login", move || {
                tracing::debug!(user = DEFAULT_USER, "Logging in");
                set_login.merge(UserStatePartial::default().user(Some(DEFAULT_USER.to_string())))
            }),
            logout: Action::new("logout", move || {
                tracing::debug!("Logging out");
                set.merge(UserStatePartial::default().user(None))
            }),
        }
    })
}
