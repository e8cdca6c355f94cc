//! Application wiring: the stores, the events that drive them, and a panel
//! that renders them

use std::fmt;
use std::str::FromStr;

use state_store::{Store, StoreView};
use thiserror::Error;

use crate::cars::{create_cars_store, CarsState};
use crate::user::{create_user_store, UserState};

/// External events a consumer can trigger (button clicks in a UI)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Login,
    Logout,
    Increment,
    Clear,
}

impl Event {
    pub const ALL: [Event; 4] = [Event::Login, Event::Logout, Event::Increment, Event::Clear];

    pub fn as_str(&self) -> &'static str {
        match self {
            Event::Login => "login",
            Event::Logout => "logout",
            Event::Increment => "increment",
            Event::Clear => "clear",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown event '{0}' (expected one of: login, logout, increment, clear)")]
pub struct ParseEventError(pub String);

impl FromStr for Event {
    type Err = ParseEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Event::ALL
            .into_iter()
            .find(|event| event.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEventError(s.to_string()))
    }
}

/// Both application stores, built once at start-up
///
/// Handles are cheap to clone; pass them to whatever needs to read or write.
#[derive(Debug, Clone)]
pub struct Garage {
    pub users: Store<UserState>,
    pub cars: Store<CarsState>,
}

impl Garage {
    pub fn new() -> Self {
        let users = create_user_store();
        let cars = create_cars_store(&users);
        Self { users, cars }
    }

    /// Run the store action wired to `event`
    pub fn dispatch(&self, event: Event) -> state_store::Result<()> {
        tracing::info!(%event, "Dispatching event");
        match event {
            Event::Login => self.users.get().login.call(),
            Event::Logout => self.users.get().logout.call(),
            Event::Increment => self.cars.get().increment.call(),
            Event::Clear => self.cars.get().clear.call(),
        }
    }

    /// Mount a panel observing both stores
    pub fn mount_panel(&self) -> Panel {
        Panel {
            users: self.users.view(),
            cars: self.cars.view(),
        }
    }
}

impl Default for Garage {
    fn default() -> Self {
        Self::new()
    }
}

/// A mounted consumer: one view (and so one listener) per store
pub struct Panel {
    users: StoreView<UserState>,
    cars: StoreView<CarsState>,
}

impl Panel {
    /// Whether either store committed since the last render
    pub fn needs_redraw(&self) -> bool {
        self.users.has_changed() || self.cars.has_changed()
    }

    /// Render the panel, clearing the redraw flag
    pub fn render(&self) -> String {
        // Clear both flags; `||` would short-circuit the second
        let _ = self.users.take_changed() | self.cars.take_changed();

        let session = self.users.current();
        let cars = self.cars.current();
        let who = session.user.as_deref().unwrap_or("nobody");
        format!("cars: {} | signed in: {}", cars.cars, who)
    }
}
