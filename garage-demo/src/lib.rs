//! Garage: two cooperating stores
//!
//! - [`user`]: who is signed in, with `login`/`logout` actions
//! - [`cars`]: a car counter whose `increment` only counts while someone is
//!   signed in, read from the user store at update time
//! - [`garage`]: start-up wiring, the event enum, and a render panel

pub mod cars;
pub mod garage;
pub mod user;

pub use cars::{create_cars_store, CarsState, CarsStatePartial};
pub use garage::{Event, Garage, Panel, ParseEventError};
pub use user::{create_user_store, UserState, UserStatePartial, DEFAULT_USER};
