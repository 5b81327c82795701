//! Place resolution session controller.
//!
//! Drives one "pick a place" interaction: the user types a query, sees
//! debounced suggestions, taps one (or drops a pin), and confirms a resolved
//! location with area, address and store name. All network and device work
//! goes through an injected [`services::PlaceServices`]; this crate owns the
//! session state and the rules that keep late, stale results out of it.
//!
//! - [`session::PlaceSessionStore`] holds the session record and its
//!   race-safe operations.
//! - [`picker::PlacePicker`] binds a store to the picker's open/close
//!   lifecycle and owns the search debounce and one-time hydration.
//! - [`projection`] has the pure text helpers.
//! - [`config`] and [`logging`] serve the `place-picker` binary.

pub mod config;
pub mod error;
pub mod logging;
pub mod picker;
pub mod projection;
pub mod services;
pub mod session;

mod place;

pub use error::{CoordinateError, GeocodeError, PlacesError};
pub use place::{
    ApiStatus, AreaResolution, ConfirmedSelection, Coordinates, LocationCapture, PinOnlyReason,
    PlaceDetails, PlaceSelection, PlaceSuggestion,
};
pub use picker::{OpenRequest, PickerSettings, PlacePicker};
pub use session::{PlaceSession, PlaceSessionStore, SessionEvent};

#[cfg(test)]
pub(crate) mod test_support;
