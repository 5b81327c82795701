//! External collaborators consumed by the session store.
//!
//! The store only ever talks to the outside world through [`PlaceServices`]:
//! device location, reverse geocoding, place search, place details and the
//! synchronous capability probe. Implementations decide their own timeouts;
//! the store never cancels an in-flight call, it only ignores stale results.

use async_trait::async_trait;

use crate::error::{GeocodeError, PlacesError};
use crate::{
    ApiStatus, AreaResolution, Coordinates, LocationCapture, PlaceDetails, PlaceSuggestion,
};

/// File-backed services for the CLI and integration tests.
pub mod fixture;

pub use fixture::FixtureServices;

/// Injected place, geocoding and location operations.
#[async_trait]
pub trait PlaceServices: Send + Sync {
    /// Captures a device location fix. Denial and failure are outcomes, not errors.
    async fn capture_current_location(&self) -> LocationCapture;

    /// Resolves the area (and optionally a street address) around a point.
    async fn reverse_geocode_to_area(
        &self,
        coordinates: Coordinates,
    ) -> Result<AreaResolution, GeocodeError>;

    /// Text search returning ordered candidates.
    async fn search_places(&self, query: &str) -> Result<Vec<PlaceSuggestion>, PlacesError>;

    /// Full details for a candidate.
    async fn get_place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError>;

    /// Capability probe evaluated when a session starts.
    fn initial_places_api_status(&self) -> ApiStatus;
}
