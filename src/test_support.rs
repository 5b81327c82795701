//! Scripted collaborator doubles for store and picker tests.
//!
//! Each collaborator call pops the next queued response. A response may be
//! gated: the call then waits until the returned `oneshot::Sender` fires (or
//! is dropped), which lets a test hold one request open while others run.
//! Calls are recorded so tests can assert how often the backend was hit.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::{GeocodeError, PlacesError};
use crate::services::PlaceServices;
use crate::{
    ApiStatus, AreaResolution, Coordinates, LocationCapture, PlaceDetails, PlaceSelection,
    PlaceSuggestion,
};

struct Scripted<T> {
    value: T,
    gate: Option<oneshot::Receiver<()>>,
}

impl<T> Scripted<T> {
    async fn resolve(self) -> T {
        if let Some(gate) = self.gate {
            let _ = gate.await;
        }
        self.value
    }
}

fn pop<T>(queue: &Mutex<VecDeque<Scripted<T>>>) -> Option<Scripted<T>> {
    queue.lock().pop_front()
}

fn push<T>(queue: &Mutex<VecDeque<Scripted<T>>>, value: T) {
    queue.lock().push_back(Scripted { value, gate: None });
}

fn push_gated<T>(queue: &Mutex<VecDeque<Scripted<T>>>, value: T) -> oneshot::Sender<()> {
    let (tx, rx) = oneshot::channel();
    queue.lock().push_back(Scripted {
        value,
        gate: Some(rx),
    });
    tx
}

/// [`PlaceServices`] answering from per-call queues.
///
/// Unscripted calls fall back to: location error, geocode failure, empty
/// search results, details `RequestFailed`.
pub(crate) struct ScriptedServices {
    api_status: Mutex<ApiStatus>,
    locations: Mutex<VecDeque<Scripted<LocationCapture>>>,
    geocodes: Mutex<VecDeque<Scripted<Result<AreaResolution, GeocodeError>>>>,
    searches: Mutex<VecDeque<Scripted<Result<Vec<PlaceSuggestion>, PlacesError>>>>,
    details: Mutex<VecDeque<Scripted<Result<PlaceDetails, PlacesError>>>>,
    search_calls: Mutex<Vec<String>>,
    details_calls: Mutex<Vec<String>>,
    geocode_calls: Mutex<Vec<Coordinates>>,
    location_calls: Mutex<usize>,
}

impl ScriptedServices {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            api_status: Mutex::new(ApiStatus::SearchEnabled),
            locations: Mutex::default(),
            geocodes: Mutex::default(),
            searches: Mutex::default(),
            details: Mutex::default(),
            search_calls: Mutex::default(),
            details_calls: Mutex::default(),
            geocode_calls: Mutex::default(),
            location_calls: Mutex::new(0),
        })
    }

    pub(crate) fn set_api_status(&self, status: ApiStatus) {
        *self.api_status.lock() = status;
    }

    pub(crate) fn push_location(&self, capture: LocationCapture) {
        push(&self.locations, capture);
    }

    pub(crate) fn push_location_gated(&self, capture: LocationCapture) -> oneshot::Sender<()> {
        push_gated(&self.locations, capture)
    }

    pub(crate) fn push_geocode(&self, result: Result<AreaResolution, GeocodeError>) {
        push(&self.geocodes, result);
    }

    pub(crate) fn push_geocode_gated(
        &self,
        result: Result<AreaResolution, GeocodeError>,
    ) -> oneshot::Sender<()> {
        push_gated(&self.geocodes, result)
    }

    pub(crate) fn push_search(&self, result: Result<Vec<PlaceSuggestion>, PlacesError>) {
        push(&self.searches, result);
    }

    pub(crate) fn push_search_gated(
        &self,
        result: Result<Vec<PlaceSuggestion>, PlacesError>,
    ) -> oneshot::Sender<()> {
        push_gated(&self.searches, result)
    }

    pub(crate) fn push_details(&self, result: Result<PlaceDetails, PlacesError>) {
        push(&self.details, result);
    }

    pub(crate) fn push_details_gated(
        &self,
        result: Result<PlaceDetails, PlacesError>,
    ) -> oneshot::Sender<()> {
        push_gated(&self.details, result)
    }

    pub(crate) fn search_calls(&self) -> Vec<String> {
        self.search_calls.lock().clone()
    }

    pub(crate) fn details_calls(&self) -> Vec<String> {
        self.details_calls.lock().clone()
    }

    pub(crate) fn geocode_calls(&self) -> Vec<Coordinates> {
        self.geocode_calls.lock().clone()
    }

    pub(crate) fn location_calls(&self) -> usize {
        *self.location_calls.lock()
    }
}

#[async_trait]
impl PlaceServices for ScriptedServices {
    async fn capture_current_location(&self) -> LocationCapture {
        *self.location_calls.lock() += 1;
        match pop(&self.locations) {
            Some(scripted) => scripted.resolve().await,
            None => LocationCapture::Error {
                message: "no location scripted".to_string(),
            },
        }
    }

    async fn reverse_geocode_to_area(
        &self,
        coordinates: Coordinates,
    ) -> Result<AreaResolution, GeocodeError> {
        self.geocode_calls.lock().push(coordinates);
        match pop(&self.geocodes) {
            Some(scripted) => scripted.resolve().await,
            None => Err(GeocodeError::Failed("no geocode scripted".to_string())),
        }
    }

    async fn search_places(&self, query: &str) -> Result<Vec<PlaceSuggestion>, PlacesError> {
        self.search_calls.lock().push(query.to_string());
        match pop(&self.searches) {
            Some(scripted) => scripted.resolve().await,
            None => Ok(Vec::new()),
        }
    }

    async fn get_place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        self.details_calls.lock().push(place_id.to_string());
        match pop(&self.details) {
            Some(scripted) => scripted.resolve().await,
            None => Err(PlacesError::RequestFailed("no details scripted".to_string())),
        }
    }

    fn initial_places_api_status(&self) -> ApiStatus {
        *self.api_status.lock()
    }
}

/// Lets spawned tasks run until they block.
pub(crate) async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Polls `condition` while yielding, failing after a generous bound.
pub(crate) async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("condition not met in time");
}

pub(crate) fn point(latitude: f64, longitude: f64) -> Coordinates {
    Coordinates::new(latitude, longitude).expect("test coordinates are valid")
}

pub(crate) fn granted(latitude: f64, longitude: f64) -> LocationCapture {
    LocationCapture::Granted {
        coordinates: point(latitude, longitude),
        city_area: "Chiyoda".to_string(),
        address_line: None,
    }
}

pub(crate) fn suggestion(id: &str, primary: &str, secondary: Option<&str>) -> PlaceSuggestion {
    PlaceSuggestion {
        place_id: id.to_string(),
        primary_text: primary.to_string(),
        secondary_text: secondary.map(str::to_string),
    }
}

pub(crate) fn details(id: &str, name: &str, address: &str, lat: f64, lng: f64) -> PlaceDetails {
    PlaceDetails {
        place_id: id.to_string(),
        name: Some(name.to_string()),
        address: Some(address.to_string()),
        website_uri: Some(format!("https://www.{id}.example.com/")),
        latitude: lat,
        longitude: lng,
    }
}

pub(crate) fn area(city_area: &str, address: Option<&str>) -> AreaResolution {
    AreaResolution {
        city_area: city_area.to_string(),
        address_line: address.map(str::to_string),
    }
}

pub(crate) fn stored_selection(name: &str, address: Option<&str>, area: Option<&str>) -> PlaceSelection {
    PlaceSelection {
        coordinates: point(35.658, 139.698),
        city_area: area.map(str::to_string),
        address_line: address.map(str::to_string),
        suggested_store_name: Some(name.to_string()),
    }
}

/// Runs `f` with environment variables temporarily set, then restores them.
///
/// Callers must be `#[serial]`.
pub(crate) fn with_env<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
    let originals: Vec<_> = vars
        .iter()
        .map(|(k, _)| (*k, std::env::var(k).ok()))
        .collect();

    for (k, v) in vars {
        match v {
            Some(val) => std::env::set_var(k, val),
            None => std::env::remove_var(k),
        }
    }

    f();

    for (k, original) in &originals {
        match original {
            Some(val) => std::env::set_var(k, val),
            None => std::env::remove_var(k),
        }
    }
}
