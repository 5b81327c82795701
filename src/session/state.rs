//! The session record and the change notifications published by the store.

use serde::Serialize;

use crate::{ApiStatus, Coordinates, PlaceSuggestion};

/// All state of one picker session.
///
/// Owned exclusively by [`PlaceSessionStore`](super::PlaceSessionStore);
/// readers get clones through `snapshot()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceSession {
    /// Search capability. Only ever downgrades within a session.
    pub api_status: ApiStatus,
    /// Currently selected point.
    pub coordinates: Coordinates,
    pub city_area: Option<String>,
    pub address_line: Option<String>,
    pub suggested_store_name: Option<String>,
    pub website_uri: Option<String>,
    /// Text typed by the user (or written by selection and hydration).
    pub search_query: String,
    /// Results of the latest issued search.
    pub suggestions: Vec<PlaceSuggestion>,
    /// Set only while a details lookup for this candidate is in flight.
    pub selected_suggestion_id: Option<String>,
    /// Last known device fix.
    pub current_location_coordinates: Option<Coordinates>,

    pub is_initializing_location: bool,
    pub is_locating_current: bool,
    pub is_resolving_address: bool,
    pub is_search_loading: bool,

    pub location_status_message: Option<String>,
    pub search_error_message: Option<String>,
    pub map_error: Option<String>,

    /// Query derived from the initial selection when hydration is requested.
    pub initial_selection_query: Option<String>,
    /// Flips to `true` at most once per session.
    pub did_hydrate_from_initial_selection: bool,

    pub is_place_info_visible: bool,
    pub is_search_focused: bool,
    pub keep_suggestion_panel_visible: bool,
    pub suppress_next_search_blur: bool,
    /// Map taps before this instant (epoch milliseconds) are ignored.
    pub suppress_map_tap_until_ms: i64,
}

impl PlaceSession {
    /// A blank session at `coordinates`.
    pub fn new(api_status: ApiStatus, coordinates: Coordinates) -> Self {
        Self {
            api_status,
            coordinates,
            city_area: None,
            address_line: None,
            suggested_store_name: None,
            website_uri: None,
            search_query: String::new(),
            suggestions: Vec::new(),
            selected_suggestion_id: None,
            current_location_coordinates: None,
            is_initializing_location: false,
            is_locating_current: false,
            is_resolving_address: false,
            is_search_loading: false,
            location_status_message: None,
            search_error_message: None,
            map_error: None,
            initial_selection_query: None,
            did_hydrate_from_initial_selection: false,
            is_place_info_visible: false,
            is_search_focused: false,
            keep_suggestion_panel_visible: false,
            suppress_next_search_blur: false,
            suppress_map_tap_until_ms: 0,
        }
    }

    /// Returns `true` while any asynchronous operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.is_initializing_location
            || self.is_locating_current
            || self.is_resolving_address
            || self.is_search_loading
    }

    /// Whether the suggestion panel should be on screen.
    pub fn is_suggestion_panel_visible(&self) -> bool {
        if !self.api_status.is_search_enabled() {
            return false;
        }
        if !self.is_search_focused && !self.keep_suggestion_panel_visible {
            return false;
        }
        !self.suggestions.is_empty()
            || self.is_search_loading
            || self.search_error_message.is_some()
            || !self.search_query.trim().is_empty()
    }

    /// Drops suggestions and any search loading/error state.
    pub(crate) fn reset_search_results(&mut self) {
        self.suggestions.clear();
        self.is_search_loading = false;
        self.search_error_message = None;
    }

    /// Closes the search overlay flags.
    pub(crate) fn hide_search_flags(&mut self) {
        self.is_search_focused = false;
        self.keep_suggestion_panel_visible = false;
        self.suppress_next_search_blur = false;
    }
}

/// Who wrote the current query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOrigin {
    /// Typed or cleared by the user.
    User,
    /// Derived from the initial selection at session start.
    Session,
    /// Label of a resolved suggestion.
    Selection,
}

/// Change notification broadcast by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A new session replaced the previous record.
    Initialized,
    SearchQueryChanged {
        query: String,
        origin: QueryOrigin,
    },
    /// The latest search committed its results.
    SuggestionsLoaded { query: String, count: usize },
    /// The latest search failed without a capability downgrade.
    SearchFailed { query: String },
    CapabilityDowngraded(crate::PinOnlyReason),
    /// A suggestion selection or pin placement settled.
    SelectionResolved,
    /// Device location state settled.
    LocationUpdated,
    /// A synchronous UI flag changed.
    UiChanged,
}
