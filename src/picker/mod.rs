//! Picker facade: binds one [`PlaceSessionStore`] to the picker's visibility
//! lifecycle and owns the timing concerns the store leaves out.
//!
//! The facade keeps no session state of its own. It listens to the store's
//! [`SessionEvent`] channel to reschedule the search debounce on query
//! changes and to run the one-time hydration when suggestions for the
//! initial selection arrive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::projection;
use crate::services::PlaceServices;
use crate::session::{PlaceSession, PlaceSessionStore, QueryOrigin, SessionEvent};
use crate::{ConfirmedSelection, Coordinates, PlaceSelection, PlaceSuggestion};

mod debounce;


use debounce::Debouncer;

/// Runtime knobs of a picker, usually built from [`crate::config::schema::Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct PickerSettings {
    /// Quiet period after the last query change before a search is issued.
    pub search_debounce: Duration,
    /// Map-tap suppression window armed by a suggestion touch.
    pub interaction_guard: Duration,
    /// Area label used on confirm when no area was resolved.
    pub not_selected_label: String,
    /// Point the session starts at when the caller has none.
    pub default_location: Coordinates,
}

impl Default for PickerSettings {
    fn default() -> Self {
        Self {
            search_debounce: Duration::from_millis(350),
            interaction_guard: Duration::from_millis(350),
            not_selected_label: "Not selected".to_string(),
            default_location: Coordinates::DEFAULT_ORIGIN,
        }
    }
}

/// Inputs for opening the picker.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenRequest {
    pub initial_coordinates: Coordinates,
    /// Place stored by an earlier confirm, if the caller is editing one.
    pub initial_selection: Option<PlaceSelection>,
    /// Opens the info sheet immediately and enables hydration.
    pub show_place_info_initially: bool,
}

impl OpenRequest {
    /// Request for a fresh pick starting at `coordinates`.
    pub fn at(coordinates: Coordinates) -> Self {
        Self {
            initial_coordinates: coordinates,
            initial_selection: None,
            show_place_info_initially: false,
        }
    }

    /// Request that reopens a stored selection with its info sheet shown.
    pub fn reopen(selection: PlaceSelection) -> Self {
        Self {
            initial_coordinates: selection.coordinates,
            initial_selection: Some(selection),
            show_place_info_initially: true,
        }
    }
}

/// One picker instance.
///
/// Construct one per picker invocation; separate pickers never share
/// generation counters. Must be used from within a tokio runtime.
pub struct PlacePicker {
    store: PlaceSessionStore,
    settings: PickerSettings,
    debouncer: Arc<Debouncer>,
    visible: AtomicBool,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for PlacePicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacePicker")
            .field("visible", &self.is_visible())
            .field("settings", &self.settings)
            .finish()
    }
}

impl PlacePicker {
    pub fn new(services: Arc<dyn PlaceServices>, settings: PickerSettings) -> Self {
        let store = PlaceSessionStore::new(services, settings.default_location);
        Self {
            store,
            debouncer: Arc::new(Debouncer::new(settings.search_debounce)),
            settings,
            visible: AtomicBool::new(false),
            listener: Mutex::new(None),
        }
    }

    /// Underlying store, for callers that need the full command surface.
    pub fn store(&self) -> &PlaceSessionStore {
        &self.store
    }

    pub fn settings(&self) -> &PickerSettings {
        &self.settings
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    /// Shows the picker and starts a new session.
    ///
    /// Only the hidden-to-visible transition initializes; calling `open`
    /// again while visible returns `None` and leaves the session alone.
    /// The returned handle resolves once the initial location and address
    /// work has settled.
    pub fn open(&self, request: OpenRequest) -> Option<JoinHandle<()>> {
        if self.visible.swap(true, Ordering::SeqCst) {
            debug!("picker already visible, keeping session");
            return None;
        }
        self.ensure_listener();
        info!("opening place picker");
        let store = self.store.clone();
        Some(tokio::spawn(async move {
            store
                .initialize_session(
                    request.initial_coordinates,
                    request.initial_selection,
                    request.show_place_info_initially,
                )
                .await;
        }))
    }

    /// Hides the picker. UI flags are reset; the rest of the session stays.
    pub fn close(&self) {
        if !self.visible.swap(false, Ordering::SeqCst) {
            return;
        }
        self.debouncer.cancel();
        self.store.hide_search_ui();
        self.store.hide_place_info_sheet();
        info!("place picker closed");
    }

    /// Subscribes before spawning so no event emitted by `open` is missed.
    fn ensure_listener(&self) {
        let mut listener = self.listener.lock();
        if listener.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        let rx = self.store.subscribe();
        *listener = Some(tokio::spawn(run_listener(
            self.store.clone(),
            Arc::clone(&self.debouncer),
            rx,
        )));
    }

    // -- Read surface -------------------------------------------------------

    pub fn snapshot(&self) -> PlaceSession {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.store.subscribe()
    }

    /// Host label of the selected place's website, without `www.`.
    pub fn website_label(&self) -> Option<String> {
        self.store
            .read(|s| s.website_uri.as_deref().and_then(projection::website_label))
    }

    /// Banner text explaining why search is unavailable.
    pub fn capability_banner(&self) -> Option<&'static str> {
        self.store.read(|s| s.api_status.banner())
    }

    pub fn is_search_enabled(&self) -> bool {
        self.store.read(|s| s.api_status.is_search_enabled())
    }

    pub fn is_suggestion_panel_visible(&self) -> bool {
        self.store.read(PlaceSession::is_suggestion_panel_visible)
    }

    pub fn is_busy(&self) -> bool {
        self.store.read(PlaceSession::is_busy)
    }

    // -- Commands -----------------------------------------------------------

    /// Stores the query; the search runs once typing pauses.
    ///
    /// The timer is armed here rather than from the event channel, which
    /// may drop events under load.
    pub fn set_search_query(&self, query: &str) {
        self.store.set_search_query(query);
        on_query_changed(&self.store, &self.debouncer, query, QueryOrigin::User);
    }

    pub fn clear_search_query(&self) {
        self.set_search_query("");
    }

    pub fn select_suggestion(&self, suggestion: PlaceSuggestion) -> JoinHandle<()> {
        let store = self.store.clone();
        tokio::spawn(async move { store.select_suggestion(suggestion).await })
    }

    pub fn use_current_location(&self) -> JoinHandle<()> {
        let store = self.store.clone();
        tokio::spawn(async move { store.use_current_location().await })
    }

    pub fn place_pin(&self, coordinates: Coordinates) -> JoinHandle<()> {
        let store = self.store.clone();
        tokio::spawn(async move { store.place_pin(coordinates).await })
    }

    /// Value handed back to the caller on confirm.
    pub fn confirm(&self) -> ConfirmedSelection {
        self.store
            .build_confirm_selection(&self.settings.not_selected_label)
    }

    pub fn show_place_info_sheet(&self) {
        self.store.show_place_info_sheet();
    }

    pub fn hide_place_info_sheet(&self) {
        self.store.hide_place_info_sheet();
    }

    pub fn focus_search(&self) {
        self.store.focus_search();
    }

    pub fn blur_search(&self) {
        self.store.blur_search();
    }

    pub fn submit_search(&self) {
        self.store.submit_search();
    }

    pub fn clear_search_overlay(&self) {
        self.store.clear_search_overlay();
    }

    pub fn hide_search_ui(&self) {
        self.store.hide_search_ui();
    }

    pub fn set_map_error(&self, message: Option<String>) {
        self.store.set_map_error(message);
    }

    /// Arms the interaction guard now, for the configured window.
    pub fn arm_suggestion_interaction_guard(&self) {
        self.arm_suggestion_interaction_guard_at(now_ms());
    }

    pub fn arm_suggestion_interaction_guard_at(&self, now_ms: i64) {
        let window = i64::try_from(self.settings.interaction_guard.as_millis()).unwrap_or(i64::MAX);
        self.store.arm_suggestion_interaction_guard(now_ms, window);
    }

    pub fn should_ignore_map_tap(&self) -> bool {
        self.store.should_ignore_map_tap(now_ms())
    }

    pub fn should_ignore_map_tap_at(&self, now_ms: i64) -> bool {
        self.store.should_ignore_map_tap(now_ms)
    }
}

impl Drop for PlacePicker {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.get_mut().take() {
            listener.abort();
        }
        self.debouncer.cancel();
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

async fn run_listener(
    store: PlaceSessionStore,
    debouncer: Arc<Debouncer>,
    mut rx: broadcast::Receiver<SessionEvent>,
) {
    loop {
        match rx.recv().await {
            Ok(SessionEvent::SearchQueryChanged { query, origin }) => {
                on_query_changed(&store, &debouncer, &query, origin);
            }
            Ok(SessionEvent::SuggestionsLoaded { query, .. }) => {
                if let Some(top) = hydration_candidate(&store, &query) {
                    info!("hydrating initial selection from {}", top.place_id);
                    let store = store.clone();
                    tokio::spawn(async move { store.select_suggestion(top).await });
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!("picker listener lagged, skipped {} session events", skipped);
                resync_debounce(&store, &debouncer);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Reschedules or cancels the debounce for a query change.
///
/// A change whose query no longer matches the session is ignored: a newer
/// change has already been handled or is still queued.
fn on_query_changed(
    store: &PlaceSessionStore,
    debouncer: &Debouncer,
    query: &str,
    origin: QueryOrigin,
) {
    if store.read(|s| s.search_query != query) {
        debug!("ignoring superseded query change {:?}", query);
        return;
    }
    match origin {
        QueryOrigin::User | QueryOrigin::Session if !query.trim().is_empty() => {
            let store = store.clone();
            debouncer.schedule(async move { store.search_suggestions_debounced().await });
        }
        _ => {
            debouncer.cancel();
        }
    }
}

/// Re-derives the timer from the current query after missed events.
fn resync_debounce(store: &PlaceSessionStore, debouncer: &Debouncer) {
    let query = store.read(|s| s.search_query.clone());
    on_query_changed(store, debouncer, &query, QueryOrigin::User);
}

/// Returns the suggestion to auto-select, claiming the one-time hydration.
fn hydration_candidate(store: &PlaceSessionStore, loaded_query: &str) -> Option<PlaceSuggestion> {
    let top = store.read(|s| {
        let target = s.initial_selection_query.as_deref()?.trim();
        if s.did_hydrate_from_initial_selection
            || loaded_query.trim() != target
            || s.search_query.trim() != target
        {
            return None;
        }
        s.suggestions.first().cloned()
    })?;
    store.mark_hydrated().then_some(top)
}
