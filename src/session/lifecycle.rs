//! Session start and device location operations.

use tracing::{debug, info, warn};

use super::{OperationClass, PlaceSession, PlaceSessionStore, QueryOrigin, SessionEvent, Ticket};
use crate::place::non_blank;
use crate::projection::build_selection_query;
use crate::{Coordinates, LocationCapture, PlaceSelection};

impl PlaceSessionStore {
    /// Replaces the session with a fresh one seeded from the inputs.
    ///
    /// Then, concurrently:
    /// - requests a device fix and records it in
    ///   `current_location_coordinates` (the selected point is left alone);
    /// - if `initial_selection` lacks an area or address, reverse-geocodes its
    ///   point to fill the gaps.
    ///
    /// Without an initial selection, area, address and name are cleared again
    /// once the location step settles. Every write after an await is dropped
    /// if another `initialize_session` started in the meantime. Starting a
    /// session also invalidates in-flight search, selection and locate
    /// results from the previous one.
    ///
    /// When `show_place_info_initially` is set together with a selection, the
    /// query derived from the selection is written to `search_query` and
    /// remembered as `initial_selection_query` for one-time hydration.
    pub async fn initialize_session(
        &self,
        initial_coordinates: Coordinates,
        initial_selection: Option<PlaceSelection>,
        show_place_info_initially: bool,
    ) {
        let api_status = self.services().initial_places_api_status();
        let has_selection = initial_selection.is_some();
        let resolve_point = initial_selection
            .as_ref()
            .filter(|s| s.needs_address_resolution())
            .map(|s| s.coordinates);
        let hydration_query = initial_selection
            .as_ref()
            .filter(|_| show_place_info_initially)
            .map(build_selection_query)
            .filter(|q| !q.is_empty());

        let (session_ticket, selection_ticket, query) = self.update(|session, generations| {
            let session_ticket = generations.advance(OperationClass::Session);
            generations.advance(OperationClass::Search);
            let selection_ticket = generations.advance(OperationClass::Selection);
            generations.advance(OperationClass::Locate);

            let coordinates = initial_selection
                .as_ref()
                .map_or(initial_coordinates, |s| s.coordinates);
            let mut fresh = PlaceSession::new(api_status, coordinates);
            if let Some(selection) = initial_selection {
                fresh.city_area = non_blank(selection.city_area);
                fresh.address_line = non_blank(selection.address_line);
                fresh.suggested_store_name = non_blank(selection.suggested_store_name);
            }
            fresh.is_place_info_visible = show_place_info_initially;
            fresh.initial_selection_query = hydration_query;
            if api_status.is_search_enabled() {
                if let Some(query) = &fresh.initial_selection_query {
                    fresh.search_query = query.clone();
                }
            }
            fresh.is_initializing_location = true;
            fresh.is_resolving_address = resolve_point.is_some();
            let query = fresh.search_query.clone();
            *session = fresh;
            (session_ticket, selection_ticket, query)
        });

        info!(
            "place session started (generation {}, search {:?})",
            session_ticket.generation(),
            api_status
        );
        self.emit(SessionEvent::Initialized);
        if !query.is_empty() {
            self.emit(SessionEvent::SearchQueryChanged {
                query,
                origin: QueryOrigin::Session,
            });
        }

        tokio::join!(
            self.settle_initial_location(session_ticket, selection_ticket, has_selection),
            self.resolve_initial_address(session_ticket, selection_ticket, resolve_point),
        );
    }

    async fn settle_initial_location(
        &self,
        session_ticket: Ticket,
        selection_ticket: Ticket,
        has_selection: bool,
    ) {
        let capture = self.services().capture_current_location().await;
        let committed = self.commit(&[session_ticket], |session, generations| {
            record_capture(session, capture);
            // A pick made while the fix was pending owns these fields now.
            if !has_selection && generations.is_current(&selection_ticket) {
                session.city_area = None;
                session.address_line = None;
                session.suggested_store_name = None;
            }
            session.is_initializing_location = false;
        });
        if committed {
            self.emit(SessionEvent::LocationUpdated);
        }
    }

    async fn resolve_initial_address(
        &self,
        session_ticket: Ticket,
        selection_ticket: Ticket,
        point: Option<Coordinates>,
    ) {
        let Some(point) = point else {
            return;
        };
        let resolved = match self.services().reverse_geocode_to_area(point).await {
            Ok(area) => Some(area),
            Err(e) => {
                warn!("initial address resolution failed: {}", e);
                None
            }
        };
        let committed = self.commit(&[session_ticket, selection_ticket], |session, _| {
            if let Some(area) = resolved {
                if session.city_area.is_none() {
                    session.city_area = non_blank(Some(area.city_area));
                }
                if session.address_line.is_none() {
                    session.address_line = non_blank(area.address_line);
                }
            }
            session.is_resolving_address = false;
        });
        if committed {
            self.emit(SessionEvent::SelectionResolved);
        }
    }

    /// Captures the device location into `current_location_coordinates`.
    ///
    /// Denial and failure only set `location_status_message`. Only the most
    /// recent call commits.
    pub async fn use_current_location(&self) {
        let ticket = self.begin(OperationClass::Locate, |session| {
            session.is_locating_current = true;
            session.location_status_message = None;
        });

        let capture = self.services().capture_current_location().await;
        let committed = self.commit(&[ticket], |session, _| {
            record_capture(session, capture);
            session.is_locating_current = false;
        });
        if committed {
            self.emit(SessionEvent::LocationUpdated);
        }
    }
}

fn record_capture(session: &mut PlaceSession, capture: LocationCapture) {
    match capture {
        LocationCapture::Granted { coordinates, .. } => {
            debug!("device location fix at {}", coordinates);
            session.current_location_coordinates = Some(coordinates);
            session.location_status_message = None;
        }
        LocationCapture::Denied { message } => {
            info!("device location denied: {}", message);
            session.location_status_message = Some(message);
        }
        LocationCapture::Error { message } => {
            warn!("device location failed: {}", message);
            session.location_status_message = Some(message);
        }
    }
}
