//! Suggestion selection, manual pins and one-time hydration.
//!
//! Selections and pins share the `Selection` generation: both rewrite the
//! place metadata, so the latest of the two wins.

use tracing::{debug, warn};

use super::search::downgrade;
use super::{OperationClass, PlaceSession, PlaceSessionStore, QueryOrigin, SessionEvent};
use crate::place::non_blank;
use crate::projection::parse_city_area;
use crate::{AreaResolution, Coordinates, PlaceSuggestion};

impl PlaceSessionStore {
    /// Resolves a tapped suggestion into the session.
    ///
    /// Fetches the place details, then reverse-geocodes the new point for the
    /// area. Either step may fail; the operation still ends with a name, a
    /// point and the info sheet open. Rapid taps commit only the last one.
    pub async fn select_suggestion(&self, suggestion: PlaceSuggestion) {
        let label = suggestion.display_text().trim().to_string();
        let ticket = self.begin(OperationClass::Selection, |session| {
            session.selected_suggestion_id = Some(suggestion.place_id.clone());
            session.is_resolving_address = true;
        });
        debug!("resolving suggestion {}", suggestion.place_id);

        let details = self.services().get_place_details(&suggestion.place_id).await;
        let details = match details {
            Ok(details) => details,
            Err(e) => {
                warn!("place details failed for {}: {}", suggestion.place_id, e);
                let message = e.to_string();
                let reason = e.capability_downgrade();
                let secondary = non_blank(suggestion.secondary_text.clone());
                let committed = self.commit(&[ticket], |session, generations| {
                    if let Some(reason) = reason {
                        downgrade(session, reason);
                        session.search_error_message = Some(message);
                    }
                    session.suggested_store_name = non_blank(Some(label.clone()));
                    session.city_area = secondary.as_deref().and_then(parse_city_area);
                    session.address_line = secondary;
                    session.website_uri = None;
                    finish_selection(session, &label);
                    generations.advance(OperationClass::Search);
                });
                if committed {
                    if let Some(reason) = reason {
                        self.emit(SessionEvent::CapabilityDowngraded(reason));
                    }
                    self.announce_selection(label);
                }
                return;
            }
        };

        let still_current = self.commit(&[ticket], |session, _| {
            session.selected_suggestion_id = None;
        });
        if !still_current {
            debug!("suggestion {} superseded before geocoding", suggestion.place_id);
            return;
        }

        let point = match details.coordinates() {
            Ok(point) => Some(point),
            Err(e) => {
                warn!("place {} has unusable coordinates: {}", details.place_id, e);
                None
            }
        };
        let area = match point {
            Some(point) => match self.services().reverse_geocode_to_area(point).await {
                Ok(area) => Some(area),
                Err(e) => {
                    debug!("reverse geocode after details failed: {}", e);
                    None
                }
            },
            None => None,
        };

        let name = non_blank(details.name).or_else(|| non_blank(Some(label.clone())));
        let address = non_blank(details.address).or_else(|| non_blank(suggestion.secondary_text));
        let website = non_blank(details.website_uri);
        let committed = self.commit(&[ticket], |session, generations| {
            if let Some(point) = point {
                session.coordinates = point;
            }
            let (city_area, address_line) = merge_area(address, area);
            session.city_area = city_area;
            session.address_line = address_line;
            session.suggested_store_name = name;
            session.website_uri = website;
            finish_selection(session, &label);
            generations.advance(OperationClass::Search);
        });
        if committed {
            self.announce_selection(label);
        }
    }

    /// Drops a pin at `coordinates` and best-effort resolves its area.
    ///
    /// Clears the previous place metadata right away, closes the search UI
    /// and opens the info sheet. A failed geocode leaves area and address
    /// empty.
    pub async fn place_pin(&self, coordinates: Coordinates) {
        let ticket = self.begin(OperationClass::Selection, |session| {
            session.coordinates = coordinates;
            session.city_area = None;
            session.address_line = None;
            session.suggested_store_name = None;
            session.website_uri = None;
            session.selected_suggestion_id = None;
            session.is_resolving_address = true;
            session.is_place_info_visible = true;
            session.hide_search_flags();
        });
        self.emit(SessionEvent::UiChanged);

        let area = match self.services().reverse_geocode_to_area(coordinates).await {
            Ok(area) => Some(area),
            Err(e) => {
                debug!("reverse geocode for pin failed: {}", e);
                None
            }
        };
        let committed = self.commit(&[ticket], |session, _| {
            if let Some(area) = area {
                session.city_area = non_blank(Some(area.city_area));
                session.address_line = non_blank(area.address_line);
            }
            session.is_resolving_address = false;
        });
        if committed {
            self.emit(SessionEvent::SelectionResolved);
        }
    }

    /// Marks the session as hydrated. Returns `true` only for the first call.
    pub fn mark_hydrated(&self) -> bool {
        self.update(|session, _| {
            if session.did_hydrate_from_initial_selection {
                return false;
            }
            session.did_hydrate_from_initial_selection = true;
            true
        })
    }

    fn announce_selection(&self, label: String) {
        self.emit(SessionEvent::SelectionResolved);
        self.emit(SessionEvent::SearchQueryChanged {
            query: label,
            origin: QueryOrigin::Selection,
        });
    }
}

/// Area and address from details plus an optional geocode.
///
/// The details address wins; the geocoded area wins over one parsed from the
/// address.
fn merge_area(
    address: Option<String>,
    area: Option<AreaResolution>,
) -> (Option<String>, Option<String>) {
    let (geo_area, geo_address) = match area {
        Some(area) => (non_blank(Some(area.city_area)), non_blank(area.address_line)),
        None => (None, None),
    };
    let city_area = geo_area.or_else(|| address.as_deref().and_then(parse_city_area));
    (city_area, address.or(geo_address))
}

/// UI state every selection ends in.
///
/// The query shows the chosen label; suggestions from the old query are
/// dropped.
fn finish_selection(session: &mut PlaceSession, label: &str) {
    session.selected_suggestion_id = None;
    session.is_resolving_address = false;
    session.is_place_info_visible = true;
    session.hide_search_flags();
    session.search_query = label.to_string();
    session.reset_search_results();
}
