//! Query text and debounced search.

use tracing::{debug, info, warn};

use super::{OperationClass, PlaceSession, PlaceSessionStore, QueryOrigin, SessionEvent};
use crate::{ApiStatus, PinOnlyReason};

impl PlaceSessionStore {
    /// Stores the query text.
    ///
    /// A blank query clears suggestions, loading and error state at once and
    /// invalidates any search still in flight. No request is ever made for
    /// blank input.
    pub fn set_search_query(&self, query: &str) {
        self.update(|session, generations| {
            session.search_query = query.to_string();
            if query.trim().is_empty() {
                generations.advance(OperationClass::Search);
                session.reset_search_results();
            }
        });
        self.emit(SessionEvent::SearchQueryChanged {
            query: query.to_string(),
            origin: QueryOrigin::User,
        });
    }

    pub fn clear_search_query(&self) {
        self.set_search_query("");
    }

    /// Runs the search for the current query.
    ///
    /// Called by the picker once its debounce timer fires. Does nothing in
    /// pin-only mode or for a blank query. Only the latest dispatched search
    /// commits. Quota and access-denied failures switch the session to
    /// pin-only for good; other failures clear the suggestions and record a
    /// message.
    pub async fn search_suggestions_debounced(&self) {
        let dispatch = self.update(|session, generations| {
            let query = session.search_query.trim().to_string();
            if !session.api_status.is_search_enabled() || query.is_empty() {
                return None;
            }
            let ticket = generations.advance(OperationClass::Search);
            session.is_search_loading = true;
            session.search_error_message = None;
            Some((ticket, query))
        });
        let Some((ticket, query)) = dispatch else {
            debug!("search skipped (pin-only or blank query)");
            return;
        };

        debug!("searching places for {:?}", query);
        match self.services().search_places(&query).await {
            Ok(suggestions) => {
                let count = suggestions.len();
                let committed = self.commit(&[ticket], |session, _| {
                    session.suggestions = suggestions;
                    session.is_search_loading = false;
                });
                if committed {
                    self.emit(SessionEvent::SuggestionsLoaded { query, count });
                }
            }
            Err(e) => {
                let message = e.to_string();
                match e.capability_downgrade() {
                    Some(reason) => {
                        let committed = self.commit(&[ticket], |session, _| {
                            session.reset_search_results();
                            session.search_error_message = Some(message);
                            downgrade(session, reason);
                        });
                        if committed {
                            self.emit(SessionEvent::CapabilityDowngraded(reason));
                        }
                    }
                    None => {
                        warn!("place search failed: {}", e);
                        let committed = self.commit(&[ticket], |session, _| {
                            session.reset_search_results();
                            session.search_error_message = Some(message);
                        });
                        if committed {
                            self.emit(SessionEvent::SearchFailed { query });
                        }
                    }
                }
            }
        }
    }
}

/// Moves a search-enabled session to pin-only and closes the search UI.
///
/// An already pin-only session keeps its original reason.
pub(super) fn downgrade(session: &mut PlaceSession, reason: PinOnlyReason) {
    if session.api_status.is_search_enabled() {
        info!("place search disabled for this session: {}", reason);
        session.api_status = ApiStatus::PinOnly(reason);
    }
    session.hide_search_flags();
}
