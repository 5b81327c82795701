//! Synchronous UI-synchronization flags and the confirm projection.
//!
//! These flags carry no business meaning; they let the presentation layer
//! render focus, sheet and panel state without keeping its own copy.

use super::{PlaceSessionStore, QueryOrigin, SessionEvent};
use crate::place::is_blank;
use crate::ConfirmedSelection;

/// Default tap-suppression window after touching a suggestion.
pub const DEFAULT_INTERACTION_GUARD_MS: i64 = 350;

impl PlaceSessionStore {
    pub fn show_place_info_sheet(&self) {
        self.update(|session, _| session.is_place_info_visible = true);
        self.emit(SessionEvent::UiChanged);
    }

    pub fn hide_place_info_sheet(&self) {
        self.update(|session, _| session.is_place_info_visible = false);
        self.emit(SessionEvent::UiChanged);
    }

    /// Focuses the search field. No-op in pin-only mode.
    pub fn focus_search(&self) {
        let changed = self.update(|session, _| {
            if !session.api_status.is_search_enabled() {
                return false;
            }
            session.is_search_focused = true;
            session.is_place_info_visible = false;
            true
        });
        if changed {
            self.emit(SessionEvent::UiChanged);
        }
    }

    /// Handles the search field losing focus.
    ///
    /// If a suggestion interaction armed the guard, this blur is swallowed
    /// once and the flag is consumed.
    pub fn blur_search(&self) {
        let changed = self.update(|session, _| {
            if session.suppress_next_search_blur {
                session.suppress_next_search_blur = false;
                return false;
            }
            std::mem::replace(&mut session.is_search_focused, false)
        });
        if changed {
            self.emit(SessionEvent::UiChanged);
        }
    }

    /// Keyboard submit: dismiss the keyboard but keep results on screen.
    /// No-op in pin-only mode.
    pub fn submit_search(&self) {
        let changed = self.update(|session, _| {
            if !session.api_status.is_search_enabled() {
                return false;
            }
            session.is_search_focused = false;
            session.keep_suggestion_panel_visible = true;
            true
        });
        if changed {
            self.emit(SessionEvent::UiChanged);
        }
    }

    /// Clears the query and closes the suggestion panel.
    pub fn clear_search_overlay(&self) {
        self.update(|session, generations| {
            generations.advance(super::OperationClass::Search);
            session.search_query.clear();
            session.reset_search_results();
            session.hide_search_flags();
        });
        self.emit(SessionEvent::SearchQueryChanged {
            query: String::new(),
            origin: QueryOrigin::User,
        });
    }

    pub fn hide_search_ui(&self) {
        self.update(|session, _| session.hide_search_flags());
        self.emit(SessionEvent::UiChanged);
    }

    /// Arms the suggestion interaction guard at `now_ms` for `duration_ms`.
    ///
    /// Until it expires, map taps are ignored; the next search blur is
    /// swallowed and the panel stays visible so the tap's own handler runs.
    pub fn arm_suggestion_interaction_guard(&self, now_ms: i64, duration_ms: i64) {
        self.update(|session, _| {
            session.suppress_map_tap_until_ms = now_ms.saturating_add(duration_ms.max(0));
            session.suppress_next_search_blur = true;
            session.keep_suggestion_panel_visible = true;
        });
        self.emit(SessionEvent::UiChanged);
    }

    /// Returns `true` while the interaction guard is armed.
    pub fn should_ignore_map_tap(&self, now_ms: i64) -> bool {
        self.read(|session| now_ms < session.suppress_map_tap_until_ms)
    }

    /// Records or clears the map channel's error.
    pub fn set_map_error(&self, message: Option<String>) {
        self.update(|session, _| session.map_error = message);
        self.emit(SessionEvent::UiChanged);
    }

    /// Projects the session into the value handed back on confirm.
    ///
    /// A missing or blank area becomes `not_selected_label`.
    pub fn build_confirm_selection(&self, not_selected_label: &str) -> ConfirmedSelection {
        self.read(|session| ConfirmedSelection {
            coordinates: session.coordinates,
            city_area: if is_blank(session.city_area.as_deref()) {
                not_selected_label.to_string()
            } else {
                session.city_area.clone().unwrap_or_default()
            },
            address_line: session.address_line.clone(),
            suggested_store_name: session.suggested_store_name.clone(),
        })
    }
}
