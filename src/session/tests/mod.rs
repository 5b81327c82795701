//! Tests for the PlaceSessionStore.
//!
//! Tests are organized into categories:
//! - `initialize`: session start, location fix, initial address resolution
//! - `search`: query text and debounced search, capability downgrade
//! - `select`: suggestion selection, pins and hydration bookkeeping
//! - `locate`: `use_current_location`
//! - `ui_flags`: focus/sheet/guard flags and the confirm projection
//! - `events`: change notifications

mod initialize;

use super::PlaceSessionStore;
use crate::test_support::{point, ScriptedServices};
use std::sync::Arc;

/// A store at Tokyo Station backed by fresh scripted services.
pub(super) fn new_store() -> (PlaceSessionStore, Arc<ScriptedServices>) {
    let services = ScriptedServices::new();
    let store = PlaceSessionStore::new(services.clone(), point(35.681236, 139.767125));
    (store, services)
}
