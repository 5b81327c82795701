//! Tests for initialize_session.

use super::new_store;
use crate::error::GeocodeError;
use crate::test_support::{
    area, details, granted, point, settle, stored_selection, suggestion,
};
use crate::{ApiStatus, LocationCapture, PinOnlyReason};

#[tokio::test]
async fn seeds_from_inputs_and_records_fix() {
    let (store, services) = new_store();
    services.push_location(granted(35.69, 139.70));

    store
        .initialize_session(point(35.0, 139.0), None, false)
        .await;

    let s = store.snapshot();
    assert_eq!(s.coordinates, point(35.0, 139.0));
    assert_eq!(s.current_location_coordinates, Some(point(35.69, 139.70)));
    assert_eq!(s.api_status, ApiStatus::SearchEnabled);
    assert!(s.location_status_message.is_none());
    assert!(!s.is_initializing_location);
    assert!(!s.is_busy());
    assert!(!s.is_place_info_visible);
}

#[tokio::test]
async fn busy_flag_set_while_fix_pending() {
    let (store, services) = new_store();
    let gate = services.push_location_gated(granted(35.69, 139.70));

    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.initialize_session(point(35.0, 139.0), None, false).await })
    };
    settle().await;
    assert!(store.snapshot().is_initializing_location);

    let _ = gate.send(());
    task.await.expect("init task");
    assert!(!store.snapshot().is_initializing_location);
}

#[tokio::test]
async fn clears_metadata_from_previous_session_without_selection() {
    let (store, services) = new_store();
    services.push_location(granted(1.0, 1.0));
    store
        .initialize_session(
            point(0.0, 0.0),
            Some(stored_selection("Life", Some("2-1 Dogenzaka"), Some("Shibuya"))),
            false,
        )
        .await;
    assert_eq!(store.snapshot().suggested_store_name.as_deref(), Some("Life"));

    services.push_location(granted(1.0, 1.0));
    store.initialize_session(point(0.0, 0.0), None, false).await;

    let s = store.snapshot();
    assert_eq!(s.suggested_store_name, None);
    assert_eq!(s.city_area, None);
    assert_eq!(s.address_line, None);
}

#[tokio::test]
async fn newer_initialize_discards_older_writes() {
    let (store, services) = new_store();
    let first_gate = services.push_location_gated(granted(10.0, 10.0));
    services.push_location(granted(20.0, 20.0));

    let first = {
        let store = store.clone();
        tokio::spawn(async move { store.initialize_session(point(1.0, 1.0), None, false).await })
    };
    settle().await;

    store
        .initialize_session(
            point(2.0, 2.0),
            Some(stored_selection("Life", Some("2-1 Dogenzaka"), Some("Shibuya"))),
            false,
        )
        .await;

    let _ = first_gate.send(());
    first.await.expect("first init task");

    let s = store.snapshot();
    assert_eq!(s.coordinates, point(35.658, 139.698));
    assert_eq!(s.current_location_coordinates, Some(point(20.0, 20.0)));
    // The first call would have cleared these on settle.
    assert_eq!(s.suggested_store_name.as_deref(), Some("Life"));
    assert_eq!(s.city_area.as_deref(), Some("Shibuya"));
    assert!(!s.is_initializing_location);
}

#[tokio::test]
async fn fills_missing_area_from_reverse_geocode() {
    let (store, services) = new_store();
    services.push_location(granted(1.0, 1.0));
    services.push_geocode(Ok(area("Shibuya", Some("2-1 Dogenzaka, Shibuya, Japan"))));

    store
        .initialize_session(
            point(0.0, 0.0),
            Some(stored_selection("Life", Some("Dogenzaka 2-1"), None)),
            false,
        )
        .await;

    let s = store.snapshot();
    assert_eq!(s.city_area.as_deref(), Some("Shibuya"));
    // Existing address is kept; only gaps are filled.
    assert_eq!(s.address_line.as_deref(), Some("Dogenzaka 2-1"));
    assert_eq!(services.geocode_calls(), vec![point(35.658, 139.698)]);
    assert!(!s.is_resolving_address);
}

#[tokio::test]
async fn complete_selection_skips_geocode() {
    let (store, services) = new_store();
    services.push_location(granted(1.0, 1.0));

    store
        .initialize_session(
            point(0.0, 0.0),
            Some(stored_selection("Life", Some("2-1 Dogenzaka"), Some("Shibuya"))),
            false,
        )
        .await;

    assert!(services.geocode_calls().is_empty());
    assert!(!store.snapshot().is_resolving_address);
}

#[tokio::test]
async fn geocode_failure_leaves_gaps() {
    let (store, services) = new_store();
    services.push_location(granted(1.0, 1.0));
    services.push_geocode(Err(GeocodeError::Failed("offline".to_string())));

    store
        .initialize_session(point(0.0, 0.0), Some(stored_selection("Life", None, None)), false)
        .await;

    let s = store.snapshot();
    assert_eq!(s.city_area, None);
    assert_eq!(s.address_line, None);
    assert_eq!(s.suggested_store_name.as_deref(), Some("Life"));
    assert!(!s.is_resolving_address);
}

#[tokio::test]
async fn denied_location_sets_status_message() {
    let (store, services) = new_store();
    services.push_location(LocationCapture::Denied {
        message: "Location permission was denied.".to_string(),
    });

    store.initialize_session(point(0.0, 0.0), None, false).await;

    let s = store.snapshot();
    assert_eq!(s.current_location_coordinates, None);
    assert_eq!(
        s.location_status_message.as_deref(),
        Some("Location permission was denied.")
    );
    assert!(!s.is_initializing_location);
}

#[tokio::test]
async fn hydration_request_writes_derived_query() {
    let (store, services) = new_store();
    services.push_location(granted(1.0, 1.0));

    store
        .initialize_session(
            point(0.0, 0.0),
            Some(stored_selection("Life", Some("2-1 Dogenzaka"), Some("Shibuya"))),
            true,
        )
        .await;

    let s = store.snapshot();
    assert_eq!(s.search_query, "Life 2-1 Dogenzaka Shibuya");
    assert_eq!(
        s.initial_selection_query.as_deref(),
        Some("Life 2-1 Dogenzaka Shibuya")
    );
    assert!(s.is_place_info_visible);
    assert!(!s.did_hydrate_from_initial_selection);
}

#[tokio::test]
async fn no_hydration_query_without_place_info() {
    let (store, services) = new_store();
    services.push_location(granted(1.0, 1.0));

    store
        .initialize_session(
            point(0.0, 0.0),
            Some(stored_selection("Life", Some("2-1 Dogenzaka"), Some("Shibuya"))),
            false,
        )
        .await;

    let s = store.snapshot();
    assert_eq!(s.search_query, "");
    assert_eq!(s.initial_selection_query, None);
}

#[tokio::test]
async fn capability_probe_sets_api_status() {
    let (store, services) = new_store();
    services.set_api_status(ApiStatus::PinOnly(PinOnlyReason::MissingKey));
    services.push_location(granted(1.0, 1.0));

    store
        .initialize_session(
            point(0.0, 0.0),
            Some(stored_selection("Life", Some("2-1 Dogenzaka"), Some("Shibuya"))),
            true,
        )
        .await;

    let s = store.snapshot();
    assert_eq!(s.api_status, ApiStatus::PinOnly(PinOnlyReason::MissingKey));
    // No search will run, so the query is left empty.
    assert_eq!(s.search_query, "");
}

#[tokio::test]
async fn reinitialize_drops_search_from_previous_session() {
    let (store, services) = new_store();
    services.push_location(granted(1.0, 1.0));
    store.initialize_session(point(0.0, 0.0), None, false).await;

    store.set_search_query("life");
    let gate = services.push_search_gated(Ok(vec![suggestion("a", "Life", None)]));
    let search = {
        let store = store.clone();
        tokio::spawn(async move { store.search_suggestions_debounced().await })
    };
    settle().await;

    services.push_location(granted(1.0, 1.0));
    store.initialize_session(point(0.0, 0.0), None, false).await;
    let _ = gate.send(());
    search.await.expect("search task");

    let s = store.snapshot();
    assert!(s.suggestions.is_empty());
    assert!(!s.is_search_loading);
}

#[tokio::test]
async fn pick_made_while_fix_pending_survives_settle() {
    let (store, services) = new_store();
    let gate = services.push_location_gated(granted(1.0, 1.0));

    let init = {
        let store = store.clone();
        tokio::spawn(async move { store.initialize_session(point(0.0, 0.0), None, false).await })
    };
    settle().await;

    services.push_details(Ok(details("life", "Life Dogenzaka", "2-1 Dogenzaka, Shibuya, Japan", 35.658, 139.698)));
    services.push_geocode(Ok(area("Shibuya", None)));
    store
        .select_suggestion(suggestion("life", "Life Dogenzaka", None))
        .await;

    let _ = gate.send(());
    init.await.expect("init task");

    let s = store.snapshot();
    assert_eq!(s.suggested_store_name.as_deref(), Some("Life Dogenzaka"));
    assert_eq!(s.city_area.as_deref(), Some("Shibuya"));
    assert_eq!(s.current_location_coordinates, Some(point(1.0, 1.0)));
}
