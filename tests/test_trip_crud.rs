//! Integration tests for Trip CRUD operations.
//!
//! Tests cover:
//! - Creating trips (defaults, ordering, icon palette, id uniqueness)
//! - Status derivation from the supplied dates
//! - Shallow-merge updates and no-op updates of unknown ids
//! - Cascading deletes
//! - List filters

mod common;

use std::collections::HashSet;

use common::*;
use tripla::core::store::{Color, pick_icon};

#[tokio::test]
async fn test_create_trip_defaults() -> anyhow::Result<()> {
    let store = create_memory_store().await;

    let id = store
        .create_trip(make_new_trip("Tokyo Trip", "Tokyo", "Japan"))
        .await;

    let trip = store.get_trip(&id).await.expect("created trip missing");
    assert_eq!(trip.id, id);
    assert_eq!(trip.name, "Tokyo Trip");
    assert_eq!(trip.destination, "Tokyo");
    assert_eq!(trip.country, "Japan");
    assert_eq!(trip.status, TripStatus::Planning);
    assert_eq!(trip.total_budget, 0.0);
    assert_eq!(trip.spent_budget, 0.0);
    assert_eq!(trip.currency, "USD");
    assert!(!trip.is_offline_available);
    assert_eq!(trip.icon, TripIcon::Landmark);
    assert_eq!(trip.icon_color, Color::rgb(0x2D, 0x34, 0x36));

    // Single owner collaborator representing the local user
    assert_eq!(trip.collaborators.len(), 1);
    assert_eq!(trip.collaborators[0].role, CollaboratorRole::Owner);
    assert_eq!(trip.collaborators[0].id, "self");

    // Missing dates fall back to the creation time
    assert_eq!(trip.start_date, "2026-06-15T12:00:00Z");
    assert_eq!(trip.end_date, trip.start_date);

    Ok(())
}

#[tokio::test]
async fn test_create_trip_keeps_draft_budget_and_cover() -> anyhow::Result<()> {
    let store = create_memory_store().await;
    let mut draft = make_new_trip("Lisbon", "Lisbon", "Portugal").with_budget(1800.0);
    draft.cover_image = Some("https://example.com/lisbon.jpg".to_string());

    let id = store.create_trip(draft).await;
    let trip = store.get_trip(&id).await.expect("created trip missing");

    assert_eq!(trip.total_budget, 1800.0);
    assert_eq!(trip.cover_image.as_deref(), Some("https://example.com/lisbon.jpg"));
    assert_eq!(trip.budget().remaining, 1800.0);

    Ok(())
}

#[tokio::test]
async fn test_new_trips_are_prepended_with_unique_ids() -> anyhow::Result<()> {
    let store = create_memory_store().await;

    let mut ids = Vec::new();
    for i in 0..12 {
        let id = store
            .create_trip(make_new_trip(&format!("Trip {}", i), "City", "Country"))
            .await;
        // The newest trip is always at the head of the list
        let trips = store.get_trips().await;
        assert_eq!(trips[0].id, id);
        ids.push(id);
    }

    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len(), "trip ids must never repeat");

    // Most-recent-first ordering and palette cycling by trip count
    let trips = store.get_trips().await;
    assert_eq!(trips.len(), 12);
    for (position, trip) in trips.iter().enumerate() {
        let created_index = 11 - position;
        assert_eq!(trip.id, ids[created_index]);
        assert_eq!((trip.icon, trip.icon_color), pick_icon(created_index));
    }

    Ok(())
}

#[tokio::test]
async fn test_status_derived_from_dates() -> anyhow::Result<()> {
    // TEST_NOW is 2026-06-15 12:00 UTC
    let store = create_memory_store().await;

    let past = store
        .create_trip(make_dated_trip("Oslo", "Norway", "2026-01-02", "2026-01-09"))
        .await;
    let current = store
        .create_trip(make_dated_trip("Rome", "Italy", "2026-06-10", "2026-06-20"))
        .await;
    let future = store
        .create_trip(make_dated_trip("Cusco", "Peru", "2026-09-01", "2026-09-14"))
        .await;
    let half_dated = store
        .create_trip(NewTrip {
            start_date: Some("2026-09-01".to_string()),
            ..make_new_trip("Hanoi", "Hanoi", "Vietnam")
        })
        .await;

    let status = |id: String| {
        let store = store.clone();
        async move { store.get_trip(&id).await.map(|t| t.status) }
    };
    assert_eq!(status(past).await, Some(TripStatus::Completed));
    assert_eq!(status(current).await, Some(TripStatus::Ongoing));
    assert_eq!(status(future).await, Some(TripStatus::Upcoming));
    assert_eq!(status(half_dated).await, Some(TripStatus::Planning));

    Ok(())
}

#[tokio::test]
async fn test_update_trip_merges_fields() -> anyhow::Result<()> {
    let store = create_memory_store().await;
    let id = store
        .create_trip(make_dated_trip("Kyoto", "Japan", "2026-09-01", "2026-09-10"))
        .await;
    let before = store.get_trip(&id).await.expect("trip missing");

    let update = TripUpdate {
        name: Some("Kyoto & Nara".to_string()),
        spent_budget: Some(420.5),
        is_offline_available: Some(true),
        ..Default::default()
    };
    let updated = store.update_trip(&id, update).await.expect("update ignored");

    assert_eq!(updated.name, "Kyoto & Nara");
    assert_eq!(updated.spent_budget, 420.5);
    assert!(updated.is_offline_available);
    // Other fields unchanged
    assert_eq!(updated.id, before.id);
    assert_eq!(updated.destination, before.destination);
    assert_eq!(updated.start_date, before.start_date);
    assert_eq!(updated.status, before.status);
    assert_eq!(updated.collaborators, before.collaborators);

    assert_eq!(store.get_trip(&id).await, Some(updated));
    Ok(())
}

#[tokio::test]
async fn test_update_unknown_trip_leaves_store_unchanged() -> anyhow::Result<()> {
    let store = create_memory_store().await;
    store
        .create_trip(make_new_trip("Tokyo Trip", "Tokyo", "Japan"))
        .await;
    let before = store.snapshot().await;

    let update = TripUpdate {
        name: Some("Ghost".to_string()),
        ..Default::default()
    };
    assert!(store.update_trip("missing", update).await.is_none());

    let after = store.snapshot().await;
    assert_eq!(*before, *after);
    Ok(())
}

#[tokio::test]
async fn test_delete_trip_cascades_to_children() -> anyhow::Result<()> {
    let store = create_memory_store().await;
    let doomed = store
        .create_trip(make_dated_trip("Paris", "France", "2026-07-01", "2026-07-05"))
        .await;
    let kept = store
        .create_trip(make_dated_trip("Madrid", "Spain", "2026-08-01", "2026-08-05"))
        .await;

    for trip_id in [&doomed, &kept] {
        store
            .add_itinerary_item(trip_id, make_itinerary_item("Walk", "2026-07-02", None))
            .await;
        store
            .add_stay(trip_id, make_stay("Hotel", "2026-07-01", "2026-07-05"))
            .await;
        store
            .add_memory(trip_id, NewMemory::photo("file:///photo.jpg"))
            .await;
    }

    assert!(store.delete_trip(&doomed).await);

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.trips.len(), 1);
    assert_eq!(snapshot.trips[0].id, kept);
    assert!(snapshot.itinerary_items.iter().all(|i| i.trip_id == kept));
    assert!(snapshot.stays.iter().all(|s| s.trip_id == kept));
    assert!(snapshot.memories.iter().all(|m| m.trip_id == kept));
    assert_eq!(snapshot.itinerary_items.len(), 1);
    assert_eq!(snapshot.stays.len(), 1);
    assert_eq!(snapshot.memories.len(), 1);

    // Second delete is a no-op
    assert!(!store.delete_trip(&doomed).await);
    Ok(())
}

#[tokio::test]
async fn test_trip_filters() -> anyhow::Result<()> {
    let store = create_memory_store().await;
    store
        .create_trip(make_dated_trip("Oslo", "Norway", "2026-01-02", "2026-01-09"))
        .await;
    store
        .create_trip(make_dated_trip("Rome", "Italy", "2026-06-10", "2026-06-20"))
        .await;
    store
        .create_trip(make_dated_trip("Cusco", "Peru", "2026-09-01", "2026-09-14"))
        .await;
    store.create_trip(make_new_trip("Someday", "Anywhere", "")).await;

    let names = |trips: Vec<tripla::core::store::Trip>| {
        trips.into_iter().map(|t| t.name).collect::<Vec<_>>()
    };
    assert_eq!(
        names(store.get_trips_filtered(TripFilter::Upcoming).await),
        vec!["Cusco", "Rome"]
    );
    assert_eq!(
        names(store.get_trips_filtered(TripFilter::Planning).await),
        vec!["Someday"]
    );
    assert_eq!(
        names(store.get_trips_filtered(TripFilter::Completed).await),
        vec!["Oslo"]
    );
    assert_eq!(store.get_trips_filtered(TripFilter::All).await.len(), 4);
    Ok(())
}
