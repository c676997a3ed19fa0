//! Expanded tests for LocalEventStore.
//!
//! These cover concurrent access patterns, edge cases and health transitions
//! for the in-memory event store implementation.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use fichaje_rust::api::{ClockEventRecord, ClockEventType, Coordinate, EmployeeId};
use fichaje_rust::store::{
    EventStore, LocalEventStore, DEFAULT_COLLECTION, MAX_LISTING_LIMIT,
};

fn make_record(employee: &str, label: &str) -> ClockEventRecord {
    ClockEventRecord::new(
        EmployeeId::new(employee),
        ClockEventType::CheckIn,
        label.to_string(),
        Coordinate::new(4.533, -75.675).unwrap(),
        Utc::now(),
        false,
    )
}

// =========================================================
// Concurrent access
// =========================================================

#[tokio::test]
async fn test_concurrent_appends_assign_unique_ids() {
    let store = Arc::new(LocalEventStore::new());

    let mut handles = vec![];
    for i in 0..10 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .append_event(
                    DEFAULT_COLLECTION,
                    &make_record("emp-001", &format!("turno {}", i)),
                )
                .await
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let stored = handle.await.unwrap().unwrap();
        ids.insert(stored.event_id.value());
    }

    assert_eq!(ids.len(), 10);
    assert_eq!(store.event_count(DEFAULT_COLLECTION), 10);
}

#[tokio::test]
async fn test_concurrent_append_and_list() {
    let store = Arc::new(LocalEventStore::new());

    let mut handles = vec![];
    for i in 0..5 {
        let writer = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            for j in 0..10 {
                writer
                    .append_event(
                        DEFAULT_COLLECTION,
                        &make_record("emp-001", &format!("writer {} turno {}", i, j)),
                    )
                    .await
                    .unwrap();
            }
        }));

        let reader = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            for _ in 0..10 {
                let events = reader
                    .events_for_employee(DEFAULT_COLLECTION, "emp-001", 50)
                    .await
                    .unwrap();
                assert!(events.len() <= 50);
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.event_count(DEFAULT_COLLECTION), 50);
}

#[tokio::test]
async fn test_cloned_store_shares_state() {
    let store = LocalEventStore::new();
    let clone = store.clone();

    clone
        .append_event(DEFAULT_COLLECTION, &make_record("emp-001", "turno"))
        .await
        .unwrap();

    assert_eq!(store.event_count(DEFAULT_COLLECTION), 1);
}

// =========================================================
// Label edge cases
// =========================================================

#[tokio::test]
async fn test_append_empty_label() {
    let store = LocalEventStore::new();

    store
        .append_event(DEFAULT_COLLECTION, &make_record("emp-001", ""))
        .await
        .unwrap();

    let events = store
        .events_for_employee(DEFAULT_COLLECTION, "emp-001", 10)
        .await
        .unwrap();
    assert_eq!(events[0].activity_label, "");
}

#[tokio::test]
async fn test_append_very_long_label() {
    let store = LocalEventStore::new();
    let label = "a".repeat(10_000);

    store
        .append_event(DEFAULT_COLLECTION, &make_record("emp-001", &label))
        .await
        .unwrap();

    let events = store
        .events_for_employee(DEFAULT_COLLECTION, "emp-001", 10)
        .await
        .unwrap();
    assert_eq!(events[0].activity_label.len(), 10_000);
}

#[tokio::test]
async fn test_append_label_with_special_characters() {
    let store = LocalEventStore::new();
    let label = "Instalación eléctrica ⚡ (turno nocturno)";

    store
        .append_event(DEFAULT_COLLECTION, &make_record("emp-001", label))
        .await
        .unwrap();

    let events = store
        .events_for_employee(DEFAULT_COLLECTION, "emp-001", 10)
        .await
        .unwrap();
    assert_eq!(events[0].activity_label, label);
}

// =========================================================
// Health transitions
// =========================================================

#[tokio::test]
async fn test_unhealthy_store_rejects_listing() {
    let store = LocalEventStore::new();
    store.set_healthy(false);

    let err = store
        .events_for_employee(DEFAULT_COLLECTION, "emp-001", 10)
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_health_check_reports_transitions() {
    let store = LocalEventStore::new();
    assert!(store.health_check().await.unwrap());

    store.set_healthy(false);
    assert!(!store.health_check().await.unwrap());

    store.set_healthy(true);
    assert!(store.health_check().await.unwrap());
}

#[tokio::test]
async fn test_recovery_after_outage_keeps_earlier_events() {
    let store = LocalEventStore::new();
    store
        .append_event(DEFAULT_COLLECTION, &make_record("emp-001", "antes"))
        .await
        .unwrap();

    store.set_healthy(false);
    assert!(store
        .append_event(DEFAULT_COLLECTION, &make_record("emp-001", "durante"))
        .await
        .is_err());

    store.set_healthy(true);
    store
        .append_event(DEFAULT_COLLECTION, &make_record("emp-001", "después"))
        .await
        .unwrap();

    let events = store
        .events_for_employee(DEFAULT_COLLECTION, "emp-001", 10)
        .await
        .unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].activity_label, "después");
    assert_eq!(events[1].activity_label, "antes");
}

// =========================================================
// Volume and limits
// =========================================================

#[tokio::test]
async fn test_sequential_ids_over_many_appends() {
    let store = LocalEventStore::new();

    for i in 1..=200i64 {
        let stored = store
            .append_event(
                DEFAULT_COLLECTION,
                &make_record("emp-001", &format!("turno {}", i)),
            )
            .await
            .unwrap();
        assert_eq!(stored.event_id.value(), i);
    }
}

#[tokio::test]
async fn test_listing_clamps_oversized_limit() {
    let store = LocalEventStore::new();
    for i in 0..(MAX_LISTING_LIMIT + 10) {
        store.append_event_impl(
            DEFAULT_COLLECTION,
            make_record("emp-001", &format!("turno {}", i)),
        );
    }

    let events = store
        .events_for_employee(DEFAULT_COLLECTION, "emp-001", usize::MAX)
        .await
        .unwrap();

    assert_eq!(events.len(), MAX_LISTING_LIMIT);
    // Clamping keeps the newest slice.
    assert_eq!(
        events[0].activity_label,
        format!("turno {}", MAX_LISTING_LIMIT + 9)
    );
}

#[tokio::test]
async fn test_clear_resets_events_and_id_counter() {
    let store = LocalEventStore::new();
    store
        .append_event(DEFAULT_COLLECTION, &make_record("emp-001", "turno"))
        .await
        .unwrap();

    store.clear();
    assert_eq!(store.event_count(DEFAULT_COLLECTION), 0);

    let stored = store
        .append_event(DEFAULT_COLLECTION, &make_record("emp-001", "turno"))
        .await
        .unwrap();
    assert_eq!(stored.event_id.value(), 1);
}
