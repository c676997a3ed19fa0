//! Tests for store::error - error context and store error constructors.

use fichaje_rust::store::{ErrorContext, StoreError, StoreResult};

// =========================================================
// ErrorContext
// =========================================================

#[test]
fn test_error_context_new() {
    let ctx = ErrorContext::new("append_event");
    assert_eq!(ctx.operation, Some("append_event".to_string()));
    assert!(ctx.entity.is_none());
    assert!(ctx.entity_id.is_none());
    assert!(ctx.details.is_none());
    assert!(!ctx.retryable);
}

#[test]
fn test_error_context_chaining() {
    let ctx = ErrorContext::new("events_for_employee")
        .with_entity("clock_event")
        .with_entity_id(42)
        .with_details("connection reset")
        .retryable();

    assert_eq!(ctx.operation, Some("events_for_employee".to_string()));
    assert_eq!(ctx.entity, Some("clock_event".to_string()));
    assert_eq!(ctx.entity_id, Some("42".to_string()));
    assert_eq!(ctx.details, Some("connection reset".to_string()));
    assert!(ctx.retryable);
}

#[test]
fn test_error_context_display() {
    let ctx = ErrorContext::new("append_event")
        .with_entity("clock_event")
        .with_entity_id("7");

    let display = format!("{}", ctx);
    assert!(display.contains("operation=append_event"));
    assert!(display.contains("entity=clock_event"));
    assert!(display.contains("id=7"));
}

#[test]
fn test_error_context_display_retryable_and_details() {
    let ctx = ErrorContext::new("append_event")
        .with_details("pool exhausted")
        .retryable();

    let display = format!("{}", ctx);
    assert!(display.contains("details=pool exhausted"));
    assert!(display.contains("retryable=true"));
}

#[test]
fn test_error_context_default_is_empty() {
    let ctx = ErrorContext::default();
    assert!(ctx.operation.is_none());
    assert!(ctx.entity.is_none());
    assert!(ctx.entity_id.is_none());
    assert!(ctx.details.is_none());
    assert!(!ctx.retryable);
}

// =========================================================
// StoreError constructors
// =========================================================

#[test]
fn test_store_error_connection() {
    let err = StoreError::connection("connection refused");
    assert!(err.to_string().contains("Connection error"));
    assert!(err.to_string().contains("connection refused"));
}

#[test]
fn test_store_error_connection_with_context() {
    let ctx = ErrorContext::new("connect").with_entity("database");
    let err = StoreError::connection_with_context("failed to connect", ctx);
    let err_str = err.to_string();
    assert!(err_str.contains("Connection error"));
    assert!(err_str.contains("failed to connect"));
    assert!(err_str.contains("operation=connect"));
}

#[test]
fn test_store_error_query() {
    let err = StoreError::query("syntax error at or near");
    assert!(err.to_string().contains("Query error"));
}

#[test]
fn test_store_error_not_found() {
    let err = StoreError::not_found("event 99 not found");
    assert!(err.to_string().contains("Not found"));
    assert!(err.to_string().contains("event 99 not found"));
}

#[test]
fn test_store_error_validation() {
    let err = StoreError::validation("latitude out of range");
    assert!(err.to_string().contains("validation error"));
}

#[test]
fn test_store_error_configuration() {
    let err = StoreError::configuration("DATABASE_URL not set");
    assert!(err.to_string().contains("Configuration error"));
}

#[test]
fn test_store_error_internal() {
    let err = StoreError::internal("row held an unknown event type");
    assert!(err.to_string().contains("Internal error"));
}

#[test]
fn test_store_error_timeout() {
    let err = StoreError::timeout("pool checkout timed out");
    assert!(err.to_string().contains("Timeout error"));
}

// =========================================================
// Retryability
// =========================================================

#[test]
fn test_connection_errors_are_retryable() {
    assert!(StoreError::connection("refused").is_retryable());
    assert!(StoreError::timeout("slow").is_retryable());
}

#[test]
fn test_permanent_errors_are_not_retryable() {
    assert!(!StoreError::not_found("missing").is_retryable());
    assert!(!StoreError::validation("bad payload").is_retryable());
    assert!(!StoreError::configuration("bad config").is_retryable());
    assert!(!StoreError::internal("bug").is_retryable());
}

#[test]
fn test_query_error_retryable_only_when_marked() {
    assert!(!StoreError::query("plain failure").is_retryable());

    let marked = StoreError::query_with_context(
        "deadlock detected",
        ErrorContext::new("append_event").retryable(),
    );
    assert!(marked.is_retryable());
}

// =========================================================
// Context plumbing
// =========================================================

#[test]
fn test_with_operation_updates_context() {
    let err = StoreError::query("failure").with_operation("events_for_employee");
    assert!(err.to_string().contains("operation=events_for_employee"));
    assert_eq!(
        err.context().operation,
        Some("events_for_employee".to_string())
    );
}

#[test]
fn test_string_conversions_map_to_internal() {
    let from_string: StoreError = String::from("boom").into();
    assert!(from_string.to_string().contains("Internal error"));

    let from_str: StoreError = "boom".into();
    assert!(matches!(from_str, StoreError::InternalError { .. }));
}

#[test]
fn test_store_result_round_trip() {
    let ok: StoreResult<i64> = Ok(7);
    assert_eq!(ok.unwrap(), 7);

    let err: StoreResult<i64> = Err(StoreError::not_found("event"));
    assert!(err.is_err());
}
