//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint. Event payload validation is
//! delegated to the models layer so the rules stay identical for every
//! ingestion path.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    EventsListResponse, EventsQuery, HealthResponse, RecordEventResponse, ZoneResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::models;
use crate::store::MAX_LISTING_LIMIT;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Verify the service is running and the event store is reachable. A dead
/// store degrades the response to 503 so load balancers can react.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status_code, status, store) = match state.store.health_check().await {
        Ok(true) => (StatusCode::OK, "ok", "connected".to_string()),
        Ok(false) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "unhealthy",
            "disconnected".to_string(),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "unhealthy",
            format!("error: {}", e),
        ),
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: "v1".to_string(),
            store,
        }),
    )
}

// =============================================================================
// Clock Events
// =============================================================================

/// POST /v1/events
///
/// Record a clock event. The payload is validated (required fields, event
/// type enum, coordinate ranges) and persisted with a single store write.
/// The client-computed `outside_zone` flag is stored verbatim; the server
/// never recomputes it.
pub async fn record_event(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<RecordEventResponse>), AppError> {
    let payload_str = serde_json::to_string(&payload)
        .map_err(|e| AppError::BadRequest(format!("Invalid event JSON: {}", e)))?;

    let record = models::event::parse_event_json_str(&payload_str)
        .map_err(|e| AppError::BadRequest(format!("{:#}", e)))?;

    let stored = state.store.append_event(&state.collection, &record).await?;

    Ok((
        StatusCode::CREATED,
        Json(RecordEventResponse {
            event_id: stored.event_id,
            message: format!("Clock event recorded for {}", record.employee_id),
            recorded_at: stored.recorded_at,
        }),
    ))
}

/// GET /v1/employees/{employee_id}/events
///
/// List clock events for one employee, newest first. The limit defaults to
/// and is capped at the store listing limit.
pub async fn list_employee_events(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    Query(query): Query<EventsQuery>,
) -> HandlerResult<EventsListResponse> {
    let limit = query
        .limit
        .unwrap_or(MAX_LISTING_LIMIT)
        .min(MAX_LISTING_LIMIT);

    let events = state
        .store
        .events_for_employee(&state.collection, &employee_id, limit)
        .await?;
    let total = events.len();

    Ok(Json(EventsListResponse { events, total }))
}

// =============================================================================
// Zone
// =============================================================================

/// GET /v1/zone
///
/// Report the authorized zone this deployment classifies against.
pub async fn zone_info(State(state): State<AppState>) -> HandlerResult<ZoneResponse> {
    Ok(Json(ZoneResponse::from(state.zone.clone())))
}

// =============================================================================
// Fallback
// =============================================================================

/// Any unmatched route.
pub async fn not_found() -> AppError {
    AppError::NotFound("Endpoint not found".to_string())
}
