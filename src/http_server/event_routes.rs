//! Event HTTP Routes
//!
//! CRUD endpoints for a user's events. Every route requires a bearer token;
//! the resolved user identity scopes all storage access.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use crate::events::errors::EventError;
use crate::events::model::{Event, EventStatus};
use crate::events::period::Period;
use crate::events::validate::CandidateEvent;

use super::auth_routes::bearer_token;
use super::server::AppState;

/// Event routes with shared state
pub fn event_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route(
            "/:event_id",
            get(get_handler).patch(update_handler).delete(delete_handler),
        )
        .with_state(state)
}

/// Request body for event create and patch.
///
/// Every field is optional at the transport level; the validator decides
/// which absences are errors for the mode in use.
#[derive(Debug, Deserialize)]
pub struct EventPayload {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub periodic: Option<bool>,
    pub period: Option<Period>,
    pub next_notification: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub place: Option<String>,
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl From<EventPayload> for CandidateEvent {
    fn from(payload: EventPayload) -> Self {
        CandidateEvent {
            start: payload.start,
            end: payload.end,
            periodic: payload.periodic,
            period: payload.period,
            next_notification: payload.next_notification,
            description: payload.description,
            place: payload.place,
            status: payload.status,
            // Duplicate label names collapse here, before validation.
            labels: BTreeSet::from_iter(payload.labels),
        }
    }
}

type EventFailure = (StatusCode, Json<Value>);

/// Map an event error to its HTTP response.
///
/// Validation failures carry the field-keyed error map; everything else
/// uses the generic error body.
fn event_failure(err: EventError) -> EventFailure {
    if !err.is_client_error() {
        warn!(error = %err, "event request failed");
    }
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = match err {
        EventError::Validation(errors) => json!({ "errors": errors }),
        other => json!({ "error": other.to_string(), "code": other.status_code() }),
    };
    (status, Json(body))
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Uuid, EventFailure> {
    let resolve = || -> Result<Uuid, crate::auth::errors::AuthError> {
        let token = bearer_token(headers)?;
        state.auth.authenticate(token)
    };
    resolve().map_err(|e| {
        let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::UNAUTHORIZED);
        (
            status,
            Json(json!({ "error": e.to_string(), "code": e.status_code() })),
        )
    })
}

// ==================
// Handlers
// ==================

/// Create event handler
async fn create_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<EventPayload>,
) -> Result<(StatusCode, Json<Event>), EventFailure> {
    let user_id = authenticate(&state, &headers)?;

    state
        .events
        .create(user_id, payload.into())
        .map(|event| (StatusCode::CREATED, Json(event)))
        .map_err(event_failure)
}

/// List events handler
async fn list_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Event>>, EventFailure> {
    let user_id = authenticate(&state, &headers)?;

    state.events.list(user_id).map(Json).map_err(event_failure)
}

/// Get event handler
async fn get_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Event>, EventFailure> {
    let user_id = authenticate(&state, &headers)?;

    state
        .events
        .get(user_id, event_id)
        .map(Json)
        .map_err(event_failure)
}

/// Partial update handler
async fn update_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<EventPayload>,
) -> Result<Json<Event>, EventFailure> {
    let user_id = authenticate(&state, &headers)?;

    state
        .events
        .update(user_id, event_id, payload.into())
        .map(Json)
        .map_err(event_failure)
}

/// Delete event handler
async fn delete_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, EventFailure> {
    let user_id = authenticate(&state, &headers)?;

    state
        .events
        .delete(user_id, event_id)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(event_failure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_deduplicates_labels() {
        let payload = EventPayload {
            start: None,
            end: None,
            periodic: None,
            period: None,
            next_notification: None,
            description: None,
            place: None,
            status: None,
            labels: vec!["work".to_string(), "work".to_string(), "home".to_string()],
        };

        let candidate: CandidateEvent = payload.into();
        assert_eq!(candidate.labels.len(), 2);
    }

    #[test]
    fn test_payload_parses_wire_formats() {
        let payload: EventPayload = serde_json::from_str(
            r#"{
                "start": "2025-06-01T10:00:00Z",
                "end": "2025-06-01T12:00:00Z",
                "periodic": true,
                "period": "0 1:0:0",
                "status": "W",
                "labels": ["work"]
            }"#,
        )
        .unwrap();

        assert_eq!(payload.status, Some(EventStatus::Waiting));
        assert_eq!(payload.period, Some(Period::from_parts(0, 1, 0, 0)));
        assert!(payload.next_notification.is_none());
    }
}
