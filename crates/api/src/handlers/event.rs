//! Handlers for the `/events` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use cardbus_events::{BusEvent, EventType};
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /events`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishEventRequest {
    pub source_id: String,
    pub name: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// POST /api/v1/events
///
/// Publish an event of a registered type. Returns 202 Accepted with the
/// published event; consumers apply it asynchronously.
pub async fn publish_event(
    State(state): State<AppState>,
    Json(input): Json<PublishEventRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<BusEvent>>)> {
    let event = BusEvent::new(input.source_id, input.name).with_payload(input.payload);
    let receivers = state.event_bus.publish(event.clone())?;

    tracing::debug!(
        event_id = %event.id,
        event_name = %event.name,
        receivers,
        "Event published"
    );
    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: event })))
}

/// GET /api/v1/events/types
pub async fn list_event_types(
    State(state): State<AppState>,
) -> Json<DataResponse<Vec<EventType>>> {
    Json(DataResponse {
        data: state.event_bus.event_types(),
    })
}
