//! Handlers for the `/cards` resource.
//!
//! Bodies use the external card schema; see
//! [`ExternalCard`](cardbus_core::schema::ExternalCard).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use cardbus_core::schema::ExternalCard;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/cards
///
/// List stored cards in storage order.
pub async fn list_cards(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ExternalCard>>>> {
    let cards = state.manager.list(&state.shutdown).await?;
    let data = cards
        .iter()
        .map(|card| state.adapter.to_external(card))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/cards
///
/// Store a card, replacing any card with the same id. Short notices are
/// accepted and not stored. Returns 204 No Content.
///
/// The body is decoded by the schema adapter rather than the `Json`
/// extractor so schema failures answer 400 with a `SCHEMA_ERROR` code.
pub async fn upsert_card(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> AppResult<StatusCode> {
    let card = state.adapter.card_from_payload(payload)?;
    state.manager.upsert(&card, &state.shutdown).await?;

    tracing::info!(card_id = %card.id, card_type = %card.card_type, "Card upserted");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/cards/{id}
///
/// Returns 204 No Content, or 404 if no card has that id.
pub async fn delete_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.manager.delete(&id, &state.shutdown).await?;

    tracing::info!(card_id = %id, "Card deleted");
    Ok(StatusCode::NO_CONTENT)
}
