//! Route definitions for the `/cards` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::card;
use crate::state::AppState;

/// Routes mounted at `/cards`.
///
/// ```text
/// GET    /          -> list_cards
/// PUT    /          -> upsert_card
/// DELETE /{id}      -> delete_card
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(card::list_cards).put(card::upsert_card))
        .route("/{id}", delete(card::delete_card))
}
