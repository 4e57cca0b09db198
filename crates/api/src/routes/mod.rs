pub mod card;
pub mod event;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /cards                  list, upsert
/// /cards/{id}             delete
///
/// /events                 publish
/// /events/types           registered event types
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/cards", card::router())
        .nest("/events", event::router())
}
