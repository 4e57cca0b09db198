use axum::routing::{get, post};
use axum::Router;

use crate::handlers::event;
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// POST   /          -> publish_event
/// GET    /types     -> list_event_types
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(event::publish_event))
        .route("/types", get(event::list_event_types))
}
