use std::sync::Arc;

use cardbus_core::schema::SchemaAdapter;
use cardbus_events::{CardLifecycleManager, EventBus};
use tokio_util::sync::CancellationToken;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable; inner data is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Card persistence policy and event consumer.
    pub manager: CardLifecycleManager,
    /// Event bus the card topics live on.
    pub event_bus: Arc<EventBus>,
    /// Converts request bodies to cards and cards to response bodies.
    pub adapter: SchemaAdapter,
    /// Database pool, when cards are stored in PostgreSQL.
    pub pool: Option<cardbus_db::DbPool>,
    /// Fired on shutdown; aborts in-flight card operations.
    pub shutdown: CancellationToken,
}
