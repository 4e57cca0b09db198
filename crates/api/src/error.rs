use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cardbus_core::error::{CardError, SchemaError};
use cardbus_events::BusError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CardError`] for card operations and [`BusError`] for publishing.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A card operation failed.
    #[error(transparent)]
    Card(#[from] CardError),

    /// The event bus rejected a publish.
    #[error(transparent)]
    Bus(#[from] BusError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<SchemaError> for AppError {
    fn from(err: SchemaError) -> Self {
        Self::Card(CardError::Schema(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Card(card) => classify_card_error(card),
            AppError::Bus(BusError::UnknownEventType { .. }) => (
                StatusCode::BAD_REQUEST,
                "UNKNOWN_EVENT_TYPE",
                self.to_string(),
            ),
            AppError::Bus(BusError::Closed) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "Event bus is closed".to_string(),
            ),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a card error into an HTTP status, error code, and message.
///
/// Storage failures are logged and answered with a sanitized 500.
fn classify_card_error(err: &CardError) -> (StatusCode, &'static str, String) {
    match err {
        CardError::NotFound { id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Card with id {id} not found"),
        ),
        CardError::Validation(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
        CardError::Schema(e) => (StatusCode::BAD_REQUEST, "SCHEMA_ERROR", e.to_string()),
        CardError::Gateway(e) => {
            tracing::error!(error = %e, "Card gateway error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        CardError::Subscription(msg) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            msg.clone(),
        ),
        CardError::Cancelled => (
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Server is shutting down".to_string(),
        ),
    }
}
