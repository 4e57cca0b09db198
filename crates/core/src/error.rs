//! Error taxonomy for card handling.
//!
//! Gateway errors are carried verbatim: [`GatewayError`] displays exactly
//! what the storage backend reported, and [`CardError::Gateway`] is
//! transparent over it.

use std::fmt;

use crate::card::RenderType;

/// A card whose content breaks the model's invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Card id must not be empty")]
    EmptyId,

    #[error("Progress must be between 0 and 100, got {0}")]
    ProgressOutOfRange(i64),

    #[error("Field '{field}' is not valid for render type '{render_type}'")]
    UnexpectedBody {
        render_type: RenderType,
        field: &'static str,
    },
}

/// Failure while re-encoding a value across the schema boundary.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Failed to encode value: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Payload does not match the target schema: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Payload decoded into an invalid card: {0}")]
    Validation(#[from] ValidationError),
}

/// Opaque error reported by a [`CardGateway`](crate::gateway::CardGateway).
///
/// Display and source are forwarded to the wrapped error unchanged.
#[derive(Debug)]
pub struct GatewayError(Box<dyn std::error::Error + Send + Sync>);

impl GatewayError {
    /// Wrap any error (or message) reported by a storage backend.
    pub fn new<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self(err.into())
    }

    /// Recover the backend's original error.
    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync> {
        self.0
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

/// Errors surfaced by the card lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Subscription failed: {0}")]
    Subscription(String),

    #[error("Card not found: {id}")]
    NotFound { id: String },

    #[error("Operation cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_error_displays_backend_message_verbatim() {
        let err = CardError::from(GatewayError::new("disk full"));
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn gateway_error_round_trips_inner_error() {
        let inner = std::io::Error::other("connection reset");
        let err = GatewayError::new(inner);
        let recovered = err.into_inner();
        assert_eq!(recovered.to_string(), "connection reset");
        assert!(recovered.downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn display_unexpected_body() {
        let err = ValidationError::UnexpectedBody {
            render_type: RenderType::ListNotice,
            field: "bodyProgress",
        };
        assert_eq!(
            err.to_string(),
            "Field 'bodyProgress' is not valid for render type 'list-notice'"
        );
    }

    #[test]
    fn display_not_found() {
        let err = CardError::NotFound {
            id: "missing-id".to_string(),
        };
        assert_eq!(err.to_string(), "Card not found: missing-id");
    }
}
