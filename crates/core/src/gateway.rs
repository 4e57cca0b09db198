//! Persistence seam for cards.
//!
//! The lifecycle manager only talks to storage through [`CardGateway`];
//! `cardbus-db` provides the PostgreSQL and in-memory implementations.

use async_trait::async_trait;

use crate::card::Card;
use crate::error::GatewayError;

/// Durable card storage.
///
/// Implementations own the stored copy of each card and guarantee that `id`
/// is unique among stored cards.
#[async_trait]
pub trait CardGateway: Send + Sync {
    /// Return all stored cards in the backend's stable order.
    async fn list_cards(&self) -> Result<Vec<Card>, GatewayError>;

    /// Insert the card, or replace the stored card with the same id.
    async fn upsert_card(&self, card: &Card) -> Result<(), GatewayError>;

    /// Remove the card with the given id.
    ///
    /// Returns `true` if a card was removed.
    async fn delete_card(&self, id: &str) -> Result<bool, GatewayError>;
}
