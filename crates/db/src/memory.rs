//! In-process [`CardGateway`] keeping cards in insertion order.

use std::sync::RwLock;

use async_trait::async_trait;
use cardbus_core::card::Card;
use cardbus_core::error::GatewayError;
use cardbus_core::gateway::CardGateway;

/// Keeps cards in memory.
///
/// Upserting an existing id replaces the card in place, so list order is the
/// order in which ids were first inserted.
#[derive(Debug, Default)]
pub struct MemoryCardGateway {
    cards: RwLock<Vec<Card>>,
}

impl MemoryCardGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gateway pre-populated with `cards`.
    pub fn with_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        Self {
            cards: RwLock::new(cards.into_iter().collect()),
        }
    }
}

fn poisoned() -> GatewayError {
    GatewayError::new("card store lock poisoned")
}

#[async_trait]
impl CardGateway for MemoryCardGateway {
    async fn list_cards(&self) -> Result<Vec<Card>, GatewayError> {
        let cards = self.cards.read().map_err(|_| poisoned())?;
        Ok(cards.clone())
    }

    async fn upsert_card(&self, card: &Card) -> Result<(), GatewayError> {
        let mut cards = self.cards.write().map_err(|_| poisoned())?;
        match cards.iter_mut().find(|stored| stored.id == card.id) {
            Some(stored) => *stored = card.clone(),
            None => cards.push(card.clone()),
        }
        Ok(())
    }

    async fn delete_card(&self, id: &str) -> Result<bool, GatewayError> {
        let mut cards = self.cards.write().map_err(|_| poisoned())?;
        let before = cards.len();
        cards.retain(|stored| stored.id != id);
        Ok(cards.len() < before)
    }
}
