//! Card row model and DTO.
//!
//! The `content` column holds the card's `content` object exactly as the
//! shared [`Codec`] encodes it, so rows and wire payloads never drift apart.

use cardbus_core::card::Card;
use cardbus_core::codec::Codec;
use cardbus_core::error::SchemaError;
use cardbus_core::types::Timestamp;
use serde::Serialize;
use serde_json::json;
use sqlx::FromRow;

/// A row from the `cards` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CardRow {
    pub id: String,
    pub card_type: String,
    pub render_type: String,
    pub content: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CardRow {
    /// Rebuild the domain card stored in this row.
    pub fn into_card(self, codec: &impl Codec) -> Result<Card, SchemaError> {
        codec.decode(json!({
            "id": self.id,
            "cardType": self.card_type,
            "renderType": self.render_type,
            "content": self.content,
        }))
    }
}

/// DTO for inserting or replacing a card row.
#[derive(Debug, Clone)]
pub struct UpsertCard {
    pub id: String,
    pub card_type: String,
    pub render_type: String,
    pub content: serde_json::Value,
}

impl UpsertCard {
    pub fn from_card(card: &Card, codec: &impl Codec) -> Result<Self, SchemaError> {
        let mut encoded = codec.encode(card)?;
        let content = encoded
            .get_mut("content")
            .map(serde_json::Value::take)
            .unwrap_or_else(|| json!({}));

        Ok(Self {
            id: card.id.clone(),
            card_type: card.card_type.as_str().to_string(),
            render_type: card.render_type().as_str().to_string(),
            content,
        })
    }
}
