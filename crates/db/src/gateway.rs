//! PostgreSQL-backed [`CardGateway`].

use async_trait::async_trait;
use cardbus_core::card::Card;
use cardbus_core::codec::JsonCodec;
use cardbus_core::error::GatewayError;
use cardbus_core::gateway::CardGateway;

use crate::models::card::UpsertCard;
use crate::repositories::CardRepo;
use crate::DbPool;

/// Stores cards in the `cards` table.
///
/// Errors from sqlx and from decoding stored rows are handed back as
/// [`GatewayError`]s without retry.
#[derive(Clone)]
pub struct PgCardGateway {
    pool: DbPool,
    codec: JsonCodec,
}

impl PgCardGateway {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            codec: JsonCodec,
        }
    }
}

#[async_trait]
impl CardGateway for PgCardGateway {
    async fn list_cards(&self) -> Result<Vec<Card>, GatewayError> {
        let rows = CardRepo::list(&self.pool).await.map_err(GatewayError::new)?;
        rows.into_iter()
            .map(|row| {
                let id = row.id.clone();
                row.into_card(&self.codec).map_err(|e| {
                    tracing::error!(card_id = %id, error = %e, "Stored card failed to decode");
                    GatewayError::new(e)
                })
            })
            .collect()
    }

    async fn upsert_card(&self, card: &Card) -> Result<(), GatewayError> {
        let dto = UpsertCard::from_card(card, &self.codec).map_err(GatewayError::new)?;
        CardRepo::upsert(&self.pool, &dto)
            .await
            .map_err(GatewayError::new)?;
        Ok(())
    }

    async fn delete_card(&self, id: &str) -> Result<bool, GatewayError> {
        CardRepo::delete(&self.pool, id)
            .await
            .map_err(GatewayError::new)
    }
}
