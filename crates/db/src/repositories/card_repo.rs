//! Repository for the `cards` table.

use sqlx::PgPool;

use crate::models::card::{CardRow, UpsertCard};

/// Column list for `cards` queries.
const COLUMNS: &str = "id, card_type, render_type, content, created_at, updated_at";

/// Provides data access for stored cards.
pub struct CardRepo;

impl CardRepo {
    /// List all cards, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<CardRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cards ORDER BY created_at, id");
        sqlx::query_as::<_, CardRow>(&query).fetch_all(pool).await
    }

    /// Insert a card or replace the stored card with the same id.
    ///
    /// Uses `ON CONFLICT (id) DO UPDATE`; `created_at` is kept from the
    /// original insert so list order stays stable across updates.
    pub async fn upsert(pool: &PgPool, dto: &UpsertCard) -> Result<CardRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO cards (id, card_type, render_type, content) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET \
                 card_type = EXCLUDED.card_type, \
                 render_type = EXCLUDED.render_type, \
                 content = EXCLUDED.content, \
                 updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CardRow>(&query)
            .bind(&dto.id)
            .bind(&dto.card_type)
            .bind(&dto.render_type)
            .bind(&dto.content)
            .fetch_one(pool)
            .await
    }

    /// Delete a card by id.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
