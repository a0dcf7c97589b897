//! PostgreSQL implementation of ReactionRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use messenger_core::entities::{Reaction, ReactionToggle};
use messenger_core::traits::{ReactionRepository, RepoResult};
use messenger_core::value_objects::Snowflake;

use crate::models::ReactionModel;

use super::error::map_db_error;
use super::raw_ids;

/// PostgreSQL implementation of ReactionRepository
#[derive(Clone)]
pub struct PgReactionRepository {
    pool: PgPool,
}

impl PgReactionRepository {
    /// Create a new PgReactionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReactionRepository for PgReactionRepository {
    #[instrument(
        skip(self, reaction),
        fields(message_id = %reaction.message_id, user_id = %reaction.user_id)
    )]
    async fn toggle(&self, reaction: &Reaction) -> RepoResult<ReactionToggle> {
        let message_id = reaction.message_id.into_inner();
        let user_id = reaction.user_id.into_inner();
        let lock_key = format!("reaction:{message_id}:{user_id}:{}", reaction.emoji);

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(&lock_key)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let removed = sqlx::query(
            r"
            DELETE FROM reactions
            WHERE message_id = $1 AND user_id = $2 AND emoji = $3
            ",
        )
        .bind(message_id)
        .bind(user_id)
        .bind(&reaction.emoji)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let outcome = if removed.rows_affected() > 0 {
            ReactionToggle::Removed
        } else {
            // DO NOTHING absorbs a concurrent insert that bypassed the lock
            sqlx::query(
                r"
                INSERT INTO reactions (message_id, user_id, emoji, created_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (message_id, user_id, emoji) DO NOTHING
                ",
            )
            .bind(message_id)
            .bind(user_id)
            .bind(&reaction.emoji)
            .bind(reaction.created_at)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
            ReactionToggle::Added
        };

        tx.commit().await.map_err(map_db_error)?;

        Ok(outcome)
    }

    #[instrument(skip(self))]
    async fn find(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<Option<Reaction>> {
        let result = sqlx::query_as::<_, ReactionModel>(
            r"
            SELECT message_id, user_id, emoji, created_at
            FROM reactions
            WHERE message_id = $1 AND user_id = $2 AND emoji = $3
            ",
        )
        .bind(message_id.into_inner())
        .bind(user_id.into_inner())
        .bind(emoji)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Reaction::from))
    }

    #[instrument(skip(self))]
    async fn find_by_messages(&self, message_ids: &[Snowflake]) -> RepoResult<Vec<Reaction>> {
        let ids = raw_ids(message_ids);
        let results = sqlx::query_as::<_, ReactionModel>(
            r"
            SELECT message_id, user_id, emoji, created_at
            FROM reactions
            WHERE message_id = ANY($1)
            ORDER BY message_id, created_at
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Reaction::from).collect())
    }
}
