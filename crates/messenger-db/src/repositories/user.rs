//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use messenger_core::entities::User;
use messenger_core::error::DomainError;
use messenger_core::traits::{RepoResult, UserRepository};
use messenger_core::value_objects::Snowflake;

use crate::models::UserModel;

use super::error::map_db_error;
use super::raw_ids;

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, external_id, name, email, avatar, is_online, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<User>> {
        let ids = raw_ids(ids);
        let results = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, external_id, name, email, avatar, is_online, created_at, updated_at
            FROM users
            WHERE id = ANY($1)
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, external_id, name, email, avatar, is_online, created_at, updated_at
            FROM users
            WHERE external_id = $1
            ",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self, user), fields(external_id = %user.external_id))]
    async fn create_or_get(&self, user: &User) -> RepoResult<User> {
        // A concurrent first sight of the same principal loses the insert
        // and reads the winner's row below.
        let inserted = sqlx::query_as::<_, UserModel>(
            r"
            INSERT INTO users (id, external_id, name, email, avatar, is_online, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (external_id) DO NOTHING
            RETURNING id, external_id, name, email, avatar, is_online, created_at, updated_at
            ",
        )
        .bind(user.id.into_inner())
        .bind(&user.external_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.avatar)
        .bind(user.is_online)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        if let Some(model) = inserted {
            return Ok(User::from(model));
        }

        self.find_by_external_id(&user.external_id)
            .await?
            .ok_or_else(|| {
                DomainError::InternalError(format!(
                    "user {} vanished after insert conflict",
                    user.external_id
                ))
            })
    }

    #[instrument(skip(self))]
    async fn list_except(&self, user_id: Snowflake, limit: i64) -> RepoResult<Vec<User>> {
        let limit = limit.clamp(1, 100);

        let results = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, external_id, name, email, avatar, is_online, created_at, updated_at
            FROM users
            WHERE id <> $1
            ORDER BY name, id
            LIMIT $2
            ",
        )
        .bind(user_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(User::from).collect())
    }
}
