//! PostgreSQL implementation of ChatRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use messenger_core::entities::{Chat, ChatMember, MemberProfile};
use messenger_core::error::DomainError;
use messenger_core::traits::{ChatRepository, RepoResult};
use messenger_core::value_objects::{DirectChatKey, Snowflake};

use crate::mappers::{ChatInsert, MemberInsert};
use crate::models::{ChatMemberModel, ChatModel, ChatWithMemberModel, MemberWithUserModel};

use super::error::{map_db_error, map_unique_violation};
use super::raw_ids;

/// PostgreSQL implementation of ChatRepository
#[derive(Clone)]
pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    /// Create a new PgChatRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_chat(
        tx: &mut Transaction<'_, Postgres>,
        chat: &Chat,
    ) -> RepoResult<Option<ChatModel>> {
        let insert = ChatInsert::new(chat);

        sqlx::query_as::<_, ChatModel>(
            r"
            INSERT INTO chats (id, type, name, description, avatar, direct_key, created_at)
            VALUES ($1, $2::chat_type, $3, $4, $5, $6, $7)
            ON CONFLICT (direct_key) DO NOTHING
            RETURNING id, type::TEXT as type, name, description, avatar, direct_key,
                      last_message_at, created_at
            ",
        )
        .bind(insert.id)
        .bind(insert.chat_type)
        .bind(insert.name)
        .bind(insert.description)
        .bind(insert.avatar)
        .bind(insert.direct_key)
        .bind(insert.created_at)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_db_error)
    }

    async fn insert_members(
        tx: &mut Transaction<'_, Postgres>,
        members: &[ChatMember],
    ) -> RepoResult<()> {
        let insert = MemberInsert::new(members);

        sqlx::query(
            r"
            INSERT INTO chat_members (chat_id, user_id, role, joined_at)
            SELECT c, u, r::member_role, j
            FROM UNNEST($1::BIGINT[], $2::BIGINT[], $3::TEXT[], $4::TIMESTAMPTZ[]) AS t(c, u, r, j)
            ",
        )
        .bind(&insert.chat_ids)
        .bind(&insert.user_ids)
        .bind(&insert.roles)
        .bind(&insert.joined_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyMember))?;

        Ok(())
    }

    async fn find_direct_in(
        tx: &mut Transaction<'_, Postgres>,
        key: &str,
    ) -> RepoResult<Option<ChatModel>> {
        sqlx::query_as::<_, ChatModel>(
            r"
            SELECT id, type::TEXT as type, name, description, avatar, direct_key,
                   last_message_at, created_at
            FROM chats
            WHERE direct_key = $1
            ",
        )
        .bind(key)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_db_error)
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Chat>> {
        let result = sqlx::query_as::<_, ChatModel>(
            r"
            SELECT id, type::TEXT as type, name, description, avatar, direct_key,
                   last_message_at, created_at
            FROM chats
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Chat::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_direct(&self, key: &DirectChatKey) -> RepoResult<Option<Chat>> {
        let result = sqlx::query_as::<_, ChatModel>(
            r"
            SELECT id, type::TEXT as type, name, description, avatar, direct_key,
                   last_message_at, created_at
            FROM chats
            WHERE direct_key = $1
            ",
        )
        .bind(key.as_key())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Chat::try_from).transpose()
    }

    #[instrument(skip(self, chat, members), fields(chat_id = %chat.id))]
    async fn get_or_create_direct(
        &self,
        chat: &Chat,
        members: &[ChatMember],
    ) -> RepoResult<(Chat, bool)> {
        let key = chat
            .direct_key
            .ok_or_else(|| DomainError::InternalError("direct chat without key".to_string()))?
            .as_key();

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Serialize creators of the same pair for the rest of the transaction
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(&key)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        if let Some(existing) = Self::find_direct_in(&mut tx, &key).await? {
            tx.commit().await.map_err(map_db_error)?;
            debug!(key = %key, "direct chat found on re-check");
            return Ok((Chat::try_from(existing)?, false));
        }

        let Some(created) = Self::insert_chat(&mut tx, chat).await? else {
            // The unique key is the final authority; someone outside the lock won.
            let existing = Self::find_direct_in(&mut tx, &key).await?.ok_or_else(|| {
                DomainError::InternalError(format!("direct chat {key} conflicted but is missing"))
            })?;
            tx.commit().await.map_err(map_db_error)?;
            return Ok((Chat::try_from(existing)?, false));
        };

        Self::insert_members(&mut tx, members).await?;
        tx.commit().await.map_err(map_db_error)?;

        Ok((Chat::try_from(created)?, true))
    }

    #[instrument(skip(self, chat, members), fields(chat_id = %chat.id))]
    async fn create_with_members(&self, chat: &Chat, members: &[ChatMember]) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        Self::insert_chat(&mut tx, chat).await?.ok_or_else(|| {
            DomainError::UniqueViolation(format!("chat {} already exists", chat.id))
        })?;
        Self::insert_members(&mut tx, members).await?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_member(
        &self,
        chat_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<ChatMember>> {
        let result = sqlx::query_as::<_, ChatMemberModel>(
            r"
            SELECT chat_id, user_id, role::TEXT as role, joined_at, last_read_at
            FROM chat_members
            WHERE chat_id = $1 AND user_id = $2
            ",
        )
        .bind(chat_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(ChatMember::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_members(&self, chat_id: Snowflake) -> RepoResult<Vec<ChatMember>> {
        let results = sqlx::query_as::<_, ChatMemberModel>(
            r"
            SELECT chat_id, user_id, role::TEXT as role, joined_at, last_read_at
            FROM chat_members
            WHERE chat_id = $1
            ORDER BY joined_at, user_id
            ",
        )
        .bind(chat_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(ChatMember::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn find_members_with_users(
        &self,
        chat_ids: &[Snowflake],
    ) -> RepoResult<Vec<MemberProfile>> {
        let ids = raw_ids(chat_ids);
        let results = sqlx::query_as::<_, MemberWithUserModel>(
            r"
            SELECT m.chat_id, m.user_id, m.role::TEXT as role, m.joined_at, m.last_read_at,
                   u.external_id AS user_external_id, u.name AS user_name,
                   u.email AS user_email, u.avatar AS user_avatar,
                   u.is_online AS user_is_online, u.created_at AS user_created_at,
                   u.updated_at AS user_updated_at
            FROM chat_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.chat_id = ANY($1)
            ORDER BY m.chat_id, m.joined_at, m.user_id
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(MemberProfile::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn find_by_member(&self, user_id: Snowflake) -> RepoResult<Vec<(Chat, ChatMember)>> {
        let results = sqlx::query_as::<_, ChatWithMemberModel>(
            r"
            SELECT c.id, c.type::TEXT as type, c.name, c.description, c.avatar, c.direct_key,
                   c.last_message_at, c.created_at,
                   m.user_id AS m_user_id, m.role::TEXT AS m_role,
                   m.joined_at AS m_joined_at, m.last_read_at AS m_last_read_at
            FROM chat_members m
            JOIN chats c ON c.id = m.chat_id
            WHERE m.user_id = $1
            ORDER BY COALESCE(c.last_message_at, c.created_at) DESC, c.id DESC
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(<(Chat, ChatMember)>::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn add_member(&self, member: &ChatMember) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO chat_members (chat_id, user_id, role, joined_at, last_read_at)
            VALUES ($1, $2, $3::member_role, $4, $5)
            ",
        )
        .bind(member.chat_id.into_inner())
        .bind(member.user_id.into_inner())
        .bind(member.role.as_str())
        .bind(member.joined_at)
        .bind(member.last_read_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyMember))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_last_read(
        &self,
        chat_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<Option<ChatMember>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Wait out in-flight appends, which hold the chat row FOR UPDATE
        // until their messages are visible
        sqlx::query("SELECT id FROM chats WHERE id = $1 FOR SHARE")
            .bind(chat_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        // GREATEST skips NULLs, so an unset value simply takes `at`
        let result = sqlx::query_as::<_, ChatMemberModel>(
            r"
            UPDATE chat_members
            SET last_read_at = GREATEST(last_read_at, $3)
            WHERE chat_id = $1 AND user_id = $2
            RETURNING chat_id, user_id, role::TEXT as role, joined_at, last_read_at
            ",
        )
        .bind(chat_id.into_inner())
        .bind(user_id.into_inner())
        .bind(at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        result.map(ChatMember::try_from).transpose()
    }
}
