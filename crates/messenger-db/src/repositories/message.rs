//! PostgreSQL implementation of MessageRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;

use messenger_core::entities::{Attachment, Message};
use messenger_core::error::DomainError;
use messenger_core::traits::{MessageQuery, MessageRepository, RepoResult, MAX_MESSAGE_PAGE};
use messenger_core::value_objects::Snowflake;

use crate::mappers::MessageInsert;
use crate::models::{AttachmentModel, MessageModel, UnreadCountModel};

use super::error::map_db_error;
use super::raw_ids;

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, chat_id, sender_id, text, type::TEXT as type, reply_to_id, created_at
            FROM messages
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Message::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Message>> {
        let ids = raw_ids(ids);
        let results = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, chat_id, sender_id, text, type::TEXT as type, reply_to_id, created_at
            FROM messages
            WHERE id = ANY($1)
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Message::try_from).collect()
    }

    #[instrument(
        skip(self, message, attachments),
        fields(message_id = %message.id, chat_id = %message.chat_id)
    )]
    async fn append(
        &self,
        mut message: Message,
        attachments: &[Attachment],
    ) -> RepoResult<Message> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Appends to one chat queue on its row lock, so recency moves in
        // the same order messages become visible. Read markers take the
        // same lock in share mode.
        let locked = sqlx::query_scalar::<_, i64>("SELECT id FROM chats WHERE id = $1 FOR UPDATE")
            .bind(message.chat_id.into_inner())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_error)?;
        if locked.is_none() {
            return Err(DomainError::ChatNotFound(message.chat_id));
        }
        message.created_at = Utc::now();
        let insert = MessageInsert::new(&message);

        sqlx::query(
            r"
            INSERT INTO messages (id, chat_id, sender_id, text, type, reply_to_id, created_at)
            VALUES ($1, $2, $3, $4, $5::message_type, $6, $7)
            ",
        )
        .bind(insert.id)
        .bind(insert.chat_id)
        .bind(insert.sender_id)
        .bind(insert.text)
        .bind(insert.message_type)
        .bind(insert.reply_to_id)
        .bind(insert.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if !attachments.is_empty() {
            let ids: Vec<i64> = attachments.iter().map(|a| a.id.into_inner()).collect();
            let urls: Vec<&str> = attachments.iter().map(|a| a.url.as_str()).collect();
            let names: Vec<&str> = attachments.iter().map(|a| a.name.as_str()).collect();
            let sizes: Vec<i64> = attachments.iter().map(|a| a.size).collect();
            let mimes: Vec<&str> = attachments.iter().map(|a| a.mime_type.as_str()).collect();

            sqlx::query(
                r"
                INSERT INTO attachments (id, message_id, url, name, size, mime_type)
                SELECT i, $2, u, n, s, m
                FROM UNNEST($1::BIGINT[], $3::TEXT[], $4::TEXT[], $5::BIGINT[], $6::TEXT[])
                     AS t(i, u, n, s, m)
                ",
            )
            .bind(&ids)
            .bind(insert.id)
            .bind(&urls)
            .bind(&names)
            .bind(&sizes)
            .bind(&mimes)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        sqlx::query(
            r"
            UPDATE chats
            SET last_message_at = GREATEST(last_message_at, $2)
            WHERE id = $1
            ",
        )
        .bind(insert.chat_id)
        .bind(insert.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(message)
    }

    #[instrument(skip(self))]
    async fn find_by_chat(
        &self,
        chat_id: Snowflake,
        query: MessageQuery,
    ) -> RepoResult<Vec<Message>> {
        let limit = query.limit.map(|l| l.clamp(1, MAX_MESSAGE_PAGE));

        // Take the newest `limit` rows of the window, then hand them back oldest first.
        // LIMIT NULL means no limit.
        let results = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, chat_id, sender_id, text, type, reply_to_id, created_at
            FROM (
                SELECT m.id, m.chat_id, m.sender_id, m.text, m.type::TEXT as type,
                       m.reply_to_id, m.created_at
                FROM messages m
                WHERE m.chat_id = $1
                  AND ($2::BIGINT IS NULL OR (m.created_at, m.id) < (
                        SELECT c.created_at, c.id FROM messages c WHERE c.id = $2
                  ))
                ORDER BY m.created_at DESC, m.id DESC
                LIMIT $3
            ) page
            ORDER BY created_at, id
            ",
        )
        .bind(chat_id.into_inner())
        .bind(query.before.map(Snowflake::into_inner))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Message::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn find_latest_by_chats(&self, chat_ids: &[Snowflake]) -> RepoResult<Vec<Message>> {
        let ids = raw_ids(chat_ids);
        let results = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT DISTINCT ON (chat_id)
                   id, chat_id, sender_id, text, type::TEXT as type, reply_to_id, created_at
            FROM messages
            WHERE chat_id = ANY($1)
            ORDER BY chat_id, created_at DESC, id DESC
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Message::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn find_attachments(&self, message_ids: &[Snowflake]) -> RepoResult<Vec<Attachment>> {
        let ids = raw_ids(message_ids);
        let results = sqlx::query_as::<_, AttachmentModel>(
            r"
            SELECT id, message_id, url, name, size, mime_type
            FROM attachments
            WHERE message_id = ANY($1)
            ORDER BY message_id, id
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Attachment::from).collect())
    }

    #[instrument(skip(self))]
    async fn unread_counts(&self, user_id: Snowflake) -> RepoResult<HashMap<Snowflake, i64>> {
        let results = sqlx::query_as::<_, UnreadCountModel>(
            r"
            SELECT m.chat_id, COUNT(msg.id) AS unread
            FROM chat_members m
            JOIN messages msg ON msg.chat_id = m.chat_id
            WHERE m.user_id = $1
              AND msg.sender_id <> $1
              AND (m.last_read_at IS NULL OR msg.created_at > m.last_read_at)
            GROUP BY m.chat_id
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results
            .into_iter()
            .map(|row| (Snowflake::new(row.chat_id), row.unread))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgMessageRepository>();
    }
}
