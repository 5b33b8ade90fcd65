//! PostgreSQL implementation of ConversationRepository.
//!
//! Unread counters are updated in SQL (`count = count + 1`), selecting the
//! column by participant id, so concurrent sends never lose an increment.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    ConversationId, DomainError, ErrorCode, MessageId, Timestamp, UserId,
};
use crate::domain::messaging::{preview_of, Conversation, Message};
use crate::ports::ConversationRepository;

use super::counter;

const CONVERSATION_COLUMNS: &str = r#"
    id, participant_1, participant_2, unread_count_1, unread_count_2,
    last_message_at, last_message_preview, created_at
"#;

const MESSAGE_COLUMNS: &str = r#"
    id, conversation_id, sender_id, recipient_id, content, message_type, read_at, created_at
"#;

/// PostgreSQL implementation of the ConversationRepository port.
pub struct PostgresConversationRepository {
    pool: PgPool,
}

impl PostgresConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ConversationRow {
    id: Uuid,
    participant_1: Uuid,
    participant_2: Uuid,
    unread_count_1: i32,
    unread_count_2: i32,
    last_message_at: Option<DateTime<Utc>>,
    last_message_preview: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ConversationRow> for Conversation {
    type Error = DomainError;

    fn try_from(row: ConversationRow) -> Result<Self, Self::Error> {
        Ok(Conversation {
            id: ConversationId::from_uuid(row.id),
            participant_1: UserId::from_uuid(row.participant_1),
            participant_2: UserId::from_uuid(row.participant_2),
            unread_count_1: counter("unread_count_1", row.unread_count_1)?,
            unread_count_2: counter("unread_count_2", row.unread_count_2)?,
            last_message_at: row.last_message_at.map(Timestamp::from_datetime),
            last_message_preview: row.last_message_preview,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    conversation_id: Uuid,
    sender_id: Uuid,
    recipient_id: Uuid,
    content: String,
    message_type: String,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: MessageId::from_uuid(row.id),
            conversation_id: ConversationId::from_uuid(row.conversation_id),
            sender_id: UserId::from_uuid(row.sender_id),
            recipient_id: UserId::from_uuid(row.recipient_id),
            content: row.content,
            message_type: row.message_type,
            read_at: row.read_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

fn conversation_not_found(id: &ConversationId) -> DomainError {
    DomainError::new(
        ErrorCode::ConversationNotFound,
        format!("Conversation {} not found", id),
    )
}

#[async_trait]
impl ConversationRepository for PostgresConversationRepository {
    async fn insert(&self, conversation: &Conversation) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO conversations (
                id, participant_1, participant_2, unread_count_1, unread_count_2,
                last_message_at, last_message_preview, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(conversation.id.as_uuid())
        .bind(conversation.participant_1.as_uuid())
        .bind(conversation.participant_2.as_uuid())
        .bind(conversation.unread_count_1 as i32)
        .bind(conversation.unread_count_2 as i32)
        .bind(conversation.last_message_at.map(|t| t.into_datetime()))
        .bind(&conversation.last_message_preview)
        .bind(conversation.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return DomainError::new(
                        ErrorCode::Conflict,
                        "Conversation between these participants already exists",
                    );
                }
            }
            DomainError::database(e)
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &ConversationId) -> Result<Option<Conversation>, DomainError> {
        let row: Option<ConversationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM conversations WHERE id = $1",
            CONVERSATION_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DomainError::database)?;

        row.map(Conversation::try_from).transpose()
    }

    async fn find_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Conversation>, DomainError> {
        let row: Option<ConversationRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM conversations
            WHERE (participant_1 = $1 AND participant_2 = $2)
               OR (participant_1 = $2 AND participant_2 = $1)
            ORDER BY created_at
            LIMIT 1
            "#,
            CONVERSATION_COLUMNS
        ))
        .bind(a.as_uuid())
        .bind(b.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DomainError::database)?;

        row.map(Conversation::try_from).transpose()
    }

    async fn list_for_participant(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Conversation>, DomainError> {
        let rows: Vec<ConversationRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM conversations
            WHERE participant_1 = $1 OR participant_2 = $1
            ORDER BY last_message_at DESC NULLS LAST, created_at DESC
            "#,
            CONVERSATION_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::database)?;

        rows.into_iter().map(Conversation::try_from).collect()
    }

    async fn append_message(&self, message: &Message) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(DomainError::database)?;

        let updated = sqlx::query(
            r#"
            UPDATE conversations SET
                last_message_at = $2,
                last_message_preview = $3,
                unread_count_1 = unread_count_1 + CASE WHEN participant_1 = $4 THEN 1 ELSE 0 END,
                unread_count_2 = unread_count_2 + CASE WHEN participant_2 = $4 THEN 1 ELSE 0 END
            WHERE id = $1
            "#,
        )
        .bind(message.conversation_id.as_uuid())
        .bind(message.created_at.as_datetime())
        .bind(preview_of(&message.content))
        .bind(message.recipient_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(DomainError::database)?;

        if updated.rows_affected() == 0 {
            tx.rollback().await.map_err(DomainError::database)?;
            return Err(conversation_not_found(&message.conversation_id));
        }

        sqlx::query(
            r#"
            INSERT INTO messages (
                id, conversation_id, sender_id, recipient_id, content, message_type,
                read_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(message.conversation_id.as_uuid())
        .bind(message.sender_id.as_uuid())
        .bind(message.recipient_id.as_uuid())
        .bind(&message.content)
        .bind(&message.message_type)
        .bind(message.read_at.map(|t| t.into_datetime()))
        .bind(message.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(DomainError::database)?;

        tx.commit().await.map_err(DomainError::database)?;
        Ok(())
    }

    async fn mark_read(
        &self,
        conversation_id: &ConversationId,
        reader: &UserId,
        at: Timestamp,
    ) -> Result<u64, DomainError> {
        let mut tx = self.pool.begin().await.map_err(DomainError::database)?;

        let cleared = sqlx::query(
            r#"
            UPDATE conversations SET
                unread_count_1 = CASE WHEN participant_1 = $2 THEN 0 ELSE unread_count_1 END,
                unread_count_2 = CASE WHEN participant_2 = $2 THEN 0 ELSE unread_count_2 END
            WHERE id = $1
            "#,
        )
        .bind(conversation_id.as_uuid())
        .bind(reader.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(DomainError::database)?;

        if cleared.rows_affected() == 0 {
            tx.rollback().await.map_err(DomainError::database)?;
            return Err(conversation_not_found(conversation_id));
        }

        let marked = sqlx::query(
            r#"
            UPDATE messages SET read_at = $3
            WHERE conversation_id = $1 AND recipient_id = $2 AND read_at IS NULL
            "#,
        )
        .bind(conversation_id.as_uuid())
        .bind(reader.as_uuid())
        .bind(at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(DomainError::database)?;

        tx.commit().await.map_err(DomainError::database)?;
        Ok(marked.rows_affected())
    }

    async fn find_message(&self, id: &MessageId) -> Result<Option<Message>, DomainError> {
        let row: Option<MessageRow> = sqlx::query_as(&format!(
            "SELECT {} FROM messages WHERE id = $1",
            MESSAGE_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(row.map(Message::from))
    }

    async fn messages_after(
        &self,
        conversation_id: &ConversationId,
        after: &Message,
    ) -> Result<Vec<Message>, DomainError> {
        let rows: Vec<MessageRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM messages
            WHERE conversation_id = $1
              AND seq > (SELECT seq FROM messages WHERE id = $2)
            ORDER BY seq
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(conversation_id.as_uuid())
        .bind(after.id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(rows.into_iter().map(Message::from).collect())
    }
}
