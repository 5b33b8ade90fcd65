//! PostgreSQL implementation of BehaviorRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::analytics::BehaviorEvent;
use crate::domain::foundation::{DomainError, EventId, Timestamp, UserId};
use crate::ports::BehaviorRepository;

/// PostgreSQL implementation of the BehaviorRepository port.
pub struct PostgresBehaviorRepository {
    pool: PgPool,
}

impl PostgresBehaviorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BehaviorRow {
    id: Uuid,
    user_id: Option<Uuid>,
    event_type: String,
    event_data: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl From<BehaviorRow> for BehaviorEvent {
    fn from(row: BehaviorRow) -> Self {
        BehaviorEvent {
            id: EventId::from_uuid(row.id),
            user_id: row.user_id.map(UserId::from_uuid),
            event_type: row.event_type,
            event_data: row.event_data,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

#[async_trait]
impl BehaviorRepository for PostgresBehaviorRepository {
    async fn append(&self, event: &BehaviorEvent) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO user_behavior (id, user_id, event_type, event_data, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(event.user_id.map(|id| *id.as_uuid()))
        .bind(&event.event_type)
        .bind(&event.event_data)
        .bind(event.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(())
    }

    async fn created_since(&self, since: Timestamp) -> Result<Vec<BehaviorEvent>, DomainError> {
        let rows: Vec<BehaviorRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, event_type, event_data, created_at
            FROM user_behavior
            WHERE created_at >= $1
            ORDER BY created_at
            "#,
        )
        .bind(since.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(rows.into_iter().map(BehaviorEvent::from).collect())
    }

    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<BehaviorEvent>, DomainError> {
        let rows: Vec<BehaviorRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, event_type, event_data, created_at
            FROM user_behavior
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(rows.into_iter().map(BehaviorEvent::from).collect())
    }
}
