//! PostgreSQL implementation of ProfileRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, Money, Timestamp, UserId};
use crate::domain::profile::{ParticipantSummary, Profile};
use crate::ports::ProfileRepository;

use super::parse_column;

/// PostgreSQL implementation of the ProfileRepository port.
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    user_type: String,
    display_name: Option<String>,
    avatar_url: Option<String>,
    total_earnings_cents: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = DomainError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            id: UserId::from_uuid(row.id),
            email: row.email,
            user_type: parse_column("user_type", &row.user_type)?,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            total_earnings: Money::from_cents(row.total_earnings_cents),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    display_name: Option<String>,
    avatar_url: Option<String>,
}

impl From<SummaryRow> for ParticipantSummary {
    fn from(row: SummaryRow) -> Self {
        ParticipantSummary {
            id: UserId::from_uuid(row.id),
            display_name: row.display_name,
            avatar_url: row.avatar_url,
        }
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn insert(&self, profile: &Profile) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (
                id, email, user_type, display_name, avatar_url, total_earnings_cents, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(profile.id.as_uuid())
        .bind(&profile.email)
        .bind(profile.user_type.as_str())
        .bind(&profile.display_name)
        .bind(&profile.avatar_url)
        .bind(profile.total_earnings.cents())
        .bind(profile.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return DomainError::new(
                        ErrorCode::Conflict,
                        format!("Profile {} already exists", profile.id),
                    );
                }
            }
            DomainError::database(e)
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<Profile>, DomainError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            SELECT id, email, user_type, display_name, avatar_url, total_earnings_cents, created_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DomainError::database)?;

        row.map(Profile::try_from).transpose()
    }

    async fn find_summaries(&self, ids: &[UserId]) -> Result<Vec<ParticipantSummary>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<SummaryRow> = sqlx::query_as(
            "SELECT id, display_name, avatar_url FROM profiles WHERE id = ANY($1)",
        )
        .bind(&uuids)
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(rows.into_iter().map(ParticipantSummary::from).collect())
    }

    async fn companion_rate(&self, companion_id: &UserId) -> Result<Option<Money>, DomainError> {
        let cents: Option<i64> =
            sqlx::query_scalar("SELECT hourly_rate_cents FROM companions WHERE id = $1")
                .bind(companion_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(DomainError::database)?;

        Ok(cents.map(Money::from_cents))
    }
}
