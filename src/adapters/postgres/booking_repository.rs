//! PostgreSQL implementation of BookingRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::booking::{Booking, BookingStatus, DurationHours, PaymentStatus};
use crate::domain::foundation::{BookingId, DomainError, ErrorCode, Money, Timestamp, UserId};
use crate::ports::{BookingRepository, Settlement};

use super::parse_column;

const BOOKING_COLUMNS: &str = r#"
    id, client_id, companion_id, start_time, end_time, duration_hours, service_type,
    location, special_requests, notes, status, payment_status, payment_intent_id,
    total_amount_cents, platform_fee_cents, companion_earnings_cents,
    cancellation_reason, cancelled_by, cancelled_at, created_at, updated_at
"#;

/// PostgreSQL implementation of the BookingRepository port.
pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Error for a guarded write that matched no row: `BookingNotFound` when
    /// the booking is gone, otherwise `Conflict` with `reason`.
    async fn stale_write(&self, id: &BookingId, reason: String) -> DomainError {
        let exists = sqlx::query_scalar::<_, i32>("SELECT 1 FROM bookings WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await;
        match exists {
            Ok(Some(_)) => DomainError::new(ErrorCode::Conflict, reason),
            Ok(None) => DomainError::new(
                ErrorCode::BookingNotFound,
                format!("Booking {} not found", id),
            ),
            Err(err) => DomainError::database(err),
        }
    }
}

/// Database row representation of a booking.
#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    client_id: Uuid,
    companion_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    duration_hours: i32,
    service_type: String,
    location: Option<String>,
    special_requests: Option<String>,
    notes: Option<String>,
    status: String,
    payment_status: String,
    payment_intent_id: Option<String>,
    total_amount_cents: i64,
    platform_fee_cents: i64,
    companion_earnings_cents: i64,
    cancellation_reason: Option<String>,
    cancelled_by: Option<Uuid>,
    cancelled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = DomainError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let hours = u32::try_from(row.duration_hours)
            .map_err(|_| DomainError::database(format!("negative duration_hours {}", row.duration_hours)))?;
        let duration_hours = DurationHours::try_new(hours)
            .map_err(|e| DomainError::database(format!("invalid duration_hours: {}", e)))?;

        Ok(Booking {
            id: BookingId::from_uuid(row.id),
            client_id: UserId::from_uuid(row.client_id),
            companion_id: UserId::from_uuid(row.companion_id),
            start_time: Timestamp::from_datetime(row.start_time),
            end_time: Timestamp::from_datetime(row.end_time),
            duration_hours,
            service_type: row.service_type,
            location: row.location,
            special_requests: row.special_requests,
            notes: row.notes,
            status: parse_column("status", &row.status)?,
            payment_status: parse_column("payment_status", &row.payment_status)?,
            payment_intent_id: row.payment_intent_id,
            total_amount: Money::from_cents(row.total_amount_cents),
            platform_fee: Money::from_cents(row.platform_fee_cents),
            companion_earnings: Money::from_cents(row.companion_earnings_cents),
            cancellation_reason: row.cancellation_reason,
            cancelled_by: row.cancelled_by.map(UserId::from_uuid),
            cancelled_at: row.cancelled_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn rows_to_bookings(rows: Vec<BookingRow>) -> Result<Vec<Booking>, DomainError> {
    rows.into_iter().map(Booking::try_from).collect()
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, client_id, companion_id, start_time, end_time, duration_hours, service_type,
                location, special_requests, notes, status, payment_status, payment_intent_id,
                total_amount_cents, platform_fee_cents, companion_earnings_cents,
                cancellation_reason, cancelled_by, cancelled_at, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21
            )
            "#,
        )
        .bind(booking.id.as_uuid())
        .bind(booking.client_id.as_uuid())
        .bind(booking.companion_id.as_uuid())
        .bind(booking.start_time.as_datetime())
        .bind(booking.end_time.as_datetime())
        .bind(booking.duration_hours.value() as i32)
        .bind(&booking.service_type)
        .bind(&booking.location)
        .bind(&booking.special_requests)
        .bind(&booking.notes)
        .bind(booking.status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(&booking.payment_intent_id)
        .bind(booking.total_amount.cents())
        .bind(booking.platform_fee.cents())
        .bind(booking.companion_earnings.cents())
        .bind(&booking.cancellation_reason)
        .bind(booking.cancelled_by.map(|id| *id.as_uuid()))
        .bind(booking.cancelled_at.map(|t| t.into_datetime()))
        .bind(booking.created_at.as_datetime())
        .bind(booking.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(DomainError::database)?;

        Ok(())
    }

    async fn update_lifecycle(
        &self,
        booking: &Booking,
        expected: BookingStatus,
    ) -> Result<(), DomainError> {
        // Pricing and payment columns are not written here
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                notes = $3,
                status = $4,
                cancellation_reason = $5,
                cancelled_by = $6,
                cancelled_at = $7,
                updated_at = $8
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(booking.id.as_uuid())
        .bind(expected.as_str())
        .bind(&booking.notes)
        .bind(booking.status.as_str())
        .bind(&booking.cancellation_reason)
        .bind(booking.cancelled_by.map(|id| *id.as_uuid()))
        .bind(booking.cancelled_at.map(|t| t.into_datetime()))
        .bind(booking.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(DomainError::database)?;

        if result.rows_affected() == 0 {
            return Err(self
                .stale_write(&booking.id, format!("Booking is no longer {}", expected))
                .await);
        }
        Ok(())
    }

    async fn record_authorization(
        &self,
        id: &BookingId,
        payment_intent_id: &str,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET payment_intent_id = $2, updated_at = NOW()
            WHERE id = $1 AND payment_status = 'pending'
            "#,
        )
        .bind(id.as_uuid())
        .bind(payment_intent_id)
        .execute(&self.pool)
        .await
        .map_err(DomainError::database)?;

        if result.rows_affected() == 0 {
            return Err(self
                .stale_write(id, "Booking payment is no longer pending".to_string())
                .await);
        }
        Ok(())
    }

    async fn record_refund(&self, booking: &Booking) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                payment_status = 'refunded',
                status = 'cancelled',
                cancellation_reason = $2,
                cancelled_at = COALESCE(cancelled_at, $3),
                updated_at = $4
            WHERE id = $1 AND payment_status = 'paid'
            "#,
        )
        .bind(booking.id.as_uuid())
        .bind(&booking.cancellation_reason)
        .bind(booking.cancelled_at.map(|t| t.into_datetime()))
        .bind(booking.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(DomainError::database)?;

        if result.rows_affected() == 0 {
            return Err(self
                .stale_write(&booking.id, "Booking payment is no longer paid".to_string())
                .await);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, DomainError> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DomainError::database)?;

        row.map(Booking::try_from).transpose()
    }

    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Booking>, DomainError> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bookings WHERE payment_intent_id = $1",
            BOOKING_COLUMNS
        ))
        .bind(payment_intent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DomainError::database)?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_for_participant(&self, user_id: &UserId) -> Result<Vec<Booking>, DomainError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM bookings
            WHERE client_id = $1 OR companion_id = $1
            ORDER BY start_time DESC
            "#,
            BOOKING_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::database)?;

        rows_to_bookings(rows)
    }

    async fn list_created_since(
        &self,
        since: Timestamp,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Vec<Booking>, DomainError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM bookings
            WHERE created_at >= $1
              AND ($2::TEXT IS NULL OR payment_status = $2)
            ORDER BY created_at
            "#,
            BOOKING_COLUMNS
        ))
        .bind(since.as_datetime())
        .bind(payment_status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::database)?;

        rows_to_bookings(rows)
    }

    async fn settle_payment(&self, payment_intent_id: &str) -> Result<Settlement, DomainError> {
        let mut tx = self.pool.begin().await.map_err(DomainError::database)?;

        // The payment_status guard makes a repeated settlement a no-op
        let settled: Option<(Uuid, Uuid, i64)> = sqlx::query_as(
            r#"
            UPDATE bookings SET
                payment_status = 'paid',
                status = CASE WHEN status = 'pending' THEN 'confirmed' ELSE status END,
                updated_at = NOW()
            WHERE payment_intent_id = $1 AND payment_status = 'pending'
            RETURNING id, companion_id, companion_earnings_cents
            "#,
        )
        .bind(payment_intent_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DomainError::database)?;

        let Some((booking_id, companion_id, earnings_cents)) = settled else {
            let exists: Option<i32> =
                sqlx::query_scalar("SELECT 1 FROM bookings WHERE payment_intent_id = $1")
                    .bind(payment_intent_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(DomainError::database)?;
            tx.rollback().await.map_err(DomainError::database)?;
            return Ok(match exists {
                Some(_) => Settlement::AlreadySettled,
                None => Settlement::NoMatchingBooking,
            });
        };

        sqlx::query(
            "UPDATE profiles SET total_earnings_cents = total_earnings_cents + $2 WHERE id = $1",
        )
        .bind(companion_id)
        .bind(earnings_cents)
        .execute(&mut *tx)
        .await
        .map_err(DomainError::database)?;

        tx.commit().await.map_err(DomainError::database)?;

        Ok(Settlement::Settled {
            booking_id: BookingId::from_uuid(booking_id),
            companion_id: UserId::from_uuid(companion_id),
            credited: Money::from_cents(earnings_cents),
        })
    }
}
