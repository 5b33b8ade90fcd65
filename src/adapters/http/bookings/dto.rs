//! HTTP DTOs for booking endpoints.
//!
//! Amounts cross the wire in major currency units.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adapters::http::dto::ParticipantResponse;
use crate::domain::booking::{Booking, BookingStatus, BookingWithParties, PaymentStatus};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub companion_id: String,
    pub start_time: DateTime<Utc>,
    pub duration_hours: u32,
    pub service_type: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub special_requests: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelBookingRequest {
    pub reason: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct BookingResponse {
    pub id: String,
    pub client_id: String,
    pub companion_id: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_hours: u32,
    pub service_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    pub total_amount: f64,
    pub platform_fee: f64,
    pub companion_earnings: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id.to_string(),
            client_id: b.client_id.to_string(),
            companion_id: b.companion_id.to_string(),
            start_time: b.start_time.as_datetime().to_rfc3339(),
            end_time: b.end_time.as_datetime().to_rfc3339(),
            duration_hours: b.duration_hours.value(),
            service_type: b.service_type,
            location: b.location,
            special_requests: b.special_requests,
            notes: b.notes,
            status: b.status,
            payment_status: b.payment_status,
            payment_intent_id: b.payment_intent_id,
            total_amount: b.total_amount.as_major_units(),
            platform_fee: b.platform_fee.as_major_units(),
            companion_earnings: b.companion_earnings.as_major_units(),
            cancellation_reason: b.cancellation_reason,
            cancelled_by: b.cancelled_by.map(|id| id.to_string()),
            cancelled_at: b.cancelled_at.map(|t| t.as_datetime().to_rfc3339()),
            created_at: b.created_at.as_datetime().to_rfc3339(),
            updated_at: b.updated_at.as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingWithPartiesResponse {
    #[serde(flatten)]
    pub booking: BookingResponse,
    pub client: Option<ParticipantResponse>,
    pub companion: Option<ParticipantResponse>,
}

impl From<BookingWithParties> for BookingWithPartiesResponse {
    fn from(b: BookingWithParties) -> Self {
        Self {
            booking: b.booking.into(),
            client: b.client.map(Into::into),
            companion: b.companion.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateBookingResponse {
    pub booking: BookingResponse,
    /// Secret for completing payment in the browser.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingWithPartiesResponse>,
}
