//! HTTP handlers for booking endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::booking::{
    CancelBookingCommand, CancelBookingHandler, CreateBookingCommand, CreateBookingHandler,
    ListBookingsHandler, ListBookingsQuery, UpdateBookingStatusCommand,
    UpdateBookingStatusHandler,
};
use crate::domain::foundation::{BookingId, Timestamp, UserId};

use super::dto::{
    BookingListResponse, BookingResponse, CancelBookingRequest, CreateBookingRequest,
    CreateBookingResponse, UpdateStatusRequest,
};

#[derive(Clone)]
pub struct BookingHandlers {
    pub create: Arc<CreateBookingHandler>,
    pub list: Arc<ListBookingsHandler>,
    pub update_status: Arc<UpdateBookingStatusHandler>,
    pub cancel: Arc<CancelBookingHandler>,
}

fn parse_booking_id(raw: &str) -> Result<BookingId, ApiError> {
    raw.parse().map_err(|_| ApiError::invalid_id("booking", raw))
}

/// POST /api/bookings
pub async fn create_booking(
    State(handlers): State<BookingHandlers>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let companion_id: UserId = req
        .companion_id
        .parse()
        .map_err(|_| ApiError::invalid_id("companion", &req.companion_id))?;

    let result = handlers
        .create
        .handle(CreateBookingCommand {
            caller: Some(user),
            companion_id,
            start_time: Timestamp::from_datetime(req.start_time),
            duration_hours: req.duration_hours,
            service_type: req.service_type,
            location: req.location,
            special_requests: req.special_requests,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            booking: result.booking.into(),
            client_secret: result.client_secret,
        }),
    ))
}

/// GET /api/bookings
pub async fn list_bookings(
    State(handlers): State<BookingHandlers>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let result = handlers
        .list
        .handle(ListBookingsQuery { caller: Some(user) })
        .await?;

    Ok(Json(BookingListResponse {
        bookings: result.bookings.into_iter().map(Into::into).collect(),
    }))
}

/// PUT /api/bookings/:id/status
pub async fn update_booking_status(
    State(handlers): State<BookingHandlers>,
    RequireAuth(user): RequireAuth,
    Path(booking_id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = handlers
        .update_status
        .handle(UpdateBookingStatusCommand {
            caller: Some(user),
            booking_id: parse_booking_id(&booking_id)?,
            status: req.status,
            notes: req.notes,
        })
        .await?;

    Ok(Json(BookingResponse::from(result.booking)))
}

/// POST /api/bookings/:id/cancel
pub async fn cancel_booking(
    State(handlers): State<BookingHandlers>,
    RequireAuth(user): RequireAuth,
    Path(booking_id): Path<String>,
    Json(req): Json<CancelBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = handlers
        .cancel
        .handle(CancelBookingCommand {
            caller: Some(user),
            booking_id: parse_booking_id(&booking_id)?,
            reason: req.reason,
        })
        .await?;

    Ok(Json(BookingResponse::from(result.booking)))
}
