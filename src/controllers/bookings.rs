use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::Error;
use crate::models::BookingStatus;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings", get(get_user_bookings))
        .route("/bookings/{id}", get(get_booking))
        .route("/bookings/{id}/status", patch(update_booking_status))
        .route("/bookings/{id}/confirm", patch(confirm_booking))
        .route("/bookings/{id}/cancel", patch(cancel_booking))
}

/* ---------- BOOKINGS ---------- */

// POST /api/bookings
#[derive(Debug, Deserialize, Validate)]
struct CreateBookingRequest {
    user_id: i64,
    session_id: i64,
    #[validate(length(min = 1, message = "at least one seat is required"))]
    seat_ids: Vec<i64>,
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, Error> {
    req.validate().map_err(|e| Error::Validation(e.to_string()))?;

    let details = state
        .bookings
        .create_booking(req.user_id, req.session_id, &req.seat_ids)
        .await?;
    Ok((StatusCode::CREATED, Json(details)))
}

// GET /api/bookings/{id}
async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let details = state.bookings.get_booking(id).await?;
    Ok(Json(details))
}

// GET /api/bookings?user_id=&page=&pageSize=
#[derive(Debug, Deserialize)]
struct BookingsQuery {
    user_id: i64,
    page: Option<u32>,
    #[serde(rename = "pageSize")]
    page_size: Option<u32>,
}

async fn get_user_bookings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BookingsQuery>,
) -> Result<impl IntoResponse, Error> {
    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(20).clamp(1, 100);

    let bookings = state
        .bookings
        .list_user_bookings(params.user_id, page, page_size)
        .await?;
    Ok(Json(bookings))
}

// PATCH /api/bookings/{id}/status
#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: BookingStatus,
}

async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, Error> {
    let booking = state.bookings.update_status(id, req.status).await?;
    Ok(Json(booking))
}

// PATCH /api/bookings/{id}/confirm
async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let booking = state.bookings.confirm_booking(id).await?;
    Ok(Json(booking))
}

// PATCH /api/bookings/{id}/cancel
async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let booking = state.bookings.cancel_booking(id).await?;
    Ok(Json(booking))
}
