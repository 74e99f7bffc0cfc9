use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Error;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions", get(get_schedule))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/seats", get(get_session_seats))
        .route("/sessions/{id}/cancel", patch(cancel_session))
}

/* ---------- SESSIONS ---------- */

// POST /api/sessions
#[derive(Debug, Deserialize)]
struct CreateSessionRequest {
    movie_id: i64,
    hall_id: i64,
    start_time: DateTime<Utc>,
    base_price: Decimal,
}

async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, Error> {
    let session = state
        .sessions
        .create_session(req.movie_id, req.hall_id, req.start_time, req.base_price)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

// GET /api/sessions?date=YYYY-MM-DD
#[derive(Debug, Deserialize)]
struct ScheduleQuery {
    date: NaiveDate,
}

async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScheduleQuery>,
) -> Result<impl IntoResponse, Error> {
    let sessions = state.sessions.schedule_for_date(params.date).await?;
    Ok(Json(sessions))
}

// GET /api/sessions/{id}
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let details = state.sessions.get_session(id).await?;
    Ok(Json(details))
}

// GET /api/sessions/{id}/seats
async fn get_session_seats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let seats = state.seats.seat_map(id).await?;
    Ok(Json(seats))
}

// PATCH /api/sessions/{id}/cancel
async fn cancel_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let session = state.sessions.cancel_session(id).await?;
    Ok(Json(session))
}
