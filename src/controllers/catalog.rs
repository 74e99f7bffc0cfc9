use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::error::Error;
use crate::models::{Hall, Movie};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/halls", get(get_halls))
        .route("/halls/{id}/seats", get(get_hall_seats))
        .route("/movies", get(get_movies))
        .route("/movies/{id}/sessions", get(get_movie_sessions))
}

/* ---------- CATALOG ---------- */

// GET /api/halls
async fn get_halls(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, Error> {
    let halls = sqlx::query_as::<_, Hall>("SELECT * FROM halls ORDER BY id")
        .fetch_all(&state.db.pool)
        .await?;
    Ok(Json(halls))
}

// GET /api/halls/{id}/seats
async fn get_hall_seats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let seats = state.seats.hall_seats(id).await?;
    Ok(Json(seats))
}

// GET /api/movies
async fn get_movies(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, Error> {
    let movies = sqlx::query_as::<_, Movie>("SELECT * FROM movies ORDER BY title")
        .fetch_all(&state.db.pool)
        .await?;
    Ok(Json(movies))
}

// GET /api/movies/{id}/sessions
async fn get_movie_sessions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let sessions = state.sessions.upcoming_for_movie(id).await?;
    Ok(Json(sessions))
}
