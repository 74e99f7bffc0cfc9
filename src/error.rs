use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::models::booking::BookingStatus;

/// Domain errors of the reservation core. All variants except `Database` are
/// recoverable by the caller; the reservation transaction rolls back and seat
/// locks release on every path.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} not found with id {1}")]
    NotFound(&'static str, i64),

    #[error("Seats already booked: {0:?}")]
    SeatAlreadyBooked(Vec<i64>),

    #[error("Session {0} is not available for booking")]
    SessionNotAvailable(i64),

    #[error("Session overlaps with an existing session in hall {0}")]
    SessionOverlap(i64),

    #[error("Cannot transition booking from {current} to {target}")]
    InvalidBookingState {
        current: BookingStatus,
        target: BookingStatus,
    },

    #[error("Booking {0} was modified by another transaction")]
    ConcurrentModification(i64),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(..) => StatusCode::NOT_FOUND,
            Error::SeatAlreadyBooked(_) => StatusCode::CONFLICT,
            Error::SessionNotAvailable(_) => StatusCode::BAD_REQUEST,
            Error::SessionOverlap(_) => StatusCode::CONFLICT,
            Error::InvalidBookingState { .. } => StatusCode::BAD_REQUEST,
            Error::ConcurrentModification(_) => StatusCode::CONFLICT,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            // Lock-wait timeouts are retryable, not fatal
            Error::Database(e) if is_lock_timeout(e) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound(..) => "NOT_FOUND",
            Error::SeatAlreadyBooked(_) => "SEAT_ALREADY_BOOKED",
            Error::SessionNotAvailable(_) => "SESSION_NOT_AVAILABLE",
            Error::SessionOverlap(_) => "SESSION_OVERLAP",
            Error::InvalidBookingState { .. } => "INVALID_BOOKING_STATE",
            Error::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Database(e) if is_lock_timeout(e) => "LOCK_TIMEOUT",
            Error::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Postgres reports a `lock_timeout` expiry as SQLSTATE 55P03; serialization
/// failures and deadlocks (40001/40P01) are equally safe to retry.
fn is_lock_timeout(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => matches!(
            db.code().as_deref(),
            Some("55P03") | Some("40001") | Some("40P01")
        ),
        _ => false,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details stay in the logs; the client gets the domain
        // message only, and database errors are fully opaque.
        let (message, details) = match &self {
            Error::Database(e) => {
                error!("database error: {:?}", e);
                let msg = if is_lock_timeout(e) {
                    "Row lock wait timed out, please retry".to_string()
                } else {
                    "A database error occurred".to_string()
                };
                (msg, None)
            }
            Error::SeatAlreadyBooked(seat_ids) => {
                warn!("seat booking conflict: {:?}", seat_ids);
                (self.to_string(), Some(json!({ "booked_seat_ids": seat_ids })))
            }
            Error::ConcurrentModification(id) => {
                warn!("optimistic lock failure on booking {}", id);
                (
                    "Booking was modified by another transaction. Please retry.".to_string(),
                    None,
                )
            }
            other => {
                warn!("request rejected: {}", other);
                (other.to_string(), None)
            }
        };

        let body = json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": message,
                "details": details,
            }
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            Error::NotFound("Booking", 7).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::SeatAlreadyBooked(vec![1, 2]).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::SessionNotAvailable(3).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::SessionOverlap(4).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            Error::InvalidBookingState {
                current: BookingStatus::Completed,
                target: BookingStatus::Pending,
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::ConcurrentModification(9).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::Validation("seat_ids must not be empty".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn seat_conflict_message_names_every_seat() {
        let err = Error::SeatAlreadyBooked(vec![11, 12, 13]);
        let msg = err.to_string();
        for id in ["11", "12", "13"] {
            assert!(msg.contains(id), "{msg} should mention seat {id}");
        }
    }

    #[test]
    fn invalid_transition_message_names_both_states() {
        let err = Error::InvalidBookingState {
            current: BookingStatus::Pending,
            target: BookingStatus::Completed,
        };
        assert_eq!(
            err.to_string(),
            "Cannot transition booking from PENDING to COMPLETED"
        );
    }
}
