//! Session service: scheduling, overlap protection and lifecycle sweeps.
//!
//! Session creation locks the hall row first, so two overlapping sessions for
//! the same hall can never both pass the overlap check. The end time is
//! derived from the movie runtime plus a cleaning buffer.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::database::Database;
use crate::error::Error;
use crate::models::{Hall, Movie, Session, SessionStatus};

/// Minutes added after the movie runtime for hall cleaning between sessions.
pub const SESSION_BUFFER_MINUTES: i64 = 15;

/// A session together with its remaining capacity.
#[derive(Debug, Clone, Serialize)]
pub struct SessionDetails {
    #[serde(flatten)]
    pub session: Session,
    pub available_seats: i64,
}

#[derive(Clone)]
pub struct SessionService {
    db: Database,
}

impl SessionService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Schedules a session. The hall row is locked for the duration of the
    /// transaction; the overlap predicate is `existing.start < new.end AND
    /// existing.end > new.start`, ignoring CANCELLED sessions.
    pub async fn create_session(
        &self,
        movie_id: i64,
        hall_id: i64,
        start_time: DateTime<Utc>,
        base_price: Decimal,
    ) -> Result<Session, Error> {
        if base_price <= Decimal::ZERO {
            return Err(Error::Validation("base_price must be positive".into()));
        }

        let mut tx = self.db.pool.begin().await?;

        let movie = sqlx::query_as::<_, Movie>("SELECT * FROM movies WHERE id = $1")
            .bind(movie_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(Error::NotFound("Movie", movie_id))?;

        // Serializes concurrent scheduling for this hall.
        sqlx::query_as::<_, Hall>("SELECT * FROM halls WHERE id = $1 FOR UPDATE")
            .bind(hall_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(Error::NotFound("Hall", hall_id))?;

        let end_time = start_time
            + Duration::minutes(movie.duration_minutes as i64 + SESSION_BUFFER_MINUTES);

        let overlaps: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sessions \
             WHERE hall_id = $1 AND status <> 'CANCELLED' \
             AND start_time < $2 AND end_time > $3)",
        )
        .bind(hall_id)
        .bind(end_time)
        .bind(start_time)
        .fetch_one(&mut *tx)
        .await?;
        if overlaps {
            return Err(Error::SessionOverlap(hall_id));
        }

        let session = sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (movie_id, hall_id, start_time, end_time, base_price, status) \
             VALUES ($1, $2, $3, $4, $5, 'SCHEDULED') RETURNING *",
        )
        .bind(movie_id)
        .bind(hall_id)
        .bind(start_time)
        .bind(end_time)
        .bind(base_price)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Session {} scheduled: movie {} in hall {} at {}",
            session.id, movie_id, hall_id, session.start_time
        );
        Ok(session)
    }

    /// Cancels a SCHEDULED session that has not started yet. The update is
    /// conditional on the status, so a session that advanced concurrently is
    /// reported as no longer available.
    pub async fn cancel_session(&self, session_id: i64) -> Result<Session, Error> {
        let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(session_id)
            .fetch_optional(&self.db.pool)
            .await?
            .ok_or(Error::NotFound("Session", session_id))?;
        if session.has_started(Utc::now()) || session.status != SessionStatus::Scheduled {
            return Err(Error::SessionNotAvailable(session_id));
        }

        let cancelled = sqlx::query_as::<_, Session>(
            "UPDATE sessions SET status = 'CANCELLED' \
             WHERE id = $1 AND status = 'SCHEDULED' RETURNING *",
        )
        .bind(session_id)
        .fetch_optional(&self.db.pool)
        .await?
        .ok_or(Error::SessionNotAvailable(session_id))?;

        info!("Session {} cancelled", session_id);
        Ok(cancelled)
    }

    /// Advances session statuses against the database clock: SCHEDULED
    /// sessions whose window has opened become ONGOING, and anything past its
    /// end time becomes COMPLETED. Returns (started, completed) counts.
    pub async fn advance_statuses(&self) -> Result<(u64, u64), Error> {
        let started = sqlx::query(
            "UPDATE sessions SET status = 'ONGOING' \
             WHERE status = 'SCHEDULED' AND start_time <= NOW() AND end_time > NOW()",
        )
        .execute(&self.db.pool)
        .await?
        .rows_affected();

        let completed = sqlx::query(
            "UPDATE sessions SET status = 'COMPLETED' \
             WHERE status IN ('SCHEDULED', 'ONGOING') AND end_time <= NOW()",
        )
        .execute(&self.db.pool)
        .await?
        .rows_affected();

        if started > 0 || completed > 0 {
            info!("Advanced sessions: {} started, {} completed", started, completed);
        } else {
            debug!("No session statuses to advance");
        }
        Ok((started, completed))
    }

    pub async fn get_session(&self, session_id: i64) -> Result<SessionDetails, Error> {
        let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(session_id)
            .fetch_optional(&self.db.pool)
            .await?
            .ok_or(Error::NotFound("Session", session_id))?;

        let available_seats: i64 = sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM seats WHERE hall_id = $1) - \
             (SELECT COUNT(*) FROM booking_seats bs \
              JOIN bookings b ON b.id = bs.booking_id \
              WHERE b.session_id = $2 AND b.status NOT IN ('CANCELLED', 'EXPIRED'))",
        )
        .bind(session.hall_id)
        .bind(session_id)
        .fetch_one(&self.db.pool)
        .await?;

        Ok(SessionDetails { session, available_seats })
    }

    /// SCHEDULED sessions starting on the given calendar date (UTC), in start
    /// order.
    pub async fn schedule_for_date(&self, date: NaiveDate) -> Result<Vec<Session>, Error> {
        let day_start = date.and_time(NaiveTime::MIN).and_utc();
        let day_end = day_start + Duration::days(1);
        let sessions = sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions \
             WHERE start_time >= $1 AND start_time < $2 AND status = 'SCHEDULED' \
             ORDER BY start_time, id",
        )
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(sessions)
    }

    /// Upcoming bookable sessions for a movie.
    pub async fn upcoming_for_movie(&self, movie_id: i64) -> Result<Vec<Session>, Error> {
        let movie_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM movies WHERE id = $1)")
                .bind(movie_id)
                .fetch_one(&self.db.pool)
                .await?;
        if !movie_exists {
            return Err(Error::NotFound("Movie", movie_id));
        }

        let sessions = sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions \
             WHERE movie_id = $1 AND status = 'SCHEDULED' AND start_time > NOW() \
             ORDER BY start_time, id",
        )
        .bind(movie_id)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(sessions)
    }
}
