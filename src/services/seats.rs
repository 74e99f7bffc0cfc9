//! Seat queries: hall layouts and per-session availability maps.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::database::Database;
use crate::error::Error;
use crate::models::Seat;

/// A seat in a session's hall, flagged with whether it can still be booked.
#[derive(Debug, Clone, Serialize)]
pub struct SeatAvailability {
    #[serde(flatten)]
    pub seat: Seat,
    pub label: String,
    pub available: bool,
}

#[derive(Clone)]
pub struct SeatService {
    db: Database,
}

impl SeatService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Seats holding a live booking on this session. CANCELLED and EXPIRED
    /// bookings do not count; their seats are free again.
    pub async fn booked_seat_ids(&self, session_id: i64) -> Result<Vec<i64>, Error> {
        let ids = sqlx::query_scalar(
            "SELECT bs.seat_id FROM booking_seats bs \
             JOIN bookings b ON b.id = bs.booking_id \
             WHERE b.session_id = $1 AND b.status NOT IN ('CANCELLED', 'EXPIRED') \
             ORDER BY bs.seat_id",
        )
        .bind(session_id)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(ids)
    }

    /// The full seat map of a session's hall with availability flags, in
    /// row/seat order. This is a point-in-time snapshot; only the locking in
    /// booking creation is authoritative.
    pub async fn seat_map(&self, session_id: i64) -> Result<Vec<SeatAvailability>, Error> {
        let hall_id: i64 = sqlx::query_scalar("SELECT hall_id FROM sessions WHERE id = $1")
            .bind(session_id)
            .fetch_optional(&self.db.pool)
            .await?
            .ok_or(Error::NotFound("Session", session_id))?;

        let seats = sqlx::query_as::<_, Seat>(
            "SELECT * FROM seats WHERE hall_id = $1 ORDER BY row_number, seat_number",
        )
        .bind(hall_id)
        .fetch_all(&self.db.pool)
        .await?;

        let booked: HashSet<i64> = self.booked_seat_ids(session_id).await?.into_iter().collect();
        debug!(
            "Seat map for session {}: {} seats, {} booked",
            session_id,
            seats.len(),
            booked.len()
        );

        Ok(seats
            .into_iter()
            .map(|seat| {
                let available = !booked.contains(&seat.id);
                let label = seat.label();
                SeatAvailability { seat, label, available }
            })
            .collect())
    }

    /// Physical layout of a hall, independent of any session.
    pub async fn hall_seats(&self, hall_id: i64) -> Result<Vec<Seat>, Error> {
        let hall_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM halls WHERE id = $1)")
                .bind(hall_id)
                .fetch_one(&self.db.pool)
                .await?;
        if !hall_exists {
            return Err(Error::NotFound("Hall", hall_id));
        }

        let seats = sqlx::query_as::<_, Seat>(
            "SELECT * FROM seats WHERE hall_id = $1 ORDER BY row_number, seat_number",
        )
        .bind(hall_id)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(seats)
    }
}
