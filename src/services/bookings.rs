//! Booking service: the seat-reservation hot path and the booking status
//! machine.
//!
//! Reservation runs in one transaction: validate the session, lock the
//! requested seat rows with `SELECT ... FOR UPDATE` in ascending id order,
//! re-check availability under the locks, then insert the PENDING booking and
//! its priced seats. Concurrent requests for overlapping seat sets serialize
//! on the row locks, so exactly one of them wins.
//!
//! Status changes never touch seat rows. They are compare-and-swap updates on
//! the booking's `version` column; a stale writer gets
//! `ConcurrentModification` and must re-read before retrying.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use tracing::{debug, info};

use crate::database::Database;
use crate::error::Error;
use crate::models::{Booking, BookingStatus, Seat, Session, User};
use crate::services::pricing;

/// A booked seat joined with its hall coordinates, for booking detail views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookedSeat {
    pub seat_id: i64,
    pub row_number: i32,
    pub seat_number: i32,
    pub price: Decimal,
}

/// Compact view of the session a booking belongs to.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionSummary {
    pub id: i64,
    pub movie_title: String,
    pub hall_name: String,
    pub start_time: DateTime<Utc>,
}

/// A booking together with its session and the seats it holds.
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub session: SessionSummary,
    pub seats: Vec<BookedSeat>,
    pub ticket_count: usize,
}

#[derive(Clone)]
pub struct BookingService {
    db: Database,
}

impl BookingService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Reserves `seat_ids` on a session for a user and creates a PENDING
    /// booking holding them.
    ///
    /// Seat rows are locked in ascending id order so that two requests with
    /// overlapping seat sets always collide on the lowest shared seat instead
    /// of deadlocking.
    pub async fn create_booking(
        &self,
        user_id: i64,
        session_id: i64,
        seat_ids: &[i64],
    ) -> Result<BookingDetails, Error> {
        let mut requested: Vec<i64> = seat_ids.to_vec();
        requested.sort_unstable();
        requested.dedup();
        if requested.is_empty() {
            return Err(Error::Validation("seat_ids must not be empty".into()));
        }
        if requested.len() != seat_ids.len() {
            return Err(Error::Validation("seat_ids must not contain duplicates".into()));
        }

        let mut tx = self.db.pool.begin().await?;

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(Error::NotFound("User", user_id))?;
        info!(
            "Creating booking for {} on session {} with {} seats",
            user.email,
            session_id,
            requested.len()
        );

        let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(session_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(Error::NotFound("Session", session_id))?;
        if !session.is_available_for_booking(Utc::now()) {
            return Err(Error::SessionNotAvailable(session_id));
        }

        // Lock the seat rows. Waiters queue here until the holder commits.
        let seats = sqlx::query_as::<_, Seat>(
            "SELECT * FROM seats WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&requested)
        .fetch_all(&mut *tx)
        .await?;

        if seats.len() != requested.len() {
            let found: Vec<i64> = seats.iter().map(|s| s.id).collect();
            let missing = requested
                .iter()
                .find(|id| !found.contains(id))
                .copied()
                .unwrap_or(session_id);
            return Err(Error::NotFound("Seat", missing));
        }
        for seat in &seats {
            if seat.hall_id != session.hall_id {
                return Err(Error::Validation(format!(
                    "Seat {} does not belong to hall {}",
                    seat.id, session.hall_id
                )));
            }
        }

        // Availability check under the locks: any live booking already holding
        // one of these seats on this session wins.
        let conflicts: Vec<i64> = sqlx::query_scalar(
            "SELECT bs.seat_id FROM booking_seats bs \
             JOIN bookings b ON b.id = bs.booking_id \
             WHERE b.session_id = $1 AND bs.seat_id = ANY($2) \
             AND b.status NOT IN ('CANCELLED', 'EXPIRED') \
             ORDER BY bs.seat_id",
        )
        .bind(session_id)
        .bind(&requested)
        .fetch_all(&mut *tx)
        .await?;
        if !conflicts.is_empty() {
            return Err(Error::SeatAlreadyBooked(conflicts));
        }

        let priced: Vec<(i64, Decimal)> = seats
            .iter()
            .map(|s| (s.id, pricing::seat_price(session.base_price, s.price_multiplier)))
            .collect();
        let total: Decimal = priced.iter().map(|(_, p)| *p).sum();

        let booking = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (user_id, session_id, total_price, status) \
             VALUES ($1, $2, $3, 'PENDING') RETURNING *",
        )
        .bind(user_id)
        .bind(session_id)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        let mut insert_seats =
            sqlx::QueryBuilder::new("INSERT INTO booking_seats (booking_id, seat_id, price) ");
        insert_seats.push_values(priced.iter().copied(), |mut row, (seat_id, price)| {
            row.push_bind(booking.id).push_bind(seat_id).push_bind(price);
        });
        insert_seats.build().execute(&mut *tx).await?;

        tx.commit().await?;

        info!(
            "Booking {} created: {} seats, total price {}",
            booking.id,
            priced.len(),
            booking.total_price
        );

        // `seats` and `priced` are parallel: both came from the locked rows.
        let seats: Vec<BookedSeat> = seats
            .iter()
            .zip(&priced)
            .map(|(seat, (_, price))| BookedSeat {
                seat_id: seat.id,
                row_number: seat.row_number,
                seat_number: seat.seat_number,
                price: *price,
            })
            .collect();
        let ticket_count = seats.len();
        let summary = self
            .session_summaries(&[session_id])
            .await?
            .remove(&session_id)
            .ok_or(Error::NotFound("Session", session_id))?;
        Ok(BookingDetails { booking, session: summary, seats, ticket_count })
    }

    /// Moves a booking to `target`, enforcing the transition table and the
    /// optimistic version check.
    pub async fn update_status(
        &self,
        booking_id: i64,
        target: BookingStatus,
    ) -> Result<Booking, Error> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&self.db.pool)
            .await?
            .ok_or(Error::NotFound("Booking", booking_id))?;
        self.apply_transition(&booking, target).await
    }

    /// The compare-and-swap half of a status change, keyed on the version of
    /// an already-read snapshot. If another writer bumped the version since
    /// the snapshot was taken, nothing is updated and the caller must re-read.
    pub async fn apply_transition(
        &self,
        booking: &Booking,
        target: BookingStatus,
    ) -> Result<Booking, Error> {
        if !booking.status.can_transition_to(target) {
            return Err(Error::InvalidBookingState { current: booking.status, target });
        }

        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $1, updated_at = NOW(), version = version + 1 \
             WHERE id = $2 AND version = $3 RETURNING *",
        )
        .bind(target)
        .bind(booking.id)
        .bind(booking.version)
        .fetch_optional(&self.db.pool)
        .await?
        .ok_or(Error::ConcurrentModification(booking.id))?;

        info!(
            "Booking {} moved from {} to {} (version {})",
            booking.id, booking.status, updated.status, updated.version
        );
        if updated.status.releases_seats() {
            info!("Booking {} released its seats back to sale", updated.id);
        }
        Ok(updated)
    }

    pub async fn confirm_booking(&self, booking_id: i64) -> Result<Booking, Error> {
        self.update_status(booking_id, BookingStatus::Confirmed).await
    }

    pub async fn cancel_booking(&self, booking_id: i64) -> Result<Booking, Error> {
        self.update_status(booking_id, BookingStatus::Cancelled).await
    }

    pub async fn get_booking(&self, booking_id: i64) -> Result<BookingDetails, Error> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&self.db.pool)
            .await?
            .ok_or(Error::NotFound("Booking", booking_id))?;
        let seats = self.seats_for(&[booking_id]).await?.remove(&booking_id).unwrap_or_default();
        let ticket_count = seats.len();
        let summary = self
            .session_summaries(&[booking.session_id])
            .await?
            .remove(&booking.session_id)
            .ok_or(Error::NotFound("Session", booking.session_id))?;
        Ok(BookingDetails { booking, session: summary, seats, ticket_count })
    }

    /// A user's bookings, newest first. `page` is 1-based.
    pub async fn list_user_bookings(
        &self,
        user_id: i64,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<BookingDetails>, Error> {
        let offset = (page.saturating_sub(1) as i64) * page_size as i64;
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page_size as i64)
        .bind(offset)
        .fetch_all(&self.db.pool)
        .await?;

        let ids: Vec<i64> = bookings.iter().map(|b| b.id).collect();
        let mut session_ids: Vec<i64> = bookings.iter().map(|b| b.session_id).collect();
        session_ids.sort_unstable();
        session_ids.dedup();

        let mut seats_by_booking = self.seats_for(&ids).await?;
        let summaries = self.session_summaries(&session_ids).await?;

        let mut details = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let summary = summaries
                .get(&booking.session_id)
                .cloned()
                .ok_or(Error::NotFound("Session", booking.session_id))?;
            let seats = seats_by_booking.remove(&booking.id).unwrap_or_default();
            let ticket_count = seats.len();
            details.push(BookingDetails { booking, session: summary, seats, ticket_count });
        }
        Ok(details)
    }

    /// Expires PENDING bookings created before the cutoff. Returns how many
    /// were flipped; bookings that changed status after the select round are
    /// skipped by the conditional update.
    pub async fn expire_pending_bookings(&self, max_age_minutes: i64) -> Result<u64, Error> {
        let cutoff = Utc::now() - Duration::minutes(max_age_minutes);
        let stale: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM bookings WHERE status = 'PENDING' AND created_at < $1")
                .bind(cutoff)
                .fetch_all(&self.db.pool)
                .await?;
        if stale.is_empty() {
            debug!("No pending bookings older than {} minutes", max_age_minutes);
            return Ok(0);
        }

        let result = sqlx::query(
            "UPDATE bookings SET status = 'EXPIRED', updated_at = NOW(), version = version + 1 \
             WHERE status = 'PENDING' AND id = ANY($1)",
        )
        .bind(&stale)
        .execute(&self.db.pool)
        .await?;
        let expired = result.rows_affected();
        info!("Expired {} pending bookings older than {} minutes", expired, max_age_minutes);
        Ok(expired)
    }

    async fn seats_for(&self, booking_ids: &[i64]) -> Result<BTreeMap<i64, Vec<BookedSeat>>, Error> {
        #[derive(FromRow)]
        struct Row {
            booking_id: i64,
            seat_id: i64,
            row_number: i32,
            seat_number: i32,
            price: Decimal,
        }

        let rows = sqlx::query_as::<_, Row>(
            "SELECT bs.booking_id, bs.seat_id, s.row_number, s.seat_number, bs.price \
             FROM booking_seats bs \
             JOIN seats s ON s.id = bs.seat_id \
             WHERE bs.booking_id = ANY($1) \
             ORDER BY s.row_number, s.seat_number",
        )
        .bind(booking_ids)
        .fetch_all(&self.db.pool)
        .await?;

        let mut grouped: BTreeMap<i64, Vec<BookedSeat>> = BTreeMap::new();
        for row in rows {
            grouped.entry(row.booking_id).or_default().push(BookedSeat {
                seat_id: row.seat_id,
                row_number: row.row_number,
                seat_number: row.seat_number,
                price: row.price,
            });
        }
        Ok(grouped)
    }

    async fn session_summaries(
        &self,
        session_ids: &[i64],
    ) -> Result<BTreeMap<i64, SessionSummary>, Error> {
        let rows = sqlx::query_as::<_, SessionSummary>(
            "SELECT s.id, m.title AS movie_title, h.name AS hall_name, s.start_time \
             FROM sessions s \
             JOIN movies m ON m.id = s.movie_id \
             JOIN halls h ON h.id = s.hall_id \
             WHERE s.id = ANY($1)",
        )
        .bind(session_ids)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(rows.into_iter().map(|s| (s.id, s)).collect())
    }
}
