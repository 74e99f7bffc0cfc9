use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "session_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub id: i64,
    pub movie_id: i64,
    pub hall_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub base_price: Decimal,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Bookable only while SCHEDULED and strictly before showtime.
    pub fn is_available_for_booking(&self, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Scheduled && self.start_time > now
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now > self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session_at(status: SessionStatus, start: DateTime<Utc>) -> Session {
        Session {
            id: 1,
            movie_id: 1,
            hall_id: 1,
            start_time: start,
            end_time: start + chrono::Duration::minutes(120),
            base_price: Decimal::new(1000, 2),
            status,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn scheduled_future_session_is_bookable() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let s = session_at(SessionStatus::Scheduled, now + chrono::Duration::hours(2));
        assert!(s.is_available_for_booking(now));
        assert!(!s.has_started(now));
    }

    #[test]
    fn started_or_non_scheduled_sessions_are_not_bookable() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        let started = session_at(SessionStatus::Scheduled, now - chrono::Duration::minutes(1));
        assert!(!started.is_available_for_booking(now));
        assert!(started.has_started(now));

        // Start exactly "now" is not strictly in the future
        let boundary = session_at(SessionStatus::Scheduled, now);
        assert!(!boundary.is_available_for_booking(now));

        for status in [
            SessionStatus::Ongoing,
            SessionStatus::Completed,
            SessionStatus::Cancelled,
        ] {
            let s = session_at(status, now + chrono::Duration::hours(2));
            assert!(!s.is_available_for_booking(now));
        }
    }
}
