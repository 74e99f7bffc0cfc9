use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Booking lifecycle. The only legal moves are the ones
/// `can_transition_to` admits; a status never goes backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Expired,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
        BookingStatus::Expired,
    ];

    /// Pure transition table: PENDING -> {CONFIRMED, CANCELLED, EXPIRED},
    /// CONFIRMED -> {COMPLETED, CANCELLED}, terminal states admit nothing.
    pub fn can_transition_to(self, target: BookingStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match self {
            BookingStatus::Pending => matches!(
                target,
                BookingStatus::Confirmed | BookingStatus::Cancelled | BookingStatus::Expired
            ),
            BookingStatus::Confirmed => {
                matches!(target, BookingStatus::Completed | BookingStatus::Cancelled)
            }
            // Terminal states returned above.
            _ => false,
        }
    }

    /// CANCELLED and EXPIRED bookings no longer hold their seats;
    /// COMPLETED ones do (the screening took place).
    pub fn releases_seats(self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Expired)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::Expired
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Expired => "EXPIRED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub session_id: i64,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

#[cfg(test)]
mod tests {
    use super::BookingStatus::{self, *};
    use proptest::prelude::*;

    #[test]
    fn transition_matrix_covers_every_state_pair() {
        let legal = |from: BookingStatus, to: BookingStatus| match (from, to) {
            (Pending, Confirmed) | (Pending, Cancelled) | (Pending, Expired) => true,
            (Confirmed, Completed) | (Confirmed, Cancelled) => true,
            _ => false,
        };
        for from in BookingStatus::ALL {
            for to in BookingStatus::ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    legal(from, to),
                    "transition {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn terminal_states_admit_no_transition() {
        for from in [Completed, Cancelled, Expired] {
            assert!(from.is_terminal());
            for to in BookingStatus::ALL {
                assert!(!from.can_transition_to(to));
            }
        }
    }

    #[test]
    fn only_cancelled_and_expired_release_seats() {
        assert!(Cancelled.releases_seats());
        assert!(Expired.releases_seats());
        for held in [Pending, Confirmed, Completed] {
            assert!(!held.releases_seats());
        }
    }

    fn any_status() -> impl Strategy<Value = BookingStatus> {
        prop::sample::select(BookingStatus::ALL.to_vec())
    }

    proptest! {
        // The graph is a DAG: no self-loops and no way back across any edge.
        #[test]
        fn transitions_never_go_backwards(a in any_status(), b in any_status()) {
            prop_assert!(!a.can_transition_to(a));
            if a.can_transition_to(b) {
                prop_assert!(!b.can_transition_to(a));
            }
        }
    }
}
