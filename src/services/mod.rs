pub mod bookings;
pub mod pricing;
pub mod seats;
pub mod sessions;

pub use bookings::{BookedSeat, BookingDetails, BookingService, SessionSummary};
pub use seats::{SeatAvailability, SeatService};
pub use sessions::{SessionDetails, SessionService, SESSION_BUFFER_MINUTES};
