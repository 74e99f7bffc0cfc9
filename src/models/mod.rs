pub mod booking;
pub mod hall;
pub mod movie;
pub mod seat;
pub mod session;
pub mod user;

pub use booking::{Booking, BookingStatus};
pub use hall::{Hall, HallType};
pub use movie::Movie;
pub use seat::{Seat, SeatType};
pub use session::{Session, SessionStatus};
pub use user::User;
