pub mod booking;
pub mod flight;
pub mod hotel;
pub mod user;

pub use booking::{BookingStatus, FlightBookingRecord, HotelBookingRecord};
pub use flight::FlightRecord;
pub use hotel::{HotelRecord, RoomRecord, RoomType};
pub use user::{UserRecord, UserRole};
