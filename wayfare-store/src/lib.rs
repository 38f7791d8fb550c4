pub mod app_config;
pub mod booking_repo;
pub mod database;
mod error;
pub mod flight_repo;
pub mod hotel_repo;
pub mod user_repo;

pub use app_config::Config;
pub use booking_repo::BookingRepository;
pub use database::DbClient;
pub use flight_repo::{FlightRepository, PgFlightCatalog};
pub use hotel_repo::HotelRepository;
pub use user_repo::UserRepository;
