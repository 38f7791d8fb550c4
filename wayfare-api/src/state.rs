use std::sync::Arc;

use wayfare_store::{
    BookingRepository, DbClient, FlightRepository, HotelRepository, PgFlightCatalog,
    UserRepository,
};

#[derive(Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub token_minutes: i64,
    pub password_salt: String,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbClient>,
    pub auth: AuthSettings,
}

impl AppState {
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.db.pool.clone())
    }

    pub fn hotels(&self) -> HotelRepository {
        HotelRepository::new(self.db.pool.clone())
    }

    pub fn flights(&self) -> FlightRepository {
        FlightRepository::new(self.db.pool.clone())
    }

    pub fn bookings(&self) -> BookingRepository {
        BookingRepository::new(self.db.pool.clone())
    }

    pub fn flight_catalog(&self) -> PgFlightCatalog {
        PgFlightCatalog {
            pool: self.db.pool.clone(),
        }
    }
}
