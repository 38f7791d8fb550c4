use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::DomainError;
use wayfare_shared::models::FlightRecord;

/// Catalog queries the route search engine runs against storage. The
/// Postgres implementation lives in `wayfare-store`; tests use an
/// in-memory one.
#[async_trait]
pub trait FlightCatalog: Send + Sync {
    /// Active flights between two cities (case-insensitive exact match)
    /// departing on `date` with at least `min_seats` available.
    async fn direct_flights(
        &self,
        departure_city: &str,
        arrival_city: &str,
        date: NaiveDate,
        min_seats: i32,
    ) -> Result<Vec<FlightRecord>, DomainError>;

    /// All active departures from a city on `date` with seats; these are
    /// the candidate first legs of a connecting itinerary.
    async fn departures(
        &self,
        departure_city: &str,
        date: NaiveDate,
        min_seats: i32,
    ) -> Result<Vec<FlightRecord>, DomainError>;

    /// Active flights between two cities departing strictly after `after`
    /// and no later than `latest`, with seats. Candidate second legs; the
    /// engine applies the exact layover window on top.
    async fn onward_flights(
        &self,
        departure_city: &str,
        arrival_city: &str,
        after: NaiveDateTime,
        latest: NaiveDateTime,
        min_seats: i32,
    ) -> Result<Vec<FlightRecord>, DomainError>;
}
