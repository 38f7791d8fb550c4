use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::unexpected;
use wayfare_core::repository::FlightCatalog;
use wayfare_core::DomainError;
use wayfare_shared::models::flight::wire_datetime;
use wayfare_shared::models::FlightRecord;

pub struct FlightRepository {
    pool: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct FlightInput {
    pub flight_number: String,
    pub airline: String,
    pub departure_city: String,
    pub arrival_city: String,
    #[serde(with = "wire_datetime")]
    pub departure_time: NaiveDateTime,
    #[serde(with = "wire_datetime")]
    pub arrival_time: NaiveDateTime,
    pub price: f64,
    pub total_seats: i32,
    pub available_seats: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct FlightListFilter {
    pub departure_city: Option<String>,
    pub arrival_city: Option<String>,
    #[serde(default)]
    pub sort_by_price: bool,
}

const FLIGHT_COLUMNS: &str = "id, flight_number, airline, departure_city, arrival_city, \
     departure_time, arrival_time, price, total_seats, available_seats, is_active, created_at";

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: Uuid,
    flight_number: String,
    airline: String,
    departure_city: String,
    arrival_city: String,
    departure_time: NaiveDateTime,
    arrival_time: NaiveDateTime,
    price: f64,
    total_seats: i32,
    available_seats: i32,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl FlightRow {
    fn into_record(self) -> FlightRecord {
        FlightRecord {
            id: self.id,
            flight_number: self.flight_number,
            airline: self.airline,
            departure_city: self.departure_city,
            arrival_city: self.arrival_city,
            departure_time: self.departure_time,
            arrival_time: self.arrival_time,
            price: self.price,
            total_seats: self.total_seats,
            available_seats: self.available_seats,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

impl FlightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Generic listing: substring city filters, active flights only.
    pub async fn list(&self, filter: &FlightListFilter) -> Result<Vec<FlightRecord>, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights WHERE is_active = TRUE"
        ));

        if let Some(city) = &filter.departure_city {
            qb.push(" AND departure_city ILIKE ");
            qb.push_bind(format!("%{city}%"));
        }
        if let Some(city) = &filter.arrival_city {
            qb.push(" AND arrival_city ILIKE ");
            qb.push_bind(format!("%{city}%"));
        }

        if filter.sort_by_price {
            qb.push(" ORDER BY price ASC");
        } else {
            qb.push(" ORDER BY departure_time ASC");
        }

        let rows: Vec<FlightRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(rows.into_iter().map(FlightRow::into_record).collect())
    }

    pub async fn create(&self, input: &FlightInput) -> Result<FlightRecord, DomainError> {
        let row = sqlx::query_as::<_, FlightRow>(&format!(
            "INSERT INTO flights (flight_number, airline, departure_city, arrival_city, \
             departure_time, arrival_time, price, total_seats, available_seats) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {FLIGHT_COLUMNS}"
        ))
        .bind(&input.flight_number)
        .bind(&input.airline)
        .bind(&input.departure_city)
        .bind(&input.arrival_city)
        .bind(input.departure_time)
        .bind(input.arrival_time)
        .bind(input.price)
        .bind(input.total_seats)
        .bind(input.available_seats)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(row.into_record())
    }

    pub async fn update(&self, id: Uuid, input: &FlightInput) -> Result<FlightRecord, DomainError> {
        let row = sqlx::query_as::<_, FlightRow>(&format!(
            "UPDATE flights SET flight_number = $1, airline = $2, departure_city = $3, \
             arrival_city = $4, departure_time = $5, arrival_time = $6, price = $7, \
             total_seats = $8, available_seats = $9 WHERE id = $10 RETURNING {FLIGHT_COLUMNS}"
        ))
        .bind(&input.flight_number)
        .bind(&input.airline)
        .bind(&input.departure_city)
        .bind(&input.arrival_city)
        .bind(input.departure_time)
        .bind(input.arrival_time)
        .bind(input.price)
        .bind(input.total_seats)
        .bind(input.available_seats)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        row.map(FlightRow::into_record)
            .ok_or_else(|| DomainError::not_found("Flight not found"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM flights WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Flight not found"));
        }
        Ok(())
    }
}

/// Postgres-backed candidate queries for the route search engine.
pub struct PgFlightCatalog {
    pub pool: PgPool,
}

#[async_trait]
impl FlightCatalog for PgFlightCatalog {
    async fn direct_flights(
        &self,
        departure_city: &str,
        arrival_city: &str,
        date: NaiveDate,
        min_seats: i32,
    ) -> Result<Vec<FlightRecord>, DomainError> {
        let rows = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights \
             WHERE LOWER(departure_city) = LOWER($1) AND LOWER(arrival_city) = LOWER($2) \
             AND departure_time::date = $3 AND available_seats >= $4 AND is_active = TRUE \
             ORDER BY price ASC, departure_time ASC"
        ))
        .bind(departure_city)
        .bind(arrival_city)
        .bind(date)
        .bind(min_seats)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(rows.into_iter().map(FlightRow::into_record).collect())
    }

    async fn departures(
        &self,
        departure_city: &str,
        date: NaiveDate,
        min_seats: i32,
    ) -> Result<Vec<FlightRecord>, DomainError> {
        let rows = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights \
             WHERE LOWER(departure_city) = LOWER($1) \
             AND departure_time::date = $2 AND available_seats >= $3 AND is_active = TRUE \
             ORDER BY departure_time ASC"
        ))
        .bind(departure_city)
        .bind(date)
        .bind(min_seats)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(rows.into_iter().map(FlightRow::into_record).collect())
    }

    async fn onward_flights(
        &self,
        departure_city: &str,
        arrival_city: &str,
        after: NaiveDateTime,
        latest: NaiveDateTime,
        min_seats: i32,
    ) -> Result<Vec<FlightRecord>, DomainError> {
        let rows = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights \
             WHERE LOWER(departure_city) = LOWER($1) AND LOWER(arrival_city) = LOWER($2) \
             AND departure_time > $3 AND departure_time <= $4 \
             AND available_seats >= $5 AND is_active = TRUE \
             ORDER BY departure_time ASC"
        ))
        .bind(departure_city)
        .bind(arrival_city)
        .bind(after)
        .bind(latest)
        .bind(min_seats)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(rows.into_iter().map(FlightRow::into_record).collect())
    }
}
