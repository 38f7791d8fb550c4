use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{is_unique_violation, unexpected};
use crate::hotel_repo::{RoomRow, ROOM_WITH_HOTEL};
use wayfare_core::{availability, ledger, DomainError};
use wayfare_shared::models::{
    BookingStatus, FlightBookingRecord, HotelBookingRecord, RoomRecord, UserRecord, UserRole,
};

pub struct BookingRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct HotelBookingRow {
    id: Uuid,
    user_id: Uuid,
    room_id: Uuid,
    check_in_date: NaiveDate,
    check_out_date: NaiveDate,
    total_price: f64,
    status: String,
    guest_count: i32,
    created_at: DateTime<Utc>,
    #[sqlx(default)]
    room_number: Option<String>,
    #[sqlx(default)]
    hotel_name: Option<String>,
}

impl HotelBookingRow {
    fn into_record(self) -> Result<HotelBookingRecord, DomainError> {
        let status = self
            .status
            .parse::<BookingStatus>()
            .map_err(DomainError::internal)?;
        Ok(HotelBookingRecord {
            id: self.id,
            user_id: self.user_id,
            room_id: self.room_id,
            check_in_date: self.check_in_date,
            check_out_date: self.check_out_date,
            total_price: self.total_price,
            status,
            guest_count: self.guest_count,
            created_at: self.created_at,
            room_number: self.room_number,
            hotel_name: self.hotel_name,
            nights_count: None,
        })
    }
}

#[derive(sqlx::FromRow)]
struct FlightBookingRow {
    id: Uuid,
    user_id: Uuid,
    flight_id: Uuid,
    passenger_count: i32,
    total_price: f64,
    status: String,
    booking_reference: String,
    created_at: DateTime<Utc>,
    #[sqlx(default)]
    flight_number: Option<String>,
    #[sqlx(default)]
    departure_city: Option<String>,
    #[sqlx(default)]
    arrival_city: Option<String>,
}

impl FlightBookingRow {
    fn into_record(self) -> Result<FlightBookingRecord, DomainError> {
        let status = self
            .status
            .parse::<BookingStatus>()
            .map_err(DomainError::internal)?;
        Ok(FlightBookingRecord {
            id: self.id,
            user_id: self.user_id,
            flight_id: self.flight_id,
            passenger_count: self.passenger_count,
            total_price: self.total_price,
            status,
            booking_reference: self.booking_reference,
            created_at: self.created_at,
            flight_number: self.flight_number,
            departure_city: self.departure_city,
            arrival_city: self.arrival_city,
        })
    }
}

/// Room fields needed while holding the row lock during booking creation.
#[derive(sqlx::FromRow)]
struct LockedRoomRow {
    price_per_night: f64,
    capacity: i32,
    room_number: String,
    hotel_name: String,
}

#[derive(sqlx::FromRow)]
struct StayRow {
    check_in_date: NaiveDate,
    check_out_date: NaiveDate,
    status: String,
}

impl StayRow {
    fn blocks_inventory(&self) -> bool {
        self.status
            .parse::<BookingStatus>()
            .map_or(false, |s| s.blocks_inventory())
    }
}

/// Flight fields needed while holding the row lock during booking.
#[derive(sqlx::FromRow)]
struct LockedFlightRow {
    flight_number: String,
    departure_city: String,
    arrival_city: String,
    price: f64,
    available_seats: i32,
}

const HOTEL_BOOKING_LISTING: &str = "SELECT hb.id, hb.user_id, hb.room_id, hb.check_in_date, \
     hb.check_out_date, hb.total_price, hb.status, hb.guest_count, hb.created_at, \
     r.room_number, h.name AS hotel_name \
     FROM hotel_bookings hb \
     JOIN rooms r ON hb.room_id = r.id \
     JOIN hotels h ON r.hotel_id = h.id";

const FLIGHT_BOOKING_LISTING: &str = "SELECT fb.id, fb.user_id, fb.flight_id, fb.passenger_count, \
     fb.total_price, fb.status, fb.booking_reference, fb.created_at, \
     f.flight_number, f.departure_city, f.arrival_city \
     FROM flight_bookings fb \
     JOIN flights f ON fb.flight_id = f.id";

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a confirmed stay. The room row is locked for the duration
    /// of the transaction, so two concurrent requests for the same room
    /// serialize and the loser sees the winner's booking in the overlap
    /// scan.
    pub async fn create_hotel_booking(
        &self,
        user_id: Uuid,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guest_count: i32,
    ) -> Result<HotelBookingRecord, DomainError> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let room = sqlx::query_as::<_, LockedRoomRow>(
            "SELECT r.price_per_night, r.capacity, r.room_number, h.name AS hotel_name \
             FROM rooms r JOIN hotels h ON r.hotel_id = h.id \
             WHERE r.id = $1 AND r.is_available = TRUE FOR UPDATE OF r",
        )
        .bind(room_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| DomainError::not_found("Room not found or not available"))?;

        ledger::ensure_capacity(room.capacity, guest_count)?;

        let existing = sqlx::query_as::<_, StayRow>(
            "SELECT check_in_date, check_out_date, status FROM hotel_bookings WHERE room_id = $1",
        )
        .bind(room_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(unexpected)?;

        let taken = existing.iter().any(|stay| {
            stay.blocks_inventory()
                && availability::overlaps(stay.check_in_date, stay.check_out_date, check_in, check_out)
        });
        if taken {
            return Err(DomainError::conflict("Room not available for selected dates"));
        }

        let nights = availability::nights(check_in, check_out);
        let total_price = ledger::hotel_booking_total(room.price_per_night, nights);

        let (id, created_at) = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            "INSERT INTO hotel_bookings \
             (user_id, room_id, check_in_date, check_out_date, total_price, guest_count, status) \
             VALUES ($1, $2, $3, $4, $5, $6, 'confirmed') RETURNING id, created_at",
        )
        .bind(user_id)
        .bind(room_id)
        .bind(check_in)
        .bind(check_out)
        .bind(total_price)
        .bind(guest_count)
        .fetch_one(&mut *tx)
        .await
        .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;

        tracing::info!(booking_id = %id, %room_id, nights, "hotel booking created");

        Ok(HotelBookingRecord {
            id,
            user_id,
            room_id,
            check_in_date: check_in,
            check_out_date: check_out,
            total_price,
            status: BookingStatus::Confirmed,
            guest_count,
            created_at,
            room_number: Some(room.room_number),
            hotel_name: Some(room.hotel_name),
            nights_count: Some(nights),
        })
    }

    pub async fn find_hotel_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<HotelBookingRecord>, DomainError> {
        let row = sqlx::query_as::<_, HotelBookingRow>(
            "SELECT id, user_id, room_id, check_in_date, check_out_date, total_price, status, \
             guest_count, created_at FROM hotel_bookings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        row.map(HotelBookingRow::into_record).transpose()
    }

    /// Marks the booking cancelled. Policy checks (ownership, timing,
    /// repeat cancellation) happen in the handler before this runs.
    pub async fn cancel_hotel_booking(&self, id: Uuid) -> Result<(), DomainError> {
        sqlx::query("UPDATE hotel_bookings SET status = 'cancelled' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    pub async fn list_hotel_bookings(
        &self,
        viewer: &UserRecord,
    ) -> Result<Vec<HotelBookingRecord>, DomainError> {
        let rows: Vec<HotelBookingRow> = if viewer.role == UserRole::Admin {
            sqlx::query_as(&format!("{HOTEL_BOOKING_LISTING} ORDER BY hb.created_at DESC"))
                .fetch_all(&self.pool)
                .await
                .map_err(unexpected)?
        } else {
            sqlx::query_as(&format!(
                "{HOTEL_BOOKING_LISTING} WHERE hb.user_id = $1 ORDER BY hb.created_at DESC"
            ))
            .bind(viewer.id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?
        };

        rows.into_iter().map(HotelBookingRow::into_record).collect()
    }

    /// Rooms free over `[check_in, check_out)`, optionally narrowed to a
    /// hotel or a city, priced ascending.
    pub async fn available_rooms(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        hotel_id: Option<Uuid>,
        city: Option<&str>,
    ) -> Result<Vec<RoomRecord>, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new(ROOM_WITH_HOTEL);
        qb.push(" WHERE r.is_available = TRUE AND r.id NOT IN (");
        qb.push("SELECT room_id FROM hotel_bookings WHERE status IN ('pending', 'confirmed') AND check_in_date < ");
        qb.push_bind(check_out);
        qb.push(" AND check_out_date > ");
        qb.push_bind(check_in);
        qb.push(")");

        if let Some(hotel_id) = hotel_id {
            qb.push(" AND r.hotel_id = ");
            qb.push_bind(hotel_id);
        }
        if let Some(city) = city {
            qb.push(" AND h.city ILIKE ");
            qb.push_bind(format!("%{city}%"));
        }

        qb.push(" ORDER BY r.price_per_night ASC");

        let rows: Vec<RoomRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        rows.into_iter().map(RoomRow::into_record).collect()
    }

    /// Books seats on a flight. Insert and seat decrement share one
    /// transaction with the flight row locked, so concurrent requests
    /// cannot both pass the seat check and oversell. Retries a few times
    /// on the off chance the random reference collides.
    pub async fn book_flight(
        &self,
        user_id: Uuid,
        flight_id: Uuid,
        passenger_count: i32,
    ) -> Result<FlightBookingRecord, DomainError> {
        for _ in 0..3 {
            if let Some(record) = self.try_book_flight(user_id, flight_id, passenger_count).await? {
                return Ok(record);
            }
        }
        Err(DomainError::internal(
            "could not allocate a unique booking reference",
        ))
    }

    /// One booking attempt; `Ok(None)` means the generated reference
    /// collided and the caller should retry with a fresh one.
    async fn try_book_flight(
        &self,
        user_id: Uuid,
        flight_id: Uuid,
        passenger_count: i32,
    ) -> Result<Option<FlightBookingRecord>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let flight = sqlx::query_as::<_, LockedFlightRow>(
            "SELECT flight_number, departure_city, arrival_city, price, available_seats \
             FROM flights WHERE id = $1 AND is_active = TRUE FOR UPDATE",
        )
        .bind(flight_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| DomainError::not_found("Flight not found"))?;

        ledger::ensure_seats_available(flight.available_seats, passenger_count)?;

        let total_price = ledger::flight_booking_total(flight.price, passenger_count);
        let booking_reference = ledger::generate_booking_reference();

        let inserted = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            "INSERT INTO flight_bookings \
             (user_id, flight_id, passenger_count, total_price, booking_reference, status) \
             VALUES ($1, $2, $3, $4, $5, 'confirmed') RETURNING id, created_at",
        )
        .bind(user_id)
        .bind(flight_id)
        .bind(passenger_count)
        .bind(total_price)
        .bind(&booking_reference)
        .fetch_one(&mut *tx)
        .await;

        let (id, created_at) = match inserted {
            Ok(row) => row,
            Err(e) if is_unique_violation(&e) => {
                tx.rollback().await.map_err(unexpected)?;
                return Ok(None);
            }
            Err(e) => return Err(unexpected(e)),
        };

        sqlx::query("UPDATE flights SET available_seats = available_seats - $1 WHERE id = $2")
            .bind(passenger_count)
            .bind(flight_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;

        tracing::info!(booking_id = %id, %flight_id, passenger_count, %booking_reference, "flight booked");

        Ok(Some(FlightBookingRecord {
            id,
            user_id,
            flight_id,
            passenger_count,
            total_price,
            status: BookingStatus::Confirmed,
            booking_reference,
            created_at,
            flight_number: Some(flight.flight_number),
            departure_city: Some(flight.departure_city),
            arrival_city: Some(flight.arrival_city),
        }))
    }

    pub async fn list_flight_bookings(
        &self,
        viewer: &UserRecord,
    ) -> Result<Vec<FlightBookingRecord>, DomainError> {
        let rows: Vec<FlightBookingRow> = if viewer.role == UserRole::Admin {
            sqlx::query_as(&format!("{FLIGHT_BOOKING_LISTING} ORDER BY fb.created_at DESC"))
                .fetch_all(&self.pool)
                .await
                .map_err(unexpected)?
        } else {
            sqlx::query_as(&format!(
                "{FLIGHT_BOOKING_LISTING} WHERE fb.user_id = $1 ORDER BY fb.created_at DESC"
            ))
            .bind(viewer.id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?
        };

        rows.into_iter().map(FlightBookingRow::into_record).collect()
    }
}
