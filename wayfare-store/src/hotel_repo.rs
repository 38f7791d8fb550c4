use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::unexpected;
use wayfare_core::DomainError;
use wayfare_shared::models::{HotelRecord, RoomRecord, RoomType};

pub struct HotelRepository {
    pool: PgPool,
}

/// Payload for hotel create/update; the same shape serves both, as the
/// endpoints accept a full replacement.
#[derive(Debug, Deserialize)]
pub struct HotelInput {
    pub name: String,
    pub city: String,
    pub address: Option<String>,
    pub stars: i32,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoomInput {
    pub hotel_id: Uuid,
    pub room_number: String,
    pub room_type: RoomType,
    pub price_per_night: f64,
    pub capacity: i32,
    #[serde(default = "default_room_count")]
    pub room_count: i32,
    pub features: Option<String>,
}

fn default_room_count() -> i32 {
    1
}

#[derive(Debug, Default, Deserialize)]
pub struct HotelListFilter {
    pub city: Option<String>,
    pub stars: Option<i32>,
    #[serde(default)]
    pub sort_by_stars: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoomListFilter {
    pub hotel_id: Option<Uuid>,
    pub room_type: Option<RoomType>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_capacity: Option<i32>,
    #[serde(default)]
    pub sort_by_price: bool,
}

#[derive(sqlx::FromRow)]
struct HotelRow {
    id: Uuid,
    name: String,
    city: String,
    address: Option<String>,
    stars: i32,
    description: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    #[sqlx(default)]
    room_count: i64,
}

impl HotelRow {
    fn into_record(self) -> HotelRecord {
        HotelRecord {
            id: self.id,
            name: self.name,
            city: self.city,
            address: self.address,
            stars: self.stars,
            description: self.description,
            created_at: self.created_at,
            room_count: self.room_count,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct RoomRow {
    id: Uuid,
    hotel_id: Uuid,
    room_number: String,
    room_type: String,
    price_per_night: f64,
    capacity: i32,
    room_count: i32,
    is_available: bool,
    features: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    #[sqlx(default)]
    hotel_name: Option<String>,
    #[sqlx(default)]
    hotel_city: Option<String>,
}

impl RoomRow {
    pub(crate) fn into_record(self) -> Result<RoomRecord, DomainError> {
        let room_type = self
            .room_type
            .parse::<RoomType>()
            .map_err(DomainError::internal)?;
        Ok(RoomRecord {
            id: self.id,
            hotel_id: self.hotel_id,
            room_number: self.room_number,
            room_type,
            price_per_night: self.price_per_night,
            capacity: self.capacity,
            room_count: self.room_count,
            is_available: self.is_available,
            features: self.features,
            created_at: self.created_at,
            hotel_name: self.hotel_name,
            hotel_city: self.hotel_city,
        })
    }
}

pub(crate) const ROOM_WITH_HOTEL: &str = "SELECT r.id, r.hotel_id, r.room_number, r.room_type, \
     r.price_per_night, r.capacity, r.room_count, r.is_available, r.features, r.created_at, \
     h.name AS hotel_name, h.city AS hotel_city \
     FROM rooms r JOIN hotels h ON r.hotel_id = h.id";

impl HotelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &HotelListFilter) -> Result<Vec<HotelRecord>, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT h.id, h.name, h.city, h.address, h.stars, h.description, h.created_at, \
             COUNT(r.id) AS room_count \
             FROM hotels h \
             LEFT JOIN rooms r ON h.id = r.hotel_id AND r.is_available = TRUE \
             WHERE 1=1",
        );

        if let Some(city) = &filter.city {
            qb.push(" AND h.city ILIKE ");
            qb.push_bind(format!("%{city}%"));
        }
        if let Some(stars) = filter.stars {
            qb.push(" AND h.stars = ");
            qb.push_bind(stars);
        }

        qb.push(" GROUP BY h.id");
        if filter.sort_by_stars {
            qb.push(" ORDER BY h.stars DESC, h.name ASC");
        } else {
            qb.push(" ORDER BY h.name ASC");
        }

        let rows: Vec<HotelRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(rows.into_iter().map(HotelRow::into_record).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<HotelRecord>, DomainError> {
        let row = sqlx::query_as::<_, HotelRow>(
            "SELECT id, name, city, address, stars, description, created_at FROM hotels WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(row.map(HotelRow::into_record))
    }

    pub async fn create(&self, input: &HotelInput) -> Result<HotelRecord, DomainError> {
        let row = sqlx::query_as::<_, HotelRow>(
            "INSERT INTO hotels (name, city, address, stars, description) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, city, address, stars, description, created_at",
        )
        .bind(&input.name)
        .bind(&input.city)
        .bind(&input.address)
        .bind(input.stars)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(row.into_record())
    }

    pub async fn update(&self, id: Uuid, input: &HotelInput) -> Result<HotelRecord, DomainError> {
        let row = sqlx::query_as::<_, HotelRow>(
            "UPDATE hotels SET name = $1, city = $2, address = $3, stars = $4, description = $5 \
             WHERE id = $6 \
             RETURNING id, name, city, address, stars, description, created_at",
        )
        .bind(&input.name)
        .bind(&input.city)
        .bind(&input.address)
        .bind(input.stars)
        .bind(&input.description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        row.map(HotelRow::into_record)
            .ok_or_else(|| DomainError::not_found("Hotel not found"))
    }

    /// Removes the hotel; rooms and their bookings go with it via the
    /// cascade constraints.
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM hotels WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Hotel not found"));
        }
        Ok(())
    }

    pub async fn list_rooms(&self, filter: &RoomListFilter) -> Result<Vec<RoomRecord>, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new(ROOM_WITH_HOTEL);
        qb.push(" WHERE r.is_available = TRUE");

        if let Some(hotel_id) = filter.hotel_id {
            qb.push(" AND r.hotel_id = ");
            qb.push_bind(hotel_id);
        }
        if let Some(room_type) = filter.room_type {
            qb.push(" AND r.room_type = ");
            qb.push_bind(room_type.as_str());
        }
        if let Some(min_price) = filter.min_price {
            qb.push(" AND r.price_per_night >= ");
            qb.push_bind(min_price);
        }
        if let Some(max_price) = filter.max_price {
            qb.push(" AND r.price_per_night <= ");
            qb.push_bind(max_price);
        }
        if let Some(min_capacity) = filter.min_capacity {
            qb.push(" AND r.capacity >= ");
            qb.push_bind(min_capacity);
        }

        if filter.sort_by_price {
            qb.push(" ORDER BY r.price_per_night ASC");
        } else {
            qb.push(" ORDER BY r.hotel_id, r.room_number ASC");
        }

        let rows: Vec<RoomRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        rows.into_iter().map(RoomRow::into_record).collect()
    }

    pub async fn get_room(&self, id: Uuid) -> Result<Option<RoomRecord>, DomainError> {
        let row = sqlx::query_as::<_, RoomRow>(&format!("{ROOM_WITH_HOTEL} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;

        row.map(RoomRow::into_record).transpose()
    }

    pub async fn create_room(&self, input: &RoomInput) -> Result<RoomRecord, DomainError> {
        if self.get(input.hotel_id).await?.is_none() {
            return Err(DomainError::not_found("Hotel not found"));
        }

        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO rooms (hotel_id, room_number, room_type, price_per_night, capacity, room_count, features) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(input.hotel_id)
        .bind(&input.room_number)
        .bind(input.room_type.as_str())
        .bind(input.price_per_night)
        .bind(input.capacity)
        .bind(input.room_count)
        .bind(&input.features)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        self.get_room(id)
            .await?
            .ok_or_else(|| DomainError::internal("room vanished after insert"))
    }

    pub async fn update_room(&self, id: Uuid, input: &RoomInput) -> Result<RoomRecord, DomainError> {
        let result = sqlx::query(
            "UPDATE rooms SET hotel_id = $1, room_number = $2, room_type = $3, \
             price_per_night = $4, capacity = $5, room_count = $6, features = $7 WHERE id = $8",
        )
        .bind(input.hotel_id)
        .bind(&input.room_number)
        .bind(input.room_type.as_str())
        .bind(input.price_per_night)
        .bind(input.capacity)
        .bind(input.room_count)
        .bind(&input.features)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Room not found"));
        }

        self.get_room(id)
            .await?
            .ok_or_else(|| DomainError::internal("room vanished after update"))
    }

    pub async fn delete_room(&self, id: Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Room not found"));
        }
        Ok(())
    }
}
