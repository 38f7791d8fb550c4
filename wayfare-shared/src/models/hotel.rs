use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Standard,
    Large,
    Premium,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Standard => "standard",
            RoomType::Large => "large",
            RoomType::Premium => "premium",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(RoomType::Standard),
            "large" => Ok(RoomType::Large),
            "premium" => Ok(RoomType::Premium),
            other => Err(format!("unknown room type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelRecord {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub address: Option<String>,
    pub stars: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Count of available rooms, filled by list queries; 0 on create/update.
    #[serde(default)]
    pub room_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomRecord {
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub room_number: String,
    pub room_type: RoomType,
    pub price_per_night: f64,
    pub capacity: i32,
    pub room_count: i32,
    pub is_available: bool,
    pub features: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Display fields joined from the parent hotel where the query provides them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotel_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotel_city: Option<String>,
}
