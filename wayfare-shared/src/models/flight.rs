use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serde adapter for the `YYYY-MM-DD HH:MM:SS` wire format used by flight
/// timestamps (space separator, no timezone).
pub mod wire_datetime {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightRecord {
    pub id: Uuid,
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
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl FlightRecord {
    /// Flight time in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.arrival_time - self.departure_time).num_minutes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> FlightRecord {
        FlightRecord {
            id: Uuid::new_v4(),
            flight_number: "SU100".to_string(),
            airline: "Aeroflot".to_string(),
            departure_city: "Moscow".to_string(),
            arrival_city: "Sochi".to_string(),
            departure_time: NaiveDate::from_ymd_opt(2025, 6, 15)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            arrival_time: NaiveDate::from_ymd_opt(2025, 6, 15)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
            price: 120.0,
            total_seats: 180,
            available_seats: 150,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_duration_minutes() {
        assert_eq!(sample().duration_minutes(), 150);
    }

    #[test]
    fn test_timestamps_use_space_separated_format() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["departure_time"], "2025-06-15 08:00:00");
        assert_eq!(json["arrival_time"], "2025-06-15 10:30:00");
    }

    #[test]
    fn test_wire_datetime_round_trip() {
        let flight = sample();
        let json = serde_json::to_string(&flight).unwrap();
        let back: FlightRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.departure_time, flight.departure_time);
    }
}
