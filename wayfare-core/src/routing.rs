use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ledger::round_money;
use crate::repository::FlightCatalog;
use wayfare_shared::models::FlightRecord;

/// Layover window for connecting itineraries, inclusive on both ends.
pub const MIN_LAYOVER_MINUTES: i64 = 60;
pub const MAX_LAYOVER_MINUTES: i64 = 1440;

#[derive(Debug, Clone, Deserialize)]
pub struct RouteQuery {
    pub departure_city: String,
    pub arrival_city: String,
    pub departure_date: NaiveDate,
    #[serde(default = "default_passenger_count")]
    pub passenger_count: i32,
    pub via_city: Option<String>,
}

fn default_passenger_count() -> i32 {
    1
}

/// One or two flight legs priced and timed as a unit.
#[derive(Debug, Clone, Serialize)]
pub struct Itinerary {
    pub segments: Vec<FlightRecord>,
    pub total_price: f64,
    pub total_duration_minutes: i64,
    pub is_cheapest: bool,
    pub is_fastest: bool,
    pub connection_cities: Vec<String>,
    pub layover_minutes: Option<i64>,
    pub stops_count: u32,
}

pub struct RouteSearchEngine<C> {
    catalog: C,
}

impl<C: FlightCatalog> RouteSearchEngine<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Direct and one-stop itineraries for the query, tagged and sorted.
    /// No matching flights is an empty result, not an error.
    pub async fn search(&self, query: &RouteQuery) -> Result<Vec<Itinerary>, DomainError> {
        if query.passenger_count < 1 {
            return Err(DomainError::invalid("Passenger count must be at least 1"));
        }

        let mut routes: Vec<Itinerary> = self
            .catalog
            .direct_flights(
                &query.departure_city,
                &query.arrival_city,
                query.departure_date,
                query.passenger_count,
            )
            .await?
            .iter()
            .map(|flight| direct_itinerary(flight, query.passenger_count))
            .collect();

        match &query.via_city {
            Some(via) => self.collect_connections_via(query, via, &mut routes).await?,
            None => self.collect_connections(query, &mut routes).await?,
        }

        tracing::debug!(
            departure = %query.departure_city,
            arrival = %query.arrival_city,
            options = routes.len(),
            "route search complete"
        );

        Ok(finalize_routes(routes))
    }

    /// Unconstrained one-stop join: any same-day departure from the origin
    /// is a candidate first leg, its arrival city the connection point.
    async fn collect_connections(
        &self,
        query: &RouteQuery,
        routes: &mut Vec<Itinerary>,
    ) -> Result<(), DomainError> {
        let first_legs = self
            .catalog
            .departures(&query.departure_city, query.departure_date, query.passenger_count)
            .await?;

        for first in first_legs {
            // A leg that already lands at the destination is a direct
            // flight, not a connection.
            if first.arrival_city.to_lowercase() == query.arrival_city.to_lowercase() {
                continue;
            }
            self.join_second_legs(query, &first, &first.arrival_city, routes)
                .await?;
        }
        Ok(())
    }

    /// Via-city join: first leg pinned to origin -> via, second to
    /// via -> destination; same layover window.
    async fn collect_connections_via(
        &self,
        query: &RouteQuery,
        via_city: &str,
        routes: &mut Vec<Itinerary>,
    ) -> Result<(), DomainError> {
        let first_legs = self
            .catalog
            .direct_flights(
                &query.departure_city,
                via_city,
                query.departure_date,
                query.passenger_count,
            )
            .await?;

        for first in first_legs {
            self.join_second_legs(query, &first, via_city, routes).await?;
        }
        Ok(())
    }

    async fn join_second_legs(
        &self,
        query: &RouteQuery,
        first: &FlightRecord,
        connection_city: &str,
        routes: &mut Vec<Itinerary>,
    ) -> Result<(), DomainError> {
        let latest_departure = first.arrival_time + Duration::minutes(MAX_LAYOVER_MINUTES);
        let second_legs = self
            .catalog
            .onward_flights(
                connection_city,
                &query.arrival_city,
                first.arrival_time,
                latest_departure,
                query.passenger_count,
            )
            .await?;

        for second in second_legs {
            if let Some(itinerary) = connecting_itinerary(first, &second, query.passenger_count) {
                routes.push(itinerary);
            }
        }
        Ok(())
    }
}

pub fn direct_itinerary(flight: &FlightRecord, passenger_count: i32) -> Itinerary {
    Itinerary {
        total_price: round_money(flight.price * f64::from(passenger_count)),
        total_duration_minutes: flight.duration_minutes(),
        is_cheapest: false,
        is_fastest: false,
        connection_cities: Vec::new(),
        layover_minutes: None,
        stops_count: 0,
        segments: vec![flight.clone()],
    }
}

/// Builds a two-leg itinerary, or `None` when the layover falls outside
/// the 60..=1440 minute window.
pub fn connecting_itinerary(
    first: &FlightRecord,
    second: &FlightRecord,
    passenger_count: i32,
) -> Option<Itinerary> {
    let layover = (second.departure_time - first.arrival_time).num_minutes();
    if !(MIN_LAYOVER_MINUTES..=MAX_LAYOVER_MINUTES).contains(&layover) {
        return None;
    }

    Some(Itinerary {
        total_price: round_money((first.price + second.price) * f64::from(passenger_count)),
        total_duration_minutes: (second.arrival_time - first.departure_time).num_minutes(),
        is_cheapest: false,
        is_fastest: false,
        connection_cities: vec![first.arrival_city.clone()],
        layover_minutes: Some(layover),
        stops_count: 1,
        segments: vec![first.clone(), second.clone()],
    })
}

/// Tags every itinerary matching the minimum price as cheapest and the
/// minimum duration as fastest (ties tag all), then orders by ascending
/// total price.
pub fn finalize_routes(mut routes: Vec<Itinerary>) -> Vec<Itinerary> {
    if let Some(min_price) = routes
        .iter()
        .map(|r| r.total_price)
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    {
        let min_duration = routes
            .iter()
            .map(|r| r.total_duration_minutes)
            .min()
            .unwrap_or_default();

        for route in &mut routes {
            route.is_cheapest = route.total_price == min_price;
            route.is_fastest = route.total_duration_minutes == min_duration;
        }
    }

    routes.sort_by(|a, b| {
        a.total_price
            .partial_cmp(&b.total_price)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::FlightCatalog;
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDateTime, Utc};
    use uuid::Uuid;

    struct InMemoryCatalog {
        flights: Vec<FlightRecord>,
    }

    #[async_trait]
    impl FlightCatalog for InMemoryCatalog {
        async fn direct_flights(
            &self,
            departure_city: &str,
            arrival_city: &str,
            date: NaiveDate,
            min_seats: i32,
        ) -> Result<Vec<FlightRecord>, DomainError> {
            Ok(self
                .flights
                .iter()
                .filter(|f| {
                    f.is_active
                        && f.departure_city.to_lowercase() == departure_city.to_lowercase()
                        && f.arrival_city.to_lowercase() == arrival_city.to_lowercase()
                        && f.departure_time.date() == date
                        && f.available_seats >= min_seats
                })
                .cloned()
                .collect())
        }

        async fn departures(
            &self,
            departure_city: &str,
            date: NaiveDate,
            min_seats: i32,
        ) -> Result<Vec<FlightRecord>, DomainError> {
            Ok(self
                .flights
                .iter()
                .filter(|f| {
                    f.is_active
                        && f.departure_city.to_lowercase() == departure_city.to_lowercase()
                        && f.departure_time.date() == date
                        && f.available_seats >= min_seats
                })
                .cloned()
                .collect())
        }

        async fn onward_flights(
            &self,
            departure_city: &str,
            arrival_city: &str,
            after: NaiveDateTime,
            latest: NaiveDateTime,
            min_seats: i32,
        ) -> Result<Vec<FlightRecord>, DomainError> {
            Ok(self
                .flights
                .iter()
                .filter(|f| {
                    f.is_active
                        && f.departure_city.to_lowercase() == departure_city.to_lowercase()
                        && f.arrival_city.to_lowercase() == arrival_city.to_lowercase()
                        && f.departure_time > after
                        && f.departure_time <= latest
                        && f.available_seats >= min_seats
                })
                .cloned()
                .collect())
        }
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn flight(
        number: &str,
        dep_city: &str,
        arr_city: &str,
        dep: &str,
        arr: &str,
        price: f64,
        seats: i32,
    ) -> FlightRecord {
        FlightRecord {
            id: Uuid::new_v4(),
            flight_number: number.to_string(),
            airline: "Aeroflot".to_string(),
            departure_city: dep_city.to_string(),
            arrival_city: arr_city.to_string(),
            departure_time: ts(dep),
            arrival_time: ts(arr),
            price,
            total_seats: 180,
            available_seats: seats,
            is_active: true,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    fn query(via: Option<&str>) -> RouteQuery {
        RouteQuery {
            departure_city: "Moscow".to_string(),
            arrival_city: "Sochi".to_string(),
            departure_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            passenger_count: 2,
            via_city: via.map(str::to_string),
        }
    }

    fn engine(flights: Vec<FlightRecord>) -> RouteSearchEngine<InMemoryCatalog> {
        RouteSearchEngine::new(InMemoryCatalog { flights })
    }

    #[tokio::test]
    async fn test_direct_flight_priced_per_passenger() {
        let engine = engine(vec![flight(
            "SU100",
            "Moscow",
            "Sochi",
            "2025-06-15 08:00:00",
            "2025-06-15 10:30:00",
            120.0,
            150,
        )]);

        let routes = engine.search(&query(None)).await.unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].total_price, 240.0);
        assert_eq!(routes[0].total_duration_minutes, 150);
        assert_eq!(routes[0].stops_count, 0);
        assert!(routes[0].is_cheapest && routes[0].is_fastest);
    }

    #[tokio::test]
    async fn test_no_candidates_is_empty_not_error() {
        let engine = engine(vec![]);
        let routes = engine.search(&query(None)).await.unwrap();
        assert!(routes.is_empty());
    }

    #[tokio::test]
    async fn test_city_match_is_case_insensitive() {
        let engine = engine(vec![flight(
            "SU100",
            "MOSCOW",
            "sochi",
            "2025-06-15 08:00:00",
            "2025-06-15 10:30:00",
            120.0,
            150,
        )]);

        let routes = engine.search(&query(None)).await.unwrap();
        assert_eq!(routes.len(), 1);
    }

    #[tokio::test]
    async fn test_insufficient_seats_excluded() {
        let engine = engine(vec![flight(
            "SU100",
            "Moscow",
            "Sochi",
            "2025-06-15 08:00:00",
            "2025-06-15 10:30:00",
            120.0,
            1,
        )]);

        // Query asks for 2 passengers.
        let routes = engine.search(&query(None)).await.unwrap();
        assert!(routes.is_empty());
    }

    /// First leg lands 2025-06-15 10:00:00 in St. Petersburg; second legs
    /// depart at the given layover offsets.
    fn connection_fixture(layover_minutes: &[i64]) -> Vec<FlightRecord> {
        let mut flights = vec![flight(
            "SU150",
            "Moscow",
            "St. Petersburg",
            "2025-06-15 09:00:00",
            "2025-06-15 10:00:00",
            80.0,
            100,
        )];
        for (i, minutes) in layover_minutes.iter().enumerate() {
            let departure = ts("2025-06-15 10:00:00") + Duration::minutes(*minutes);
            let arrival = departure + Duration::hours(3);
            flights.push(FlightRecord {
                departure_time: departure,
                arrival_time: arrival,
                ..flight(
                    &format!("SU25{i}"),
                    "St. Petersburg",
                    "Sochi",
                    "2025-06-15 10:00:00",
                    "2025-06-15 13:00:00",
                    100.0,
                    80,
                )
            });
        }
        flights
    }

    #[tokio::test]
    async fn test_layover_window_boundaries() {
        let engine = engine(connection_fixture(&[59, 60, 1440, 1441]));
        let routes = engine.search(&query(None)).await.unwrap();

        let layovers: Vec<i64> = routes.iter().filter_map(|r| r.layover_minutes).collect();
        assert_eq!(layovers.len(), 2);
        assert!(layovers.contains(&60));
        assert!(layovers.contains(&1440));
    }

    #[tokio::test]
    async fn test_connection_pricing_and_duration() {
        let engine = engine(connection_fixture(&[120]));
        let routes = engine.search(&query(None)).await.unwrap();

        assert_eq!(routes.len(), 1);
        let route = &routes[0];
        // (80 + 100) * 2 passengers.
        assert_eq!(route.total_price, 360.0);
        // 09:00 departure, 12:00 + 3h arrival.
        assert_eq!(route.total_duration_minutes, 360);
        assert_eq!(route.connection_cities, vec!["St. Petersburg".to_string()]);
        assert_eq!(route.stops_count, 1);
    }

    #[tokio::test]
    async fn test_first_leg_to_destination_not_treated_as_connection() {
        // Direct Moscow->Sochi flight plus a Sochi->Sochi "onward" trap:
        // the direct leg must not be used as a first leg of a connection.
        let mut flights = vec![flight(
            "SU100",
            "Moscow",
            "Sochi",
            "2025-06-15 08:00:00",
            "2025-06-15 10:30:00",
            120.0,
            150,
        )];
        flights.push(flight(
            "SU999",
            "Sochi",
            "Sochi",
            "2025-06-15 12:00:00",
            "2025-06-15 13:00:00",
            10.0,
            150,
        ));
        let engine = engine(flights);

        let routes = engine.search(&query(None)).await.unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].stops_count, 0);
    }

    #[tokio::test]
    async fn test_via_city_constrains_connection_point() {
        // Two possible connections: via St. Petersburg and via Kazan.
        let flights = vec![
            flight("SU150", "Moscow", "St. Petersburg", "2025-06-15 09:00:00", "2025-06-15 10:00:00", 80.0, 100),
            flight("SU250", "St. Petersburg", "Sochi", "2025-06-15 12:00:00", "2025-06-15 15:00:00", 100.0, 80),
            flight("SU160", "Moscow", "Kazan", "2025-06-15 09:00:00", "2025-06-15 10:30:00", 70.0, 100),
            flight("SU260", "Kazan", "Sochi", "2025-06-15 12:30:00", "2025-06-15 15:30:00", 90.0, 80),
        ];
        let engine = engine(flights);

        let unconstrained = engine.search(&query(None)).await.unwrap();
        assert_eq!(unconstrained.len(), 2);

        let via = engine.search(&query(Some("Kazan"))).await.unwrap();
        assert_eq!(via.len(), 1);
        assert_eq!(via[0].connection_cities, vec!["Kazan".to_string()]);
    }

    #[tokio::test]
    async fn test_price_ties_tag_all_cheapest() {
        let flights = vec![
            flight("SU100", "Moscow", "Sochi", "2025-06-15 08:00:00", "2025-06-15 10:30:00", 120.0, 150),
            flight("SU200", "Moscow", "Sochi", "2025-06-15 14:00:00", "2025-06-15 17:00:00", 120.0, 150),
        ];
        let engine = engine(flights);

        let routes = engine.search(&query(None)).await.unwrap();
        assert_eq!(routes.len(), 2);
        assert!(routes.iter().all(|r| r.is_cheapest));
        // Only the 150-minute flight is fastest.
        assert_eq!(routes.iter().filter(|r| r.is_fastest).count(), 1);
    }

    #[tokio::test]
    async fn test_results_sorted_by_ascending_price() {
        let flights = vec![
            flight("SU300", "Moscow", "Sochi", "2025-06-15 08:00:00", "2025-06-15 11:00:00", 200.0, 150),
            flight("SU100", "Moscow", "Sochi", "2025-06-15 09:00:00", "2025-06-15 11:30:00", 120.0, 150),
            flight("SU200", "Moscow", "Sochi", "2025-06-15 10:00:00", "2025-06-15 12:30:00", 150.0, 150),
        ];
        let engine = engine(flights);

        let routes = engine.search(&query(None)).await.unwrap();
        let prices: Vec<f64> = routes.iter().map(|r| r.total_price).collect();
        assert_eq!(prices, vec![240.0, 300.0, 400.0]);
    }

    #[tokio::test]
    async fn test_search_is_idempotent() {
        let engine = engine(connection_fixture(&[120, 300]));
        let first = engine.search(&query(None)).await.unwrap();
        let second = engine.search(&query(None)).await.unwrap();

        let a = serde_json::to_value(&first).unwrap();
        let b = serde_json::to_value(&second).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_zero_passengers_rejected() {
        let engine = engine(vec![]);
        let mut q = query(None);
        q.passenger_count = 0;
        assert!(matches!(
            engine.search(&q).await,
            Err(DomainError::InvalidArgument(_))
        ));
    }
}
