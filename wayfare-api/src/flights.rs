use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::extract::CurrentUser;
use crate::state::AppState;
use wayfare_core::auth::require_role;
use wayfare_core::routing::{Itinerary, RouteQuery, RouteSearchEngine};
use wayfare_core::DomainError;
use wayfare_shared::models::{FlightRecord, UserRole};
use wayfare_shared::ApiResponse;
use wayfare_store::flight_repo::{FlightInput, FlightListFilter};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(search_flights))
        .route("/", get(list_flights).post(create_flight))
        .route("/{flight_id}", put(update_flight).delete(delete_flight))
}

fn validate_flight(input: &FlightInput) -> Result<(), DomainError> {
    if input.arrival_time <= input.departure_time {
        return Err(DomainError::invalid("Arrival time must be after departure time"));
    }
    if input.price <= 0.0 {
        return Err(DomainError::invalid("Price must be greater than 0"));
    }
    if input.total_seats < 1 {
        return Err(DomainError::invalid("Total seats must be at least 1"));
    }
    if input.available_seats < 0 || input.available_seats > input.total_seats {
        return Err(DomainError::invalid("Available seats cannot exceed total seats"));
    }
    Ok(())
}

/// Route search: direct plus one-stop itineraries, cheapest/fastest
/// tagged, sorted by price.
async fn search_flights(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<ApiResponse<Vec<Itinerary>>>, AppError> {
    let engine = RouteSearchEngine::new(state.flight_catalog());
    let routes = engine.search(&query).await?;
    let total = routes.len() as i64;

    Ok(Json(ApiResponse::listing(
        format!("Found {total} flight options"),
        routes,
        total,
    )))
}

async fn list_flights(
    State(state): State<AppState>,
    Query(filter): Query<FlightListFilter>,
) -> Result<Json<ApiResponse<Vec<FlightRecord>>>, AppError> {
    let flights = state.flights().list(&filter).await?;
    let total = flights.len() as i64;

    Ok(Json(ApiResponse::listing(
        format!("Found {total} flights"),
        flights,
        total,
    )))
}

async fn create_flight(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(input): Json<FlightInput>,
) -> Result<Json<ApiResponse<FlightRecord>>, AppError> {
    require_role(&actor, UserRole::Admin)?;
    validate_flight(&input)?;

    let flight = state.flights().create(&input).await?;

    Ok(Json(ApiResponse::ok("Flight created successfully", flight)))
}

async fn update_flight(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(flight_id): Path<Uuid>,
    Json(input): Json<FlightInput>,
) -> Result<Json<ApiResponse<FlightRecord>>, AppError> {
    require_role(&actor, UserRole::Admin)?;
    validate_flight(&input)?;

    let flight = state.flights().update(flight_id, &input).await?;

    Ok(Json(ApiResponse::ok("Flight updated successfully", flight)))
}

async fn delete_flight(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(flight_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_role(&actor, UserRole::Admin)?;

    state.flights().delete(flight_id).await?;

    Ok(Json(ApiResponse::message_only("Flight deleted successfully")))
}
