use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::extract::CurrentUser;
use crate::state::AppState;
use wayfare_core::availability::validate_stay_dates;
use wayfare_core::ledger::{ensure_cancellable, ensure_owner_or_admin};
use wayfare_core::DomainError;
use wayfare_shared::models::{FlightBookingRecord, HotelBookingRecord, RoomRecord};
use wayfare_shared::ApiResponse;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rooms/available-by-dates", get(available_by_dates))
        .route("/rooms/available-by-duration", get(available_by_duration))
        .route("/hotel", post(create_hotel_booking).get(list_hotel_bookings))
        .route("/hotel/{booking_id}", axum::routing::delete(cancel_hotel_booking))
        .route("/flight", post(book_flight).get(list_flight_bookings))
}

#[derive(Debug, Deserialize)]
struct AvailableByDatesQuery {
    check_in: NaiveDate,
    check_out: NaiveDate,
    hotel_id: Option<Uuid>,
    city: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvailableByDurationQuery {
    start_date: NaiveDate,
    duration_days: i64,
    hotel_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct HotelBookingRequest {
    room_id: Uuid,
    check_in_date: NaiveDate,
    check_out_date: NaiveDate,
    #[serde(default = "default_count")]
    guest_count: i32,
}

#[derive(Debug, Deserialize)]
struct FlightBookingRequest {
    flight_id: Uuid,
    #[serde(default = "default_count")]
    passenger_count: i32,
}

fn default_count() -> i32 {
    1
}

async fn available_by_dates(
    State(state): State<AppState>,
    Query(query): Query<AvailableByDatesQuery>,
) -> Result<Json<ApiResponse<Vec<RoomRecord>>>, AppError> {
    validate_stay_dates(query.check_in, query.check_out, Utc::now().date_naive())?;

    let rooms = state
        .bookings()
        .available_rooms(query.check_in, query.check_out, query.hotel_id, query.city.as_deref())
        .await?;
    let total = rooms.len() as i64;

    Ok(Json(ApiResponse::listing(
        format!("Found {total} available rooms for the selected dates"),
        rooms,
        total,
    )))
}

async fn available_by_duration(
    State(state): State<AppState>,
    Query(query): Query<AvailableByDurationQuery>,
) -> Result<Json<ApiResponse<Vec<RoomRecord>>>, AppError> {
    if !(1..=30).contains(&query.duration_days) {
        return Err(DomainError::invalid("Duration must be between 1 and 30 days").into());
    }

    let check_out = query.start_date + Duration::days(query.duration_days);
    validate_stay_dates(query.start_date, check_out, Utc::now().date_naive())?;

    let rooms = state
        .bookings()
        .available_rooms(query.start_date, check_out, query.hotel_id, None)
        .await?;
    let total = rooms.len() as i64;

    Ok(Json(ApiResponse::listing(
        format!("Found {total} available rooms for {} days", query.duration_days),
        rooms,
        total,
    )))
}

async fn create_hotel_booking(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<HotelBookingRequest>,
) -> Result<Json<ApiResponse<HotelBookingRecord>>, AppError> {
    if req.guest_count < 1 {
        return Err(DomainError::invalid("Guest count must be at least 1").into());
    }
    validate_stay_dates(req.check_in_date, req.check_out_date, Utc::now().date_naive())?;

    let booking = state
        .bookings()
        .create_hotel_booking(
            user.id,
            req.room_id,
            req.check_in_date,
            req.check_out_date,
            req.guest_count,
        )
        .await?;

    let message = format!(
        "Booking created successfully for {} nights. Total: ${}",
        booking.nights_count.unwrap_or_default(),
        booking.total_price
    );

    Ok(Json(ApiResponse::ok(message, booking)))
}

async fn list_hotel_bookings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<Vec<HotelBookingRecord>>>, AppError> {
    let bookings = state.bookings().list_hotel_bookings(&user).await?;
    let total = bookings.len() as i64;

    Ok(Json(ApiResponse::listing(
        format!("Found {total} bookings"),
        bookings,
        total,
    )))
}

async fn cancel_hotel_booking(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let booking = state
        .bookings()
        .find_hotel_booking(booking_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Booking not found"))?;

    ensure_owner_or_admin(&user, booking.user_id)?;
    ensure_cancellable(booking.status, booking.check_in_date, Utc::now().date_naive())?;

    state.bookings().cancel_hotel_booking(booking_id).await?;

    tracing::info!(%booking_id, by = %user.username, "hotel booking cancelled");

    Ok(Json(ApiResponse::message_only("Booking cancelled successfully")))
}

async fn book_flight(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<FlightBookingRequest>,
) -> Result<Json<ApiResponse<FlightBookingRecord>>, AppError> {
    if req.passenger_count < 1 {
        return Err(DomainError::invalid("Passenger count must be at least 1").into());
    }

    let booking = state
        .bookings()
        .book_flight(user.id, req.flight_id, req.passenger_count)
        .await?;

    let message = format!(
        "Flight booked successfully! Reference: {}",
        booking.booking_reference
    );

    Ok(Json(ApiResponse::ok(message, booking)))
}

async fn list_flight_bookings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<Vec<FlightBookingRecord>>>, AppError> {
    let bookings = state.bookings().list_flight_bookings(&user).await?;
    let total = bookings.len() as i64;

    Ok(Json(ApiResponse::listing(
        format!("Found {total} flight bookings"),
        bookings,
        total,
    )))
}
