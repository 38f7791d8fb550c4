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
use wayfare_core::DomainError;
use wayfare_shared::models::{HotelRecord, RoomRecord, UserRole};
use wayfare_shared::ApiResponse;
use wayfare_store::hotel_repo::{HotelInput, HotelListFilter, RoomInput, RoomListFilter};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_hotels).post(create_hotel))
        .route("/{hotel_id}", put(update_hotel).delete(delete_hotel))
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/{room_id}", put(update_room).delete(delete_room))
}

fn validate_hotel(input: &HotelInput) -> Result<(), DomainError> {
    if input.name.len() < 2 || input.name.len() > 100 {
        return Err(DomainError::invalid("Hotel name must be between 2 and 100 characters"));
    }
    if input.city.len() < 2 || input.city.len() > 50 {
        return Err(DomainError::invalid("City must be between 2 and 50 characters"));
    }
    if !(1..=5).contains(&input.stars) {
        return Err(DomainError::invalid("Stars must be between 1 and 5"));
    }
    Ok(())
}

fn validate_room(input: &RoomInput) -> Result<(), DomainError> {
    if input.price_per_night <= 0.0 {
        return Err(DomainError::invalid("Price must be greater than 0"));
    }
    if !(1..=10).contains(&input.capacity) {
        return Err(DomainError::invalid("Capacity must be between 1 and 10"));
    }
    if !(1..=5).contains(&input.room_count) {
        return Err(DomainError::invalid("Room count must be between 1 and 5"));
    }
    Ok(())
}

async fn list_hotels(
    State(state): State<AppState>,
    Query(filter): Query<HotelListFilter>,
) -> Result<Json<ApiResponse<Vec<HotelRecord>>>, AppError> {
    let hotels = state.hotels().list(&filter).await?;
    let total = hotels.len() as i64;

    Ok(Json(ApiResponse::listing(
        format!("Found {total} hotels"),
        hotels,
        total,
    )))
}

async fn create_hotel(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(input): Json<HotelInput>,
) -> Result<Json<ApiResponse<HotelRecord>>, AppError> {
    require_role(&actor, UserRole::Admin)?;
    validate_hotel(&input)?;

    let hotel = state.hotels().create(&input).await?;

    Ok(Json(ApiResponse::ok("Hotel created successfully", hotel)))
}

async fn update_hotel(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(hotel_id): Path<Uuid>,
    Json(input): Json<HotelInput>,
) -> Result<Json<ApiResponse<HotelRecord>>, AppError> {
    require_role(&actor, UserRole::Admin)?;
    validate_hotel(&input)?;

    let hotel = state.hotels().update(hotel_id, &input).await?;

    Ok(Json(ApiResponse::ok("Hotel updated successfully", hotel)))
}

async fn delete_hotel(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(hotel_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_role(&actor, UserRole::Admin)?;

    state.hotels().delete(hotel_id).await?;

    Ok(Json(ApiResponse::message_only("Hotel deleted successfully")))
}

async fn list_rooms(
    State(state): State<AppState>,
    Query(filter): Query<RoomListFilter>,
) -> Result<Json<ApiResponse<Vec<RoomRecord>>>, AppError> {
    let rooms = state.hotels().list_rooms(&filter).await?;
    let total = rooms.len() as i64;

    Ok(Json(ApiResponse::listing(
        format!("Found {total} available rooms"),
        rooms,
        total,
    )))
}

async fn create_room(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(input): Json<RoomInput>,
) -> Result<Json<ApiResponse<RoomRecord>>, AppError> {
    require_role(&actor, UserRole::Admin)?;
    validate_room(&input)?;

    let room = state.hotels().create_room(&input).await?;

    Ok(Json(ApiResponse::ok("Room created successfully", room)))
}

async fn update_room(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(room_id): Path<Uuid>,
    Json(input): Json<RoomInput>,
) -> Result<Json<ApiResponse<RoomRecord>>, AppError> {
    require_role(&actor, UserRole::Admin)?;
    validate_room(&input)?;

    let room = state.hotels().update_room(room_id, &input).await?;

    Ok(Json(ApiResponse::ok("Room updated successfully", room)))
}

async fn delete_room(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(room_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_role(&actor, UserRole::Admin)?;

    state.hotels().delete_room(room_id).await?;

    Ok(Json(ApiResponse::message_only("Room deleted successfully")))
}
