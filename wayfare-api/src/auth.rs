use axum::{
    extract::{Query, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::extract::CurrentUser;
use crate::state::AppState;
use wayfare_core::auth::{
    hash_password, issue_access_token, require_role, validate_email, validate_password,
    validate_username, verify_password,
};
use wayfare_core::DomainError;
use wayfare_shared::models::{UserRecord, UserRole};
use wayfare_shared::ApiResponse;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/profile", put(update_profile))
        .route("/promote-to-admin", put(promote_to_admin))
        .route("/register-admin", post(register_admin))
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    email: String,
    username: String,
    password: String,
    #[serde(default)]
    role: UserRole,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
    expires_in: i64,
    user: UserRecord,
}

#[derive(Debug, Deserialize)]
struct ProfileQuery {
    new_username: String,
}

#[derive(Debug, Deserialize)]
struct PromoteQuery {
    target_user_id: Uuid,
}

fn validate_registration(req: &RegisterRequest) -> Result<(), DomainError> {
    validate_email(&req.email)?;
    validate_username(&req.username)?;
    validate_password(&req.password)
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserRecord>>, AppError> {
    validate_registration(&req)?;

    let digest = hash_password(&req.password, &state.auth.password_salt);
    let user = state
        .users()
        .create(&req.email, &req.username, &digest, req.role)
        .await?;

    tracing::info!(username = %user.username, "user registered");

    Ok(Json(ApiResponse::ok("User registered successfully", user)))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let found = state.users().find_active_by_email(&req.email).await?;

    let (user, digest) = found
        .ok_or_else(|| DomainError::unauthorized("Incorrect email or password"))?;
    if !verify_password(&req.password, &state.auth.password_salt, &digest) {
        return Err(DomainError::unauthorized("Incorrect email or password").into());
    }

    let access_token = issue_access_token(&user, &state.auth.secret, state.auth.token_minutes)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.auth.token_minutes * 60,
        user,
    }))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<ApiResponse<UserRecord>> {
    Json(ApiResponse::ok("User profile retrieved successfully", user))
}

async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<ApiResponse<UserRecord>>, AppError> {
    validate_username(&query.new_username)?;

    let updated = state.users().rename(user.id, &query.new_username).await?;

    Ok(Json(ApiResponse::ok("Username updated successfully", updated)))
}

async fn promote_to_admin(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(query): Query<PromoteQuery>,
) -> Result<Json<ApiResponse<UserRecord>>, AppError> {
    require_role(&actor, UserRole::Admin)?;

    let promoted = state.users().promote(query.target_user_id).await?;

    tracing::info!(target = %promoted.username, by = %actor.username, "user promoted to admin");

    Ok(Json(ApiResponse::ok(
        format!("User {} promoted to admin successfully", promoted.username),
        promoted,
    )))
}

async fn register_admin(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserRecord>>, AppError> {
    require_role(&actor, UserRole::Admin)?;
    validate_registration(&req)?;

    let digest = hash_password(&req.password, &state.auth.password_salt);
    let user = state
        .users()
        .create(&req.email, &req.username, &digest, UserRole::Admin)
        .await?;

    Ok(Json(ApiResponse::ok("Admin user registered successfully", user)))
}
