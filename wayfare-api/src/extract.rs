use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;
use wayfare_core::auth::{decode_access_token, extract_bearer_token};
use wayfare_core::DomainError;
use wayfare_shared::models::UserRecord;

/// Authenticated caller, resolved from the `Authorization` header on every
/// protected route. The strict bearer parse happens before any decoding;
/// the token subject must still be an active user at request time.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRecord);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| DomainError::unauthorized("Authorization header missing"))?;

        let token = extract_bearer_token(header)?;
        let claims = decode_access_token(token, &state.auth.secret)?;

        let user = state
            .users()
            .find_active_by_username(&claims.sub)
            .await?
            .ok_or_else(|| DomainError::unauthorized("User not found or inactive"))?;

        Ok(CurrentUser(user))
    }
}
