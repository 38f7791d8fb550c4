use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use wayfare_core::DomainError;
use wayfare_shared::ErrorBody;

/// HTTP-facing wrapper over the domain taxonomy. Handlers return this via
/// `?`; the mapping to status codes lives in one place.
#[derive(Debug)]
pub struct AppError(pub DomainError);

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self.0 {
            DomainError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, "Validation Error", msg),
            DomainError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "Unauthorized", msg),
            DomainError::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden", msg),
            DomainError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not Found", msg),
            DomainError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", msg),
            DomainError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "An unexpected error occurred. Please try again later.".to_string(),
                )
            }
        };

        (status, Json(ErrorBody::new(error, details))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_maps_to_status_codes() {
        let cases = [
            (DomainError::invalid("x"), StatusCode::BAD_REQUEST),
            (DomainError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (DomainError::forbidden("x"), StatusCode::FORBIDDEN),
            (DomainError::not_found("x"), StatusCode::NOT_FOUND),
            (DomainError::conflict("x"), StatusCode::CONFLICT),
            (DomainError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(AppError(err).into_response().status(), expected);
        }
    }
}
