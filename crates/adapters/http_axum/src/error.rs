//! HTTP error response mapping.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use rentalhub_domain::error::{RentalError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`RentalError`] to an HTTP response with appropriate status code.
pub struct ApiError(RentalError);

impl From<RentalError> for ApiError {
    fn from(err: RentalError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ValidationError::MalformedInput(rejection.body_text()).into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            RentalError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            RentalError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            RentalError::Forbidden(err) => (StatusCode::FORBIDDEN, err.to_string()),
            RentalError::ResourceExhausted(err) => {
                tracing::error!(error = %err, "store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service unavailable".to_string(),
                )
            }
            RentalError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
