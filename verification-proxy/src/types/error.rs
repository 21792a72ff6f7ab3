//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common_types::ErrorResponse;

use crate::humanity_api::HumanityApiError;

/// Error category reported when the proxy is missing upstream configuration
pub const CONFIGURATION_ERROR: &str = "Server configuration error";

/// Error category reported when the upstream call itself fails
pub const VERIFICATION_FAILED: &str = "Failed to verify wallet";

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            inner: ErrorResponse {
                error: error.into(),
                message: message.into(),
            },
        }
    }

    /// HTTP status the error is rendered with
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error,
                self.inner.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error,
                self.inner.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert upstream API errors to application errors
impl From<HumanityApiError> for AppError {
    fn from(err: HumanityApiError) -> Self {
        use HumanityApiError::{InvalidBody, MissingApiKey, MissingApiUrl, NotAnObject, Transport};

        match &err {
            MissingApiUrl => {
                tracing::error!("HP_API_URL is not set in environment variables");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    CONFIGURATION_ERROR,
                    "API URL not configured. Please check your .env file.",
                )
            }
            MissingApiKey => {
                tracing::error!("HP_API_KEY is not set in environment variables");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    CONFIGURATION_ERROR,
                    "API key not configured. Please check your .env file.",
                )
            }
            Transport(_) | InvalidBody(_) | NotAnObject => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                VERIFICATION_FAILED,
                err.to_string(),
            ),
        }
    }
}

impl OperationOutput for AppError {
    type Inner = ErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ErrorResponse>::operation_response(ctx, operation)
    }
}
