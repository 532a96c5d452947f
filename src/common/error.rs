// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

use super::validation::ValidationResult;
use crate::services::google::GoogleError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// No user is bound to the session
    Unauthenticated(String),
    /// Authenticated, but not the owner of the target record
    Unauthorized(String),
    /// Natural-key lookup matched zero or ambiguous rows
    NotFound(String),
    ValidationError(String),
    /// Provider rejected the authorization-code exchange
    ExchangeFailed(String),
    /// Token subject or audience did not match expectations
    TokenMismatch(String),
    /// The session is already bound to this provider subject
    AlreadyConnected(String),
    /// Provider did not acknowledge the revoke request
    RevokeFailed(String),
    /// No provider token is bound to the current session
    NotConnected(String),
    InternalServer(String),
    DatabaseError(sqlx::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::ExchangeFailed(msg) => write!(f, "Exchange Failed: {}", msg),
            ApiError::TokenMismatch(msg) => write!(f, "Token Mismatch: {}", msg),
            ApiError::AlreadyConnected(msg) => write!(f, "Already Connected: {}", msg),
            ApiError::RevokeFailed(msg) => write!(f, "Revoke Failed: {}", msg),
            ApiError::NotConnected(msg) => write!(f, "Not Connected: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message, code) = match self {
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHENTICATED"),
            ApiError::Unauthorized(msg) => (StatusCode::FORBIDDEN, msg, "UNAUTHORIZED"),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, "VALIDATION_ERROR"),
            ApiError::ExchangeFailed(msg) => (StatusCode::UNAUTHORIZED, msg, "EXCHANGE_FAILED"),
            ApiError::TokenMismatch(msg) => (StatusCode::UNAUTHORIZED, msg, "TOKEN_MISMATCH"),
            // Matches the provider flow: re-connecting the same subject is
            // reported as an informational success, not a failure.
            ApiError::AlreadyConnected(msg) => (StatusCode::OK, msg, "ALREADY_CONNECTED"),
            ApiError::RevokeFailed(msg) => (StatusCode::BAD_REQUEST, msg, "REVOKE_FAILED"),
            ApiError::NotConnected(msg) => (StatusCode::UNAUTHORIZED, msg, "NOT_CONNECTED"),
            ApiError::InternalServer(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg,
                "INTERNAL_SERVER_ERROR",
            ),
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    "DATABASE_ERROR",
                )
            }
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<GoogleError> for ApiError {
    fn from(e: GoogleError) -> Self {
        match e {
            GoogleError::ExchangeFailed(msg) => ApiError::ExchangeFailed(msg),
            GoogleError::TokenMismatch(msg) => ApiError::TokenMismatch(msg),
            GoogleError::RevokeFailed(msg) => ApiError::RevokeFailed(msg),
            GoogleError::NotConfigured => {
                ApiError::InternalServer("Google OAuth not configured".to_string())
            }
            GoogleError::RequestFailed(msg) | GoogleError::SerializationError(msg) => {
                ApiError::InternalServer(msg)
            }
        }
    }
}

/// Helper function to convert ValidationResult to ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            let error_messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            ApiError::ValidationError(error_messages.join(", "))
        }
    }
}
