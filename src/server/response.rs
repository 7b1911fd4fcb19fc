//! Response envelopes and error rendering.
//!
//! Success: `{"success": true, "message": ..., "data": ...}`.
//! Failure: `{"error": <kind>, "message": ..., "status": <code>}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::ServiceError;

// =============================================================================
// Success
// =============================================================================

/// Body of every successful response.
#[derive(Debug, Serialize)]
pub struct SuccessBody {
    pub success: bool,
    pub message: String,
    pub data: Value,
}

/// A handler's successful result.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: SuccessBody,
}

impl ApiResponse {
    /// 200 with `data` serialized into the envelope.
    pub fn ok(message: impl Into<String>, data: impl Serialize) -> Result<Self, ServiceError> {
        Self::with_status(StatusCode::OK, message, data)
    }

    /// 201 with `data` serialized into the envelope.
    pub fn created(message: impl Into<String>, data: impl Serialize) -> Result<Self, ServiceError> {
        Self::with_status(StatusCode::CREATED, message, data)
    }

    pub fn with_status(
        status: StatusCode,
        message: impl Into<String>,
        data: impl Serialize,
    ) -> Result<Self, ServiceError> {
        let data = serde_json::to_value(data)
            .map_err(|e| ServiceError::internal(format!("response serialization failed: {}", e)))?;
        Ok(Self {
            status,
            body: SuccessBody {
                success: true,
                message: message.into(),
                data,
            },
        })
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

// =============================================================================
// Errors
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error kind identifier (e.g., "not_found", "validation_error")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: status.as_u16(),
        }
    }
}

impl ServiceError {
    /// Status code and kind identifier for this error.
    pub fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            ServiceError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ServiceError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ServiceError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ServiceError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

/// Convert ServiceError to HTTP response.
///
/// Internal errors are logged with their detail and answered with a
/// generic message. 404s log at debug, other client errors at warn.
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_kind();

        let message = match &self {
            ServiceError::Internal(detail) => {
                error!(
                    error_type = error_type,
                    status = status.as_u16(),
                    "Server error: {}",
                    detail
                );
                "Internal server error".to_string()
            }
            ServiceError::NotFound(message) => {
                debug!(
                    error_type = error_type,
                    status = status.as_u16(),
                    "Resource not found: {}",
                    message
                );
                message.clone()
            }
            other => {
                warn!(
                    error_type = error_type,
                    status = status.as_u16(),
                    "Client error: {}",
                    other
                );
                other.to_string()
            }
        };

        (status, Json(ErrorResponse::new(error_type, message, status))).into_response()
    }
}
