use thiserror::Error;

use crate::routing::RouteError;

/// Errors raised by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A unique column already holds the given value
    #[error("Unique constraint violated on {field}")]
    UniqueViolation { field: &'static str },

    /// Row targeted by a write does not exist
    #[error("Row not found: {table} #{id}")]
    RowNotFound { table: &'static str, id: i64 },

    /// Transaction control was used out of order (begin twice, commit without begin)
    #[error("Transaction state error: {0}")]
    TransactionState(&'static str),

    /// Storage backend is unavailable or failed mid-operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Failure kinds returned by every use case.
///
/// Each variant maps to exactly one HTTP status at the server boundary.
/// The message is the public text sent to the caller, except for
/// [`ServiceError::Internal`] whose detail is only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Request input failed validation (400)
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed, invalid or expired credentials (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated caller may not act on the target (403)
    #[error("{0}")]
    Forbidden(String),

    /// Route or resource does not exist (404)
    #[error("{0}")]
    NotFound(String),

    /// Request conflicts with existing state, e.g. a taken email (409)
    #[error("{0}")]
    Conflict(String),

    /// Anything else (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { field } => {
                ServiceError::Conflict(format!("A user with this {} already exists", field))
            }
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<RouteError> for ServiceError {
    fn from(err: RouteError) -> Self {
        ServiceError::NotFound(err.to_string())
    }
}
