// --- File: crates/padelbook_common/src/error.rs ---
use thiserror::Error;

/// The base error type surfaced by the HTTP layer.
///
/// Each crate converts its specific error into this enum (`From<SpecificError>
/// for PadelbookError`), which carries the HTTP status mapping.
#[derive(Error, Debug)]
pub enum PadelbookError {
    /// Incomplete or malformed input; nothing was sent to the store
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Missing or invalid identity
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Authenticated but not allowed
    #[error("Forbidden: {0}")]
    ForbiddenError(String),

    /// The request collides with existing state (slot taken, pending request, not cancellable)
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// A prerequisite must be provided first, e.g. club credentials
    #[error("Precondition required: {0}")]
    PreconditionRequired(String),

    /// Well-formed but cannot be processed as a pre-booking
    #[error("Unprocessable: {0}")]
    UnprocessableError(String),

    /// Storage or transport failure; the caller may retry
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// A feature is switched off by configuration
    #[error("Service unavailable: {0}")]
    UnavailableError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for PadelbookError {
    fn status_code(&self) -> u16 {
        match self {
            PadelbookError::ValidationError(_) => 400,
            PadelbookError::AuthError(_) => 401,
            PadelbookError::ForbiddenError(_) => 403,
            PadelbookError::ConflictError(_) => 409,
            PadelbookError::UnprocessableError(_) => 422,
            PadelbookError::PreconditionRequired(_) => 428,
            PadelbookError::DatabaseError(_) => 503,
            PadelbookError::ExternalServiceError { .. } => 502,
            PadelbookError::UnavailableError(_) => 503,
            PadelbookError::ConfigError(_) => 500,
            PadelbookError::InternalError(_) => 500,
        }
    }
}

/// Failure reported by a store implementation.
///
/// Every variant is retriable from the caller's point of view: no partial
/// write is left behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached (pool exhausted, connection refused, ...)
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A statement was rejected or failed while executing
    #[error("store query failed: {0}")]
    Query(String),

    /// A stored row could not be mapped onto the domain model
    #[error("stored data could not be decoded: {0}")]
    Decode(String),
}

impl From<StoreError> for PadelbookError {
    fn from(err: StoreError) -> Self {
        PadelbookError::DatabaseError(err.to_string())
    }
}

impl From<reqwest::Error> for PadelbookError {
    fn from(err: reqwest::Error) -> Self {
        PadelbookError::ExternalServiceError {
            service_name: "availability".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PadelbookError {
    fn from(err: serde_json::Error) -> Self {
        PadelbookError::ValidationError(err.to_string())
    }
}

// Utility functions for error handling
pub fn validation_error<T: std::fmt::Display>(message: T) -> PadelbookError {
    PadelbookError::ValidationError(message.to_string())
}

pub fn forbidden<T: std::fmt::Display>(message: T) -> PadelbookError {
    PadelbookError::ForbiddenError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(validation_error("x").status_code(), 400);
        assert_eq!(PadelbookError::ConflictError("taken".into()).status_code(), 409);
        assert_eq!(forbidden("admins only").status_code(), 403);
        assert_eq!(
            PadelbookError::PreconditionRequired("credentials".into()).status_code(),
            428
        );
        assert_eq!(
            PadelbookError::from(StoreError::Unavailable("down".into())).status_code(),
            503
        );
    }
}
