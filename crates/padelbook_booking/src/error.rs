use chrono::{DateTime, Utc};
use padelbook_common::{PadelbookError, StoreError};
use thiserror::Error;

/// Everything that can stop a booking request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookingError {
    /// Incomplete or invalid input, detected before any I/O
    #[error("{0}")]
    Validation(String),

    /// Members may only hold one pending request at a time
    #[error("you already have a pending booking request, cancel it before creating a new one")]
    PendingRequestExists,

    /// Another pending or confirmed request overlaps this slot; nothing was inserted
    #[error("this court is already requested for an overlapping time")]
    Conflict,

    /// The store failed; nothing was written and the action can be retried
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    /// The club login must be provided before the request can be submitted
    #[error("club credentials are required to submit a booking request")]
    CredentialsRequired,

    #[error("the club's booking window opened at {opens_at}, book directly on the club site")]
    WindowAlreadyOpen { opens_at: DateTime<Utc> },

    /// Only pending requests owned by the caller can be cancelled
    #[error("only your own pending requests can be cancelled")]
    NotCancellable,

    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    #[error("booking configuration error: {0}")]
    Config(String),
}

impl BookingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BookingError::Validation(message.into())
    }
}

impl From<BookingError> for PadelbookError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation(msg) => PadelbookError::ValidationError(msg),
            BookingError::PendingRequestExists
            | BookingError::Conflict
            | BookingError::NotCancellable => PadelbookError::ConflictError(err.to_string()),
            BookingError::Storage(e) => e.into(),
            BookingError::CredentialsRequired => {
                PadelbookError::PreconditionRequired(err.to_string())
            }
            BookingError::WindowAlreadyOpen { .. } => {
                PadelbookError::UnprocessableError(err.to_string())
            }
            BookingError::InvalidState { .. } | BookingError::Config(_) => {
                PadelbookError::InternalError(err.to_string())
            }
        }
    }
}
