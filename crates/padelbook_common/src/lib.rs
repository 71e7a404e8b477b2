// --- File: crates/padelbook_common/src/lib.rs ---

pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Domain model
pub mod services; // Store abstractions

pub use error::{forbidden, validation_error, HttpStatusCode, PadelbookError, StoreError};
pub use http::client::{create_client, HTTP_CLIENT};
pub use services::{BookingStore, InsertOutcome, ProfileStore};
