// Declare modules within this crate
pub mod auth;
pub mod availability;
pub mod conflict;
#[cfg(test)]
mod conflict_proptest;
#[cfg(test)]
mod conflict_test;
pub mod courts;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod memory;
#[cfg(test)]
mod mocks;
pub mod routes;
pub mod settings;
pub mod window;
#[cfg(test)]
mod window_proptest;
pub mod workflow;

pub use error::BookingError;
pub use settings::{BookingSettings, Clock, FixedClock, SystemClock};
pub use window::{is_window_already_open, reservation_opens_at, ReservationWindow, ReservationWindowRule};
pub use workflow::{BookingWorkflow, Progress, SelectionOutcome, SubmissionReceipt, WorkflowState};
