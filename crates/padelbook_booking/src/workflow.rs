//! Booking-request workflow.
//!
//! One `BookingWorkflow` drives one member through a pre-booking request:
//!
//! ```text
//! CollectingSelection -> [CollectingCredentials] -> CollectingPartners -> Submitting
//!                                                                  |-> Completed
//!                                                                  '-> Rejected
//! ```
//!
//! Club credentials are only asked for when the profile has none. Partners
//! can be given before the credentials; saving the credentials then resumes
//! the submission directly.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use padelbook_common::models::{
    BookingRequest, BookingStatus, ClubCredentials, Court, NewBookingRequest, Partner, Session,
    TimeRange,
};
use padelbook_common::{BookingStore, ProfileStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::conflict::ConflictChecker;
use crate::error::BookingError;
use crate::settings::BookingSettings;
use crate::window::ReservationWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    CollectingSelection,
    CollectingCredentials,
    CollectingPartners,
    Submitting,
    Completed,
    Rejected,
}

impl WorkflowState {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowState::CollectingSelection => "collecting the selection",
            WorkflowState::CollectingCredentials => "collecting club credentials",
            WorkflowState::CollectingPartners => "collecting partners",
            WorkflowState::Submitting => "submitting",
            WorkflowState::Completed => "completed",
            WorkflowState::Rejected => "rejected",
        }
    }
}

/// Date, court and time range picked by the member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub match_date: Option<NaiveDate>,
    pub court: Option<Court>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    /// The club already takes bookings for this date; nothing to pre-book.
    WindowAlreadyOpen {
        opens_at: DateTime<Utc>,
        external_booking_url: Option<String>,
    },
    NeedsCredentials,
    NeedsPartners,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    NeedsCredentials,
    NeedsPartners,
    Submitted(SubmissionReceipt),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubmissionReceipt {
    pub booking: BookingRequest,
    /// Short name of the request shown to the member, e.g. `jdupont3`.
    pub label: String,
}

/// `{first initial}{surname without spaces}{n}`, lower-cased.
pub fn booking_label(first_name: &str, last_name: &str, n: usize) -> String {
    let initial: String = first_name
        .trim()
        .chars()
        .next()
        .map(|c| c.to_lowercase().collect())
        .unwrap_or_default();
    let surname: String = last_name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    format!("{}{}{}", initial, surname, n)
}

fn most_recent_first(bookings: &mut [BookingRequest]) {
    bookings.sort_by(|a, b| {
        b.match_date
            .cmp(&a.match_date)
            .then(b.start_time.cmp(&a.start_time))
    });
}

pub struct BookingWorkflow {
    session: Session,
    booking_store: Arc<dyn BookingStore>,
    profile_store: Arc<dyn ProfileStore>,
    conflicts: ConflictChecker,
    settings: BookingSettings,
    state: WorkflowState,
    selection: Selection,
    partners: Option<[Partner; 3]>,
    loaded: Option<Vec<BookingRequest>>,
}

impl BookingWorkflow {
    pub fn new(
        session: Session,
        booking_store: Arc<dyn BookingStore>,
        profile_store: Arc<dyn ProfileStore>,
        settings: BookingSettings,
    ) -> Self {
        Self {
            session,
            conflicts: ConflictChecker::new(booking_store.clone()),
            booking_store,
            profile_store,
            settings,
            state: WorkflowState::CollectingSelection,
            selection: Selection::default(),
            partners: None,
            loaded: None,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn partners(&self) -> Option<&[Partner; 3]> {
        self.partners.as_ref()
    }

    /// The member's requests as last loaded, most recent match first.
    pub fn bookings(&self) -> &[BookingRequest] {
        self.loaded.as_deref().unwrap_or_default()
    }

    pub async fn load_bookings(&mut self) -> Result<&[BookingRequest], BookingError> {
        let bookings = self
            .booking_store
            .list_user_bookings(&self.session.user.id)
            .await
            .map_err(|e| {
                warn!("Failed to load bookings for {}: {}", self.session.user.id, e);
                BookingError::Storage(e)
            })?;
        debug!(
            "Loaded {} bookings for {}",
            bookings.len(),
            self.session.user.id
        );
        Ok(self.loaded.insert(bookings).as_slice())
    }

    fn invalid(&self, action: &'static str) -> BookingError {
        BookingError::InvalidState {
            action,
            state: self.state.as_str(),
        }
    }

    fn ensure_editable(&self, action: &'static str) -> Result<(), BookingError> {
        match self.state {
            WorkflowState::CollectingSelection
            | WorkflowState::CollectingCredentials
            | WorkflowState::CollectingPartners => Ok(()),
            _ => Err(self.invalid(action)),
        }
    }

    /// A changed selection has to be confirmed again.
    fn reopen_selection(&mut self) {
        if self.state != WorkflowState::CollectingSelection {
            debug!("Selection changed, confirmation required again");
            self.state = WorkflowState::CollectingSelection;
        }
    }

    fn clear_times(&mut self) {
        self.selection.start_time = None;
        self.selection.end_time = None;
    }

    pub fn select_date(&mut self, match_date: NaiveDate) -> Result<(), BookingError> {
        self.ensure_editable("select a date")?;
        // yesterday is still accepted
        let earliest = self.settings.today().pred_opt().unwrap_or(NaiveDate::MIN);
        if match_date < earliest {
            return Err(BookingError::validation("the match date is in the past"));
        }
        if self.selection.match_date != Some(match_date) {
            self.selection.match_date = Some(match_date);
            self.clear_times();
            self.reopen_selection();
        }
        Ok(())
    }

    pub fn select_court(&mut self, court: Court) -> Result<(), BookingError> {
        self.ensure_editable("select a court")?;
        if self.selection.court != Some(court) {
            self.selection.court = Some(court);
            self.clear_times();
            self.reopen_selection();
        }
        Ok(())
    }

    pub fn select_times(&mut self, start: NaiveTime, end: NaiveTime) -> Result<(), BookingError> {
        self.ensure_editable("select times")?;
        let range = TimeRange::new(start, end)
            .map_err(|_| BookingError::validation("the end time must be after the start time"))?;
        let changed = self.selection.start_time != Some(range.start)
            || self.selection.end_time != Some(range.end);
        if changed {
            self.selection.start_time = Some(range.start);
            self.selection.end_time = Some(range.end);
            self.reopen_selection();
        }
        Ok(())
    }

    /// Window for the selected date, if one is selected.
    pub fn window(&self) -> Option<ReservationWindow> {
        self.selection
            .match_date
            .map(|date| self.settings.window(date))
    }

    fn complete_selection(&self) -> Result<(NaiveDate, Court, TimeRange), BookingError> {
        match self.selection {
            Selection {
                match_date: Some(date),
                court: Some(court),
                start_time: Some(start),
                end_time: Some(end),
            } => {
                let range = TimeRange::new(start, end).map_err(|_| {
                    BookingError::validation("the end time must be after the start time")
                })?;
                Ok((date, court, range))
            }
            _ => Err(BookingError::validation(
                "choose a date, a court, a start time and an end time",
            )),
        }
    }

    /// Members (not admins) may hold a single pending request. Works on the
    /// loaded bookings only.
    fn guard_pending(&mut self, action: &'static str) -> Result<(), BookingError> {
        if self.session.is_admin() {
            return Ok(());
        }
        let Some(loaded) = self.loaded.as_ref() else {
            return Err(BookingError::InvalidState {
                action,
                state: "bookings are not loaded",
            });
        };
        if loaded.iter().any(|b| b.status == BookingStatus::Pending) {
            info!(
                "User {} already has a pending request, rejecting",
                self.session.user.id
            );
            self.state = WorkflowState::Rejected;
            return Err(BookingError::PendingRequestExists);
        }
        Ok(())
    }

    pub fn confirm_selection(&mut self) -> Result<SelectionOutcome, BookingError> {
        if self.state != WorkflowState::CollectingSelection {
            return Err(self.invalid("confirm the selection"));
        }
        let (match_date, _, _) = self.complete_selection()?;
        self.guard_pending("confirm the selection")?;

        let window = self.settings.window(match_date);
        if window.already_open {
            info!(
                "Booking window for {} opened at {}, redirecting to the club site",
                match_date, window.opens_at
            );
            return Ok(SelectionOutcome::WindowAlreadyOpen {
                opens_at: window.opens_at,
                external_booking_url: self.settings.external_booking_url.clone(),
            });
        }

        if self.session.profile.has_club_credentials() {
            self.state = WorkflowState::CollectingPartners;
            Ok(SelectionOutcome::NeedsPartners)
        } else {
            self.state = WorkflowState::CollectingCredentials;
            Ok(SelectionOutcome::NeedsCredentials)
        }
    }

    /// Saves the club login on the profile. When the partners are already
    /// known the submission continues right away.
    pub async fn provide_credentials(
        &mut self,
        credentials: ClubCredentials,
    ) -> Result<Progress, BookingError> {
        if self.state != WorkflowState::CollectingCredentials {
            return Err(self.invalid("save club credentials"));
        }
        if !credentials.is_complete() {
            return Err(BookingError::validation(
                "enter your club identifier and password",
            ));
        }
        let credentials = ClubCredentials {
            club_id: credentials.club_id.trim().to_string(),
            password: credentials.password,
        };

        self.profile_store
            .save_credentials(&self.session.user.id, &credentials)
            .await
            .map_err(|e| {
                warn!(
                    "Failed to save club credentials for {}: {}",
                    self.session.user.id, e
                );
                BookingError::Storage(e)
            })?;
        info!("Club credentials saved for {}", self.session.user.id);
        self.session.profile.credentials = Some(credentials);
        self.state = WorkflowState::CollectingPartners;

        if self.partners.is_some() {
            debug!("Partners already provided, resuming submission");
            self.submit().await.map(Progress::Submitted)
        } else {
            Ok(Progress::NeedsPartners)
        }
    }

    /// Normalises and records the three partners, then submits if the club
    /// credentials are known.
    pub async fn provide_partners(
        &mut self,
        partners: [Partner; 3],
    ) -> Result<Progress, BookingError> {
        if !matches!(
            self.state,
            WorkflowState::CollectingPartners | WorkflowState::CollectingCredentials
        ) {
            return Err(self.invalid("provide partners"));
        }
        let partners = partners.map(|p| Partner::normalized(&p.first_name, &p.last_name));
        if !partners.iter().all(Partner::is_complete) {
            return Err(BookingError::validation(
                "enter the first and last name of all three partners",
            ));
        }
        self.partners = Some(partners);

        if self.state == WorkflowState::CollectingCredentials
            || !self.session.profile.has_club_credentials()
        {
            self.state = WorkflowState::CollectingCredentials;
            return Ok(Progress::NeedsCredentials);
        }
        self.submit().await.map(Progress::Submitted)
    }

    /// Stores the request.
    ///
    /// Checks run in order: pending-request policy, profile names, window
    /// still closed, partner directory update, then the atomic conflict check
    /// and insert.
    pub async fn submit(&mut self) -> Result<SubmissionReceipt, BookingError> {
        if self.state != WorkflowState::CollectingPartners {
            return Err(self.invalid("submit"));
        }
        let partners = self.partners.clone().ok_or_else(|| {
            BookingError::validation("enter your three partners before submitting")
        })?;
        if !self.session.profile.has_club_credentials() {
            self.state = WorkflowState::CollectingCredentials;
            return Err(BookingError::CredentialsRequired);
        }
        let (match_date, court, range) = self.complete_selection()?;

        self.state = WorkflowState::Submitting;
        if let Err(e) = self.guard_pending("submit") {
            if self.state == WorkflowState::Submitting {
                self.state = WorkflowState::CollectingPartners;
            }
            return Err(e);
        }

        let (first_name, last_name) = match (
            self.session.profile.first_name.clone(),
            self.session.profile.last_name.clone(),
        ) {
            (Some(first), Some(last)) if self.session.profile.has_full_name() => (first, last),
            _ => {
                self.state = WorkflowState::CollectingPartners;
                return Err(BookingError::validation(
                    "add your first and last name to your profile first",
                ));
            }
        };

        let window = self.settings.window(match_date);
        if window.already_open {
            self.state = WorkflowState::CollectingSelection;
            return Err(BookingError::WindowAlreadyOpen {
                opens_at: window.opens_at,
            });
        }

        if let Err(e) = self
            .booking_store
            .upsert_partners(&self.session.user.id, &partners)
            .await
        {
            warn!("Failed to save partners for {}: {}", self.session.user.id, e);
            self.state = WorkflowState::CollectingPartners;
            return Err(BookingError::Storage(e));
        }

        let request = NewBookingRequest {
            user_id: self.session.user.id.clone(),
            court,
            match_date,
            time_range: range,
            partners,
            reservation_opens_at: window.opens_at,
        };

        let booking = match self.conflicts.insert_if_free(request).await {
            Ok(booking) => booking,
            Err(BookingError::Conflict) => {
                info!(
                    "{} on {} {}-{} is already requested",
                    court, match_date, range.start, range.end
                );
                self.state = WorkflowState::Rejected;
                return Err(BookingError::Conflict);
            }
            Err(e) => {
                warn!("Failed to store booking request: {}", e);
                self.state = WorkflowState::CollectingPartners;
                return Err(e);
            }
        };

        let loaded = self.loaded.get_or_insert_with(Vec::new);
        loaded.push(booking.clone());
        most_recent_first(loaded);
        let label = booking_label(&first_name, &last_name, loaded.len());

        self.state = WorkflowState::Completed;
        self.clear_times();
        self.partners = None;

        info!("Booking request {} ({}) submitted", booking.id, label);
        Ok(SubmissionReceipt { booking, label })
    }

    /// Deletes one of the member's own requests while it is still pending.
    pub async fn cancel(&mut self, booking_id: &str) -> Result<(), BookingError> {
        let removed = self
            .booking_store
            .cancel_pending(booking_id, &self.session.user.id)
            .await?;
        if !removed {
            debug!(
                "Booking {} is not a pending request of {}",
                booking_id, self.session.user.id
            );
            return Err(BookingError::NotCancellable);
        }
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.retain(|b| b.id != booking_id);
        }
        info!("Booking request {} cancelled", booking_id);
        Ok(())
    }

    /// Starts over after a completed or rejected request, keeping date and court.
    pub fn reset_for_new_request(&mut self) -> Result<(), BookingError> {
        if !matches!(
            self.state,
            WorkflowState::Completed | WorkflowState::Rejected
        ) {
            return Err(self.invalid("start a new request"));
        }
        self.clear_times();
        self.partners = None;
        self.state = WorkflowState::CollectingSelection;
        Ok(())
    }
}
