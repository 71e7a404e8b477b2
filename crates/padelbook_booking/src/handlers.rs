use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use padelbook_common::http::map_json_error;
use padelbook_common::models::{
    BookingRequest, ClubCredentials, Court, CurrentUser, Partner, Profile, Role, SavedPartner,
    Session, TimeRange,
};
use padelbook_common::{forbidden, validation_error, BookingStore, PadelbookError, ProfileStore};
use padelbook_config::AppConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::AuthUser;
use crate::availability::{upcoming_start_times, AvailabilityClient};
use crate::conflict::ConflictChecker;
use crate::courts::CourtSlot;
use crate::error::BookingError;
use crate::settings::BookingSettings;
use crate::workflow::{BookingWorkflow, Progress, SelectionOutcome, SubmissionReceipt};

/// Shared state of the booking routes.
#[derive(Clone)]
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub settings: BookingSettings,
    pub booking_store: Arc<dyn BookingStore>,
    pub profile_store: Arc<dyn ProfileStore>,
    pub availability: Option<AvailabilityClient>,
}

impl BookingState {
    pub fn new(
        config: Arc<AppConfig>,
        booking_store: Arc<dyn BookingStore>,
        profile_store: Arc<dyn ProfileStore>,
    ) -> Result<Self, PadelbookError> {
        let settings = BookingSettings::from_config(&config.booking)?;
        let availability = match (config.use_availability, config.availability.as_ref()) {
            (true, Some(availability_config)) => {
                Some(AvailabilityClient::from_config(availability_config)?)
            }
            (true, None) => {
                warn!("use_availability is set but no availability section is configured");
                None
            }
            (false, _) => None,
        };
        Ok(Self {
            config,
            settings,
            booking_store,
            profile_store,
            availability,
        })
    }

    pub fn with_settings(mut self, settings: BookingSettings) -> Self {
        self.settings = settings;
        self
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, PadelbookError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| validation_error("Invalid date format (YYYY-MM-DD)"))
}

fn parse_slot_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

async fn load_session(state: &BookingState, user: CurrentUser) -> Result<Session, PadelbookError> {
    let profile = state.profile_store.ensure_profile(&user.id).await?;
    let role = state.profile_store.role_of(&user.id).await?;
    Ok(Session {
        user,
        profile,
        role,
    })
}

async fn require_admin(state: &BookingState, user: &CurrentUser) -> Result<(), PadelbookError> {
    match state.profile_store.role_of(&user.id).await? {
        Role::Admin => Ok(()),
        Role::User => {
            warn!("User {} tried to reach an admin route", user.id);
            Err(forbidden("administrators only"))
        }
    }
}

fn workflow(state: &BookingState, session: Session) -> BookingWorkflow {
    BookingWorkflow::new(
        session,
        state.booking_store.clone(),
        state.profile_store.clone(),
        state.settings.clone(),
    )
}

// --- Reservation window ---

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct WindowQuery {
    /// Match date in YYYY-MM-DD format
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-06-20"))]
    pub date: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReservationWindowResponse {
    pub match_date: NaiveDate,
    pub opens_at: DateTime<Utc>,
    pub already_open: bool,
    pub external_booking_url: Option<String>,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/reservation-window",
    params(WindowQuery),
    responses(
        (status = 200, description = "When the club opens bookings for this date", body = ReservationWindowResponse),
        (status = 400, description = "Invalid date")
    ),
    tag = "Booking"
))]
pub async fn get_reservation_window_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ReservationWindowResponse>, PadelbookError> {
    let match_date = parse_date(&query.date)?;
    let window = state.settings.window(match_date);
    Ok(Json(ReservationWindowResponse {
        match_date,
        opens_at: window.opens_at,
        already_open: window.already_open,
        external_booking_url: state.settings.external_booking_url.clone(),
    }))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/courts",
    responses((status = 200, description = "Court table", body = [CourtSlot])),
    tag = "Booking"
))]
pub async fn get_courts_handler(State(state): State<Arc<BookingState>>) -> Json<Vec<CourtSlot>> {
    Json(state.settings.courts.slots().to_vec())
}

// --- Availability ---

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct AvailabilityQuery {
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-06-20"))]
    pub date: String,
    /// Court number (1-3)
    #[cfg_attr(feature = "openapi", schema(example = 1))]
    pub court: u8,
}

#[derive(Serialize, Debug, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SlotView {
    pub start_time: String,
    /// Start plus the court's match length, when that stays within the day
    pub end_time: Option<NaiveTime>,
    /// Another member already asked for an overlapping slot
    pub already_requested: bool,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AvailabilityResponse {
    pub match_date: NaiveDate,
    pub court: u8,
    pub slots: Vec<SlotView>,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Upcoming slots of the court", body = AvailabilityResponse),
        (status = 400, description = "Invalid date or court"),
        (status = 502, description = "Availability webhook failed"),
        (status = 503, description = "Availability lookups are disabled")
    ),
    tag = "Booking"
))]
pub async fn get_availability_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, PadelbookError> {
    let client = match (state.config.use_availability, state.availability.as_ref()) {
        (true, Some(client)) => client,
        _ => {
            return Err(PadelbookError::UnavailableError(
                "availability service is disabled".to_string(),
            ))
        }
    };
    let match_date = parse_date(&query.date)?;
    let court = Court::try_from(query.court).map_err(validation_error)?;

    let Some(external_id) = state.settings.courts.external_id(court) else {
        info!("{} has no external id, no availability to show", court);
        return Ok(Json(AvailabilityResponse {
            match_date,
            court: court.number(),
            slots: Vec::new(),
        }));
    };

    let slots = client.fetch_slots(match_date).await?;
    let checker = ConflictChecker::new(state.booking_store.clone());

    let mut views = Vec::new();
    for start_time in upcoming_start_times(&slots, external_id) {
        let Some(start) = parse_slot_time(&start_time) else {
            warn!("Ignoring slot with unreadable start time '{}'", start_time);
            continue;
        };
        let end_time = state.settings.courts.suggested_end_time(court, start);
        let already_requested = match end_time {
            Some(end) => {
                let range = TimeRange::new(start, end)
                    .map_err(|e| PadelbookError::InternalError(e.to_string()))?;
                checker
                    .check_conflict(court, match_date, range)
                    .await
                    .map_err(PadelbookError::from)?
            }
            None => false,
        };
        views.push(SlotView {
            start_time,
            end_time,
            already_requested,
        });
    }

    Ok(Json(AvailabilityResponse {
        match_date,
        court: court.number(),
        slots: views,
    }))
}

// --- Bookings ---

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateBookingRequest {
    pub match_date: NaiveDate,
    #[cfg_attr(feature = "openapi", schema(value_type = u8, example = 2))]
    pub court: Court,
    pub start_time: NaiveTime,
    /// Defaults to the court's match length after `start_time`
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<Partner>))]
    pub partners: [Partner; 3],
    /// Club login, required once when the profile has none
    #[serde(default)]
    pub credentials: Option<ClubCredentials>,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/bookings",
    responses((status = 200, description = "The caller's booking requests, most recent first", body = [BookingRequest])),
    tag = "Booking"
))]
pub async fn list_bookings_handler(
    State(state): State<Arc<BookingState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<BookingRequest>>, PadelbookError> {
    map_json_error(
        state.booking_store.list_user_bookings(&user.id).await,
        PadelbookError::from,
    )
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Request stored", body = SubmissionReceipt),
        (status = 400, description = "Incomplete or invalid request"),
        (status = 409, description = "Slot already requested, or a pending request exists"),
        (status = 422, description = "The club's booking window is already open"),
        (status = 428, description = "Club credentials required"),
        (status = 503, description = "Storage unavailable, retry")
    ),
    tag = "Booking"
))]
pub async fn create_booking_handler(
    State(state): State<Arc<BookingState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<SubmissionReceipt>), PadelbookError> {
    let session = load_session(&state, user).await?;
    let mut workflow = workflow(&state, session);
    workflow.load_bookings().await?;

    let end_time = match payload.end_time {
        Some(end) => end,
        None => state
            .settings
            .courts
            .suggested_end_time(payload.court, payload.start_time)
            .ok_or_else(|| validation_error("the match would end after midnight"))?,
    };

    workflow.select_date(payload.match_date)?;
    workflow.select_court(payload.court)?;
    workflow.select_times(payload.start_time, end_time)?;

    if let SelectionOutcome::WindowAlreadyOpen { opens_at, .. } = workflow.confirm_selection()? {
        return Err(BookingError::WindowAlreadyOpen { opens_at }.into());
    }

    let mut progress = workflow.provide_partners(payload.partners).await?;
    if progress == Progress::NeedsCredentials {
        let credentials = payload
            .credentials
            .ok_or(BookingError::CredentialsRequired)?;
        progress = workflow.provide_credentials(credentials).await?;
    }

    match progress {
        Progress::Submitted(receipt) => Ok((StatusCode::CREATED, Json(receipt))),
        other => Err(PadelbookError::InternalError(format!(
            "booking workflow stopped early: {:?}",
            other
        ))),
    }
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/bookings/{id}",
    params(("id" = String, Path, description = "Booking request id")),
    responses(
        (status = 204, description = "Request cancelled"),
        (status = 409, description = "Not a pending request of the caller")
    ),
    tag = "Booking"
))]
pub async fn cancel_booking_handler(
    State(state): State<Arc<BookingState>>,
    AuthUser(user): AuthUser,
    Path(booking_id): Path<String>,
) -> Result<StatusCode, PadelbookError> {
    let session = load_session(&state, user).await?;
    workflow(&state, session).cancel(&booking_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Profile ---

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProfileResponse {
    pub user_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub club_id: Option<String>,
    pub has_club_credentials: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "user"))]
    pub role: Role,
}

impl ProfileResponse {
    fn new(profile: Profile, email: Option<String>, role: Role) -> Self {
        Self {
            has_club_credentials: profile.has_club_credentials(),
            club_id: profile.credentials.map(|c| c.club_id),
            user_id: profile.user_id,
            email,
            first_name: profile.first_name,
            last_name: profile.last_name,
            role,
        }
    }
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/profile",
    responses((status = 200, description = "The caller's profile", body = ProfileResponse)),
    tag = "Profile"
))]
pub async fn get_profile_handler(
    State(state): State<Arc<BookingState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<ProfileResponse>, PadelbookError> {
    let session = load_session(&state, user).await?;
    Ok(Json(ProfileResponse::new(
        session.profile,
        session.user.email,
        session.role,
    )))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Empty name")
    ),
    tag = "Profile"
))]
pub async fn update_profile_handler(
    State(state): State<Arc<BookingState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, PadelbookError> {
    let first_name = payload.first_name.trim();
    let last_name = payload.last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(validation_error("first and last name are required"));
    }
    let profile = state
        .profile_store
        .update_names(&user.id, first_name, last_name)
        .await?;
    let role = state.profile_store.role_of(&user.id).await?;
    info!("Profile names updated for {}", user.id);
    Ok(Json(ProfileResponse::new(profile, user.email, role)))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/profile/credentials",
    request_body = ClubCredentials,
    responses(
        (status = 204, description = "Credentials saved"),
        (status = 400, description = "Missing identifier or password")
    ),
    tag = "Profile"
))]
pub async fn update_credentials_handler(
    State(state): State<Arc<BookingState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<ClubCredentials>,
) -> Result<StatusCode, PadelbookError> {
    if !payload.is_complete() {
        return Err(validation_error("club identifier and password are required"));
    }
    let credentials = ClubCredentials {
        club_id: payload.club_id.trim().to_string(),
        password: payload.password,
    };
    state
        .profile_store
        .save_credentials(&user.id, &credentials)
        .await?;
    info!("Club credentials updated for {}", user.id);
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/partners",
    responses((status = 200, description = "Partners the caller played with", body = [SavedPartner])),
    tag = "Profile"
))]
pub async fn list_partners_handler(
    State(state): State<Arc<BookingState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<SavedPartner>>, PadelbookError> {
    map_json_error(
        state.booking_store.list_partners(&user.id).await,
        PadelbookError::from,
    )
}

// --- Admin ---

/// Profile as shown to administrators. The club password is never included.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AdminProfileView {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub club_id: Option<String>,
    pub has_club_credentials: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Profile> for AdminProfileView {
    fn from(profile: Profile) -> Self {
        Self {
            has_club_credentials: profile.has_club_credentials(),
            club_id: profile.credentials.map(|c| c.club_id),
            user_id: profile.user_id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            updated_at: profile.updated_at,
        }
    }
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/admin/bookings",
    responses(
        (status = 200, description = "Every booking request", body = [BookingRequest]),
        (status = 403, description = "Not an administrator")
    ),
    tag = "Admin"
))]
pub async fn admin_list_bookings_handler(
    State(state): State<Arc<BookingState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<BookingRequest>>, PadelbookError> {
    require_admin(&state, &user).await?;
    map_json_error(
        state.booking_store.list_all_bookings().await,
        PadelbookError::from,
    )
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/admin/bookings/{id}",
    params(("id" = String, Path, description = "Booking request id")),
    responses(
        (status = 204, description = "Request cancelled"),
        (status = 403, description = "Not an administrator"),
        (status = 409, description = "Not a pending request")
    ),
    tag = "Admin"
))]
pub async fn admin_cancel_booking_handler(
    State(state): State<Arc<BookingState>>,
    AuthUser(user): AuthUser,
    Path(booking_id): Path<String>,
) -> Result<StatusCode, PadelbookError> {
    require_admin(&state, &user).await?;
    if !state.booking_store.cancel_pending_any(&booking_id).await? {
        return Err(BookingError::NotCancellable.into());
    }
    info!("Admin {} cancelled booking {}", user.id, booking_id);
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/admin/profiles",
    responses(
        (status = 200, description = "All member profiles", body = [AdminProfileView]),
        (status = 403, description = "Not an administrator")
    ),
    tag = "Admin"
))]
pub async fn admin_list_profiles_handler(
    State(state): State<Arc<BookingState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<AdminProfileView>>, PadelbookError> {
    require_admin(&state, &user).await?;
    let profiles = state.profile_store.list_profiles().await?;
    Ok(Json(profiles.into_iter().map(AdminProfileView::from).collect()))
}
