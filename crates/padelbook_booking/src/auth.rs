use axum::{extract::FromRequestParts, http::request::Parts};
use padelbook_common::models::CurrentUser;
use padelbook_common::PadelbookError;
use tracing::debug;

/// Header carrying the authenticated user id, set by the auth proxy.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Extracts the caller's identity from the proxy headers. Requests without a
/// user id are rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub CurrentUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = PadelbookError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let id = header(USER_ID_HEADER).ok_or_else(|| {
            debug!("Request without {} header", USER_ID_HEADER);
            PadelbookError::AuthError(format!("missing {} header", USER_ID_HEADER))
        })?;

        Ok(AuthUser(CurrentUser {
            id,
            email: header(USER_EMAIL_HEADER),
        }))
    }
}
