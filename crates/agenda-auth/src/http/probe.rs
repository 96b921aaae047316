//! Identity probe and session-expired endpoints.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::middleware::auth::BearerAuth;
use crate::middleware::session::ActiveSession;

use super::MessageResponse;

/// Identity of the caller as asserted by their access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    /// The authenticated username.
    pub username: String,
}

/// `GET /auth/me`
///
/// Cheap probe for "is my access token still good": validates the bearer
/// token and echoes the subject. No storage access.
pub async fn me(BearerAuth(ctx): BearerAuth) -> Json<MeResponse> {
    Json(MeResponse {
        username: ctx.subject().to_string(),
    })
}

/// Live session details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Owning username.
    pub username: String,

    /// When the session was established.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// `GET /auth/session`
///
/// Resolves the session cookie. An evicted session gets redirected to the
/// session-expired endpoint by the extractor; an unknown one gets a 401.
pub async fn session_info(ActiveSession(session): ActiveSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        username: session.username,
        created_at: session.created_at,
    })
}

/// `GET /auth/session-expired`
///
/// Landing target for sessions evicted by a newer login. Always 401 with an
/// explanation; the frontend shows it and sends the user back to login.
pub async fn session_expired() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        Json(MessageResponse::new(
            "Session expired due to a login from another location",
        )),
    )
}
