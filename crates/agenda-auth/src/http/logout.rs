//! Logout endpoint.

use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;

use crate::error::AuthResult;
use crate::middleware::session::{OptionalSessionId, removal_cookie};

use super::{AuthApi, MessageResponse};

/// `POST /auth/logout`
///
/// Ends the cookie's session, revokes the user's refresh tokens, and clears
/// the cookie. Idempotent: a stale or missing cookie still gets a 200 and a
/// removal cookie, so a client can always converge on "logged out".
pub async fn logout(
    State(api): State<AuthApi>,
    OptionalSessionId(session_id): OptionalSessionId,
    jar: CookieJar,
) -> AuthResult<impl IntoResponse> {
    api.service.logout(session_id.as_deref()).await?;

    let jar = jar.add(removal_cookie());
    Ok((jar, Json(MessageResponse::new("Logged out"))))
}
