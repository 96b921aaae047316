//! Session cookie extractors and helpers.
//!
//! The session identifier travels in an HttpOnly cookie. Resolving it can
//! produce three outcomes: an active session, an evicted one (a newer login
//! took over, answered with a redirect), or nothing.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use cookie::{Cookie, SameSite};

use crate::error::AuthError;
use crate::session::{Session, SessionLookup};

use super::auth::AuthState;

/// Cookie carrying the session identifier.
pub const SESSION_COOKIE_NAME: &str = "AGENDA_SESSION";

/// Builds the session cookie for a newly established session.
///
/// HttpOnly keeps it out of reach of scripts; SameSite=Lax stops it riding
/// along on cross-site POSTs while still covering top-level navigation.
#[must_use]
pub fn session_cookie(session_id: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, session_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Builds a removal cookie that clears the session cookie on the client.
#[must_use]
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    cookie.make_removal();
    cookie
}

/// Axum extractor requiring a live session.
///
/// # Errors
///
/// - `AuthError::SessionExpired` if the presented id was evicted by a newer
///   login (rendered as a redirect to the session-expired endpoint)
/// - `AuthError::Unauthorized` if the cookie is missing or unknown
pub struct ActiveSession(pub Session);

impl<S> FromRequestParts<S> for ActiveSession
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let id = jar
            .get(SESSION_COOKIE_NAME)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AuthError::unauthorized("No session"))?;

        match auth_state.sessions.resolve(&id) {
            SessionLookup::Active(session) => Ok(ActiveSession(session)),
            SessionLookup::Evicted => Err(AuthError::SessionExpired),
            SessionLookup::Unknown => Err(AuthError::unauthorized("No active session")),
        }
    }
}

/// Axum extractor reading the session cookie without resolving it.
///
/// Used by logout, which must succeed whether or not the session is still
/// live.
pub struct OptionalSessionId(pub Option<String>);

impl<S> FromRequestParts<S> for OptionalSessionId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let id = jar
            .get(SESSION_COOKIE_NAME)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty());
        Ok(OptionalSessionId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only_lax() {
        let cookie = session_cookie("abc123");
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "abc123");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn removal_cookie_expires_immediately() {
        let cookie = removal_cookie();
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert!(cookie.value().is_empty());
        // Max-Age=0 signals deletion.
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
