//! Anti-forgery middleware.
//!
//! Two jobs, mirroring the cookie-filter pattern: reject protected requests
//! whose `XSRF-TOKEN` cookie and `X-XSRF-TOKEN` header disagree, and make
//! sure every response leaves the client holding a token cookie so the next
//! request can pass.
//!
//! Credential-establishing endpoints are exempt: a client that has not
//! logged in yet cannot have been seeded with a token, and those endpoints
//! are protected by their own mechanisms (rate limiting, one-time refresh
//! values).

use axum::{
    extract::Request,
    http::{HeaderValue, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use cookie::{Cookie, SameSite};
use tracing::warn;

use crate::csrf::{self, CSRF_COOKIE_NAME, CSRF_HEADER_NAME};

/// Paths that establish credentials and are therefore exempt.
const EXEMPT_PATHS: &[&str] = &["/auth/login", "/auth/register", "/auth/refresh"];

fn is_exempt(path: &str) -> bool {
    EXEMPT_PATHS.contains(&path)
}

/// Axum middleware enforcing the double-submit check.
///
/// Install with `axum::middleware::from_fn(csrf_guard)` on the routers that
/// need it.
pub async fn csrf_guard(request: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let cookie_value = jar.get(CSRF_COOKIE_NAME).map(|c| c.value().to_string());

    if csrf::requires_protection(request.method()) && !is_exempt(request.uri().path()) {
        let header_value = request
            .headers()
            .get(CSRF_HEADER_NAME)
            .and_then(|h| h.to_str().ok());

        if let Err(err) = csrf::verify(cookie_value.as_deref(), header_value) {
            warn!(
                method = %request.method(),
                path = request.uri().path(),
                "Rejected request without matching anti-forgery pair"
            );
            return err.into_response();
        }
    }

    let mut response = next.run(request).await;

    // Seed clients that do not hold a token yet.
    if cookie_value.is_none() {
        let cookie = Cookie::build((CSRF_COOKIE_NAME, csrf::issue_token()))
            .path("/")
            .http_only(false)
            .same_site(SameSite::Lax)
            .build();
        if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    response
}
