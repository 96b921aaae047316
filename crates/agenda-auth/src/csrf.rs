//! Double-submit anti-forgery tokens.
//!
//! The server hands the client a random token in a cookie the frontend can
//! read (`XSRF-TOKEN`, deliberately not HttpOnly). State-changing requests
//! must echo the same value in the `X-XSRF-TOKEN` header. A forged
//! cross-site request carries the cookie automatically but cannot read it
//! to fill in the header, so cookie/header agreement proves the request
//! originated from the frontend.
//!
//! Verification failures are a distinct outcome from authentication
//! failures: the caller may hold a perfectly valid session and still be
//! refused here.

use axum::http::Method;

use crate::error::{AuthError, AuthResult};
use crate::token::generate_opaque;

/// Cookie carrying the anti-forgery token. Readable by frontend scripts.
pub const CSRF_COOKIE_NAME: &str = "XSRF-TOKEN";

/// Header the client must echo the cookie value into.
pub const CSRF_HEADER_NAME: &str = "X-XSRF-TOKEN";

/// Number of random bytes in an anti-forgery token.
const CSRF_TOKEN_BYTES: usize = 32;

/// Generates a fresh anti-forgery token value.
#[must_use]
pub fn issue_token() -> String {
    generate_opaque(CSRF_TOKEN_BYTES)
}

/// Returns `true` for methods that must present a matching token pair.
///
/// Safe methods (GET, HEAD, OPTIONS, TRACE) are exempt, matching the
/// standard anti-forgery model: they must not have side effects to protect.
#[must_use]
pub fn requires_protection(method: &Method) -> bool {
    !matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// Compares two token values in constant time.
#[must_use]
pub fn tokens_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Verifies the cookie/header pair of a protected request.
///
/// # Errors
///
/// Returns `AuthError::CsrfRejected` if either half is missing, empty, or
/// the two values differ.
pub fn verify(cookie: Option<&str>, header: Option<&str>) -> AuthResult<()> {
    match (cookie, header) {
        (Some(c), Some(h)) if !c.is_empty() && tokens_match(c, h) => Ok(()),
        _ => Err(AuthError::CsrfRejected),
    }
}
