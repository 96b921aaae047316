//! Bearer token authentication extractor.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use agenda_auth::middleware::{AuthState, BearerAuth};
//!
//! async fn protected_handler(BearerAuth(auth): BearerAuth) -> String {
//!     format!("Hello, {}!", auth.subject())
//! }
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .with_state(auth_state);
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AuthError;
use crate::session::SessionRegistry;
use crate::token::jwt::JwtService;

use super::types::AuthContext;

// =============================================================================
// Auth State
// =============================================================================

/// State required by the auth extractors.
///
/// Include this in the application state and expose it via `FromRef`.
#[derive(Clone)]
pub struct AuthState {
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,

    /// Session registry for session-cookie resolution.
    pub sessions: Arc<SessionRegistry>,
}

impl AuthState {
    /// Creates a new auth state.
    #[must_use]
    pub fn new(jwt_service: Arc<JwtService>, sessions: Arc<SessionRegistry>) -> Self {
        Self {
            jwt_service,
            sessions,
        }
    }
}

// =============================================================================
// Bearer Auth Extractor
// =============================================================================

/// Axum extractor that validates `Authorization: Bearer` tokens.
///
/// # Errors
///
/// Returns `AuthError` (which implements `IntoResponse`) if the header is
/// missing or malformed, or the token fails validation.
pub struct BearerAuth(pub AuthContext);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::unauthorized("Missing Authorization header"))?;

        let claims = auth_state.jwt_service.verify_for_request(token)?;
        Ok(BearerAuth(AuthContext { claims }))
    }
}
