//! HTTP handlers for the auth endpoints.
//!
//! Handlers are thin: extract, delegate to [`AuthService`], shape the
//! response. All policy lives in the service and middleware layers.

pub mod login;
pub mod logout;
pub mod probe;
pub mod refresh;
pub mod register;

use std::sync::Arc;

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};

use crate::middleware::auth::AuthState;
use crate::service::{AuthService, IssuedTokens};

/// Shared state for the auth endpoint handlers.
#[derive(Clone)]
pub struct AuthApi {
    /// The orchestrating service.
    pub service: Arc<AuthService>,

    /// Extractor state for bearer and session auth.
    pub auth_state: AuthState,
}

impl FromRef<AuthApi> for AuthState {
    fn from_ref(api: &AuthApi) -> Self {
        api.auth_state.clone()
    }
}

/// Token pair response returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// Signed JWT access token.
    pub access_token: String,

    /// Opaque refresh token value.
    pub refresh_token: String,

    /// Login name of the authenticated user.
    pub username: String,

    /// Always `"Bearer"`.
    pub token_type: String,
}

impl TokenResponse {
    pub(crate) fn new(username: impl Into<String>, tokens: IssuedTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            username: username.into(),
            token_type: "Bearer".to_string(),
        }
    }
}

/// Simple message body for endpoints with nothing richer to say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
