//! Login endpoint.

use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::error::AuthResult;
use crate::middleware::client_key::ClientKey;
use crate::middleware::session::session_cookie;

use super::{AuthApi, TokenResponse};

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,

    /// Plaintext password.
    pub password: String,
}

/// `POST /auth/login`
///
/// Runs the full login pipeline and, on success, sets the session cookie
/// and returns the token pair. Rate limiting keys on the resolved client
/// key and rejects with 429 before credentials are even looked at.
pub async fn login(
    State(api): State<AuthApi>,
    ClientKey(client_key): ClientKey,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse> {
    let outcome = api
        .service
        .login(&client_key, &request.username, &request.password)
        .await?;

    let jar = jar.add(session_cookie(&outcome.session.id));
    let body = TokenResponse::new(outcome.profile.username, outcome.tokens);
    Ok((jar, Json(body)))
}
