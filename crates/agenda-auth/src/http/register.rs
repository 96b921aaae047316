//! Registration endpoint.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use crate::error::AuthResult;

use super::AuthApi;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Desired login name.
    pub username: String,

    /// Plaintext password.
    pub password: String,
}

/// `POST /auth/register`
///
/// Creates an account and returns its public profile. Does not log the new
/// user in; the client follows up with a login request.
pub async fn register(
    State(api): State<AuthApi>,
    Json(request): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse> {
    let profile = api
        .service
        .register(&request.username, &request.password)
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}
