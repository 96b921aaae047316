//! Refresh endpoint.

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::error::AuthResult;

use super::{AuthApi, TokenResponse};

/// Refresh request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// The opaque refresh token value to redeem.
    pub refresh_token: String,
}

/// `POST /auth/refresh`
///
/// Redeems the presented refresh token for a new pair. The presented value
/// is consumed whether or not the caller stores the replacement; replaying
/// it yields the same generic 401 as an unknown value.
pub async fn refresh(
    State(api): State<AuthApi>,
    Json(request): Json<RefreshRequest>,
) -> AuthResult<Json<TokenResponse>> {
    let outcome = api.service.refresh(&request.refresh_token).await?;
    Ok(Json(TokenResponse::new(outcome.username, outcome.tokens)))
}
