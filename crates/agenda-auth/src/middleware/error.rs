//! Error response handling for the auth API.
//!
//! Implements `IntoResponse` for `AuthError` so handlers and extractors can
//! return it directly. Bodies are plain JSON objects; an evicted session is
//! the one non-JSON outcome (a redirect to the session-expired endpoint).

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AuthError;

/// Where an evicted session is sent to learn why it stopped working.
pub const SESSION_EXPIRED_PATH: &str = "/auth/session-expired";

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // An evicted session redirects instead of erroring, matching how a
        // browser-facing concurrent-session filter behaves.
        if matches!(self, AuthError::SessionExpired) {
            return (
                StatusCode::SEE_OTHER,
                [(header::LOCATION, HeaderValue::from_static(SESSION_EXPIRED_PATH))],
            )
                .into_response();
        }

        let (status, code, message) = error_details(&self);

        let body = json!({
            "error": code,
            "message": message,
        });

        let mut headers = HeaderMap::new();
        if status == StatusCode::UNAUTHORIZED {
            let www_auth = build_www_authenticate_header(code, &message);
            if let Ok(value) = HeaderValue::from_str(&www_auth) {
                headers.insert(header::WWW_AUTHENTICATE, value);
            }
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            headers.insert(header::RETRY_AFTER, HeaderValue::from_static("60"));
        }

        (status, headers, Json(body)).into_response()
    }
}

/// Maps an error to (HTTP status, stable error code, client message).
fn error_details(error: &AuthError) -> (StatusCode, &'static str, String) {
    match error {
        AuthError::RateLimitExceeded => (
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            error.to_string(),
        ),
        AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            error.to_string(),
        ),
        AuthError::InvalidRefreshToken => (
            StatusCode::UNAUTHORIZED,
            "invalid_refresh_token",
            error.to_string(),
        ),
        AuthError::Unauthorized { message } => {
            (StatusCode::UNAUTHORIZED, "unauthorized", message.clone())
        }
        AuthError::InvalidToken { message } => {
            (StatusCode::UNAUTHORIZED, "invalid_token", message.clone())
        }
        AuthError::TokenExpired => (
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "Token has expired".to_string(),
        ),
        AuthError::CsrfRejected => (StatusCode::FORBIDDEN, "csrf_rejected", error.to_string()),
        AuthError::SessionExpired => (
            // Unreachable: handled as a redirect above. Kept total so the
            // match does not silently misroute a future refactor.
            StatusCode::UNAUTHORIZED,
            "session_expired",
            error.to_string(),
        ),
        AuthError::InvalidRequest { message } => {
            (StatusCode::BAD_REQUEST, "invalid_request", message.clone())
        }
        AuthError::Storage { .. } | AuthError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "server_error",
            // Internal detail stays out of the body.
            "Internal server error".to_string(),
        ),
    }
}

/// Builds the WWW-Authenticate header value for 401 responses.
fn build_www_authenticate_header(error: &str, description: &str) -> String {
    let escaped_desc = description.replace('\"', "\\\"");
    format!("Bearer realm=\"agenda\", error=\"{error}\", error_description=\"{escaped_desc}\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn invalid_credentials_is_generic_401() {
        let response = AuthError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let headers = response.headers().clone();
        let www_auth = headers
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(www_auth.contains("realm=\"agenda\""));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "invalid_credentials");
        assert_eq!(json["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn rate_limit_is_429_with_retry_after() {
        let response = AuthError::RateLimitExceeded.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
    }

    #[tokio::test]
    async fn csrf_rejection_is_403() {
        let response = AuthError::CsrfRejected.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[tokio::test]
    async fn session_expired_redirects() {
        let response = AuthError::SessionExpired.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            SESSION_EXPIRED_PATH
        );
    }

    #[tokio::test]
    async fn internal_detail_is_not_leaked() {
        let response = AuthError::storage("connection pool exhausted").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Internal server error");
    }
}
