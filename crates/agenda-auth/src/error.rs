//! Authentication error types.
//!
//! This module defines all error outcomes the auth engine can surface to
//! callers. Internal failure reasons that must never reach a client (such
//! as *why* a refresh token was rejected) live next to the components that
//! produce them and are only logged; everything here is safe to map to an
//! HTTP response.

/// Errors that can occur during authentication and session operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The client exceeded the login rate limit. Retryable after refill.
    #[error("Too many login attempts. Please try again later.")]
    RateLimitExceeded,

    /// Credential verification failed. Deliberately generic: the message
    /// never reveals whether the username exists.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The presented refresh token is unusable. Collapses expired, used,
    /// revoked and not-found into one outcome to avoid oracle attacks.
    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    /// The request lacks valid bearer credentials.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Description of why the request is unauthorized.
        message: String,
    },

    /// The access token is invalid, malformed, or cannot be parsed.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Description of why the token is invalid.
        message: String,
    },

    /// The access token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// The anti-forgery cookie/header pair was missing or did not match.
    /// Distinct from authentication failures.
    #[error("Forbidden: missing or invalid anti-forgery token")]
    CsrfRejected,

    /// An evicted session identifier was presented. Handled as a redirect
    /// to the session-expired endpoint, not an error body.
    #[error("Session expired")]
    SessionExpired,

    /// The request is invalid or malformed (e.g. duplicate username).
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// An error occurred while storing or retrieving auth data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Unauthorized` error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidToken` error.
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !self.is_server_error()
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Internal { .. })
    }

    /// Returns `true` if this is an authentication failure (401 category).
    #[must_use]
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::InvalidRefreshToken
                | Self::Unauthorized { .. }
                | Self::InvalidToken { .. }
                | Self::TokenExpired
        )
    }

    /// Returns `true` if the caller may retry after the rate bucket refills.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimitExceeded)
    }
}

/// Type alias for authentication results.
pub type AuthResult<T> = Result<T, AuthError>;
