//! Access token encoding and validation.
//!
//! Access tokens are short-lived HS256 JWTs carrying a fixed claim set:
//! subject, issuer, audience, issued-at, not-before and expiry. The server
//! keeps no record of issued access tokens; once handed out they are owned
//! by the client until they expire.
//!
//! Validation distinguishes failure kinds for logging ([`JwtError`]), but
//! callers that only need a yes/no answer can collapse them with
//! [`JwtError::is_validation_error`] or by matching on `Result::is_ok`.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while encoding or validating access tokens.
///
/// All validation kinds collapse to the same outward behavior (the token is
/// rejected); the distinction exists for logs and tests only.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Description of the encoding error.
        message: String,
    },

    /// The token signature does not verify against the shared secret.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token expired more than the skew tolerance ago.
    #[error("Token expired")]
    Expired,

    /// The token's not-before instant is further in the future than the
    /// skew tolerance allows.
    #[error("Token not yet valid")]
    NotYetValid,

    /// The `iss` claim does not match the configured issuer.
    #[error("Issuer mismatch")]
    IssuerMismatch,

    /// The `aud` claim does not match the configured audience.
    #[error("Audience mismatch")]
    AudienceMismatch,

    /// The token could not be parsed at all.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of the parse failure.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Returns `true` if this error means the presented token is invalid
    /// (as opposed to a server-side encoding failure).
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        !matches!(self, Self::Encoding { .. })
    }

    /// Short stable name for structured log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Encoding { .. } => "encoding",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired => "expired",
            Self::NotYetValid => "not_yet_valid",
            Self::IssuerMismatch => "issuer_mismatch",
            Self::AudienceMismatch => "audience_mismatch",
            Self::Malformed { .. } => "malformed",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidIssuer => Self::IssuerMismatch,
            ErrorKind::InvalidAudience => Self::AudienceMismatch,
            _ => Self::malformed(err.to_string()),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Encoding { message } => AuthError::internal(message),
            JwtError::Expired => AuthError::TokenExpired,
            // The kind is enough for the response; the detail stays in logs.
            other => AuthError::invalid_token(other.kind()),
        }
    }
}

// ============================================================================
// Token Claims
// ============================================================================

/// Claim set embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessTokenClaims {
    /// Subject (username).
    pub sub: String,

    /// Issuer.
    pub iss: String,

    /// Audience.
    pub aud: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Not valid before (Unix timestamp).
    pub nbf: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

// ============================================================================
// JWT Service
// ============================================================================

/// Signs and validates access tokens with a shared symmetric key.
///
/// Construction borrows the relevant pieces of [`AuthConfig`]; the service
/// itself is immutable and cheap to share behind an `Arc`.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    access_token_lifetime_secs: i64,
    leeway_secs: u64,
}

impl JwtService {
    /// Creates a new service from validated configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.signing_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_token_lifetime_secs: config.access_token_lifetime.as_secs() as i64,
            leeway_secs: config.clock_skew.as_secs(),
        }
    }

    /// Issues a signed access token for `subject`, valid from now until
    /// now + the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Encoding` if serialization or signing fails.
    pub fn issue_access_token(&self, subject: &str) -> Result<String, JwtError> {
        self.issue_access_token_at(subject, OffsetDateTime::now_utc())
    }

    /// Issues a token as if the current instant were `now`.
    ///
    /// The timestamp seam exists so expiry and not-before behavior can be
    /// exercised without sleeping.
    pub fn issue_access_token_at(
        &self,
        subject: &str,
        now: OffsetDateTime,
    ) -> Result<String, JwtError> {
        let iat = now.unix_timestamp();
        let claims = AccessTokenClaims {
            sub: subject.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat,
            nbf: iat,
            exp: iat + self.access_token_lifetime_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::encoding(e.to_string()))
    }

    /// Validates a token and returns its claims.
    ///
    /// Checks, in library order: parseability, signature, expiry and
    /// not-before (both with the configured skew leeway), issuer, audience.
    ///
    /// # Errors
    ///
    /// Returns the specific [`JwtError`] kind; callers that must not leak
    /// the distinction log it and surface a generic failure.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_nbf = true;
        validation.leeway = self.leeway_secs;

        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }

    /// Validates a token and returns only its subject.
    ///
    /// # Errors
    ///
    /// Same failure kinds as [`Self::validate_access_token`].
    pub fn subject_of(&self, token: &str) -> Result<String, JwtError> {
        self.validate_access_token(token).map(|c| c.sub)
    }

    /// Validates a bearer token for a request, logging the detailed failure
    /// kind and converting it to the engine error type.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` or `AuthError::InvalidToken`.
    pub fn verify_for_request(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        self.validate_access_token(token).map_err(|e| {
            debug!(kind = e.kind(), "Access token rejected");
            e.into()
        })
    }

    /// Returns the configured issuer string.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the configured audience string.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }
}
