//! Authentication orchestration.
//!
//! [`AuthService`] owns the fixed login pipeline and ties the individual
//! components together. The ordering inside [`AuthService::login`] is part
//! of the security contract and must not be rearranged:
//!
//! 1. rate gate on the client key, before any expensive work
//! 2. credential verification with timing parity for unknown usernames
//! 3. generic rejection that never says which half of the credentials failed
//! 4. session establishment (evicting the user's previous session)
//! 5. token issuance (revoking the user's previous refresh tokens)

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::password;
use crate::rate_limit::RateLimiter;
use crate::session::{Session, SessionRegistry};
use crate::storage::{RefreshTokenStorage, UserStorage};
use crate::token::jwt::{AccessTokenClaims, JwtService};
use crate::token::refresh::RefreshTokenService;
use crate::types::User;
use crate::types::user::UserProfile;

/// Maximum accepted username length.
const MAX_USERNAME_LEN: usize = 64;

/// Minimum accepted password length at registration.
const MIN_PASSWORD_LEN: usize = 8;

/// Access and refresh token pair handed to a client.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    /// Signed JWT access token.
    pub access_token: String,

    /// Opaque one-time-use refresh token value.
    pub refresh_token: String,
}

/// Everything a successful login produces.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The authenticated user.
    pub profile: UserProfile,

    /// Freshly established session.
    pub session: Session,

    /// Freshly issued token pair.
    pub tokens: IssuedTokens,
}

/// Result of redeeming a refresh token.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    /// Login name of the token's owner.
    pub username: String,

    /// Replacement token pair.
    pub tokens: IssuedTokens,
}

/// Coordinates rate limiting, credentials, sessions, and tokens.
pub struct AuthService {
    users: Arc<dyn UserStorage>,
    refresh: RefreshTokenService,
    jwt: Arc<JwtService>,
    sessions: Arc<SessionRegistry>,
    limiter: RateLimiter,
    /// Hash verified for unknown usernames so lookups that miss cost the
    /// same as lookups that hit.
    parity_hash: String,
}

impl AuthService {
    /// Builds the service from validated configuration and storage backends.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the timing-parity hash cannot be
    /// computed.
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserStorage>,
        refresh_storage: Arc<dyn RefreshTokenStorage>,
        jwt: Arc<JwtService>,
        sessions: Arc<SessionRegistry>,
    ) -> AuthResult<Self> {
        let parity_hash = password::hash("timing-parity-placeholder")?;
        Ok(Self {
            users,
            refresh: RefreshTokenService::new(refresh_storage, config),
            jwt,
            sessions,
            limiter: RateLimiter::new(&config.rate_limit),
            parity_hash,
        })
    }

    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidRequest` for malformed input or a taken
    /// username, or an internal error if hashing fails.
    pub async fn register(&self, username: &str, password: &str) -> AuthResult<UserProfile> {
        // Usernames are case-insensitive; the lowercase form is canonical.
        let username = username.trim().to_lowercase();
        if username.is_empty() || username.len() > MAX_USERNAME_LEN {
            return Err(AuthError::invalid_request(format!(
                "username must be 1-{MAX_USERNAME_LEN} characters"
            )));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::invalid_request(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let user = User::new(username.as_str(), password::hash(password)?);
        self.users.create(&user).await?;

        info!(user_id = %user.id, username = %user.username, "Registered new user");
        Ok(user.profile())
    }

    /// Authenticates a user and establishes a fresh session.
    ///
    /// `client_key` identifies the caller for rate limiting (resolved from
    /// forwarding headers or the peer address by the HTTP layer). Every call
    /// that reaches this method consumes one rate token, success or not.
    ///
    /// # Errors
    ///
    /// - `AuthError::RateLimitExceeded` if the client key's bucket is empty;
    ///   returned before any credential work happens
    /// - `AuthError::InvalidCredentials` for any username/password failure
    /// - storage or internal errors if the backends fail
    pub async fn login(
        &self,
        client_key: &str,
        username: &str,
        password: &str,
    ) -> AuthResult<LoginOutcome> {
        if !self.limiter.try_acquire(client_key) {
            return Err(AuthError::RateLimitExceeded);
        }

        let user = self.verify_credentials(username, password).await?;

        let session = self.sessions.begin(user.id, &user.username);
        let tokens = self.issue_tokens(&user).await?;

        info!(
            user_id = %user.id,
            username = %user.username,
            client_key,
            "Login succeeded"
        );
        Ok(LoginOutcome {
            profile: user.profile(),
            session,
            tokens,
        })
    }

    /// Redeems a refresh token for a fresh token pair.
    ///
    /// Does not touch the session: refresh keeps an authenticated frontend
    /// alive without re-running the login pipeline.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidRefreshToken` for every rejection reason.
    pub async fn refresh(&self, refresh_value: &str) -> AuthResult<RefreshOutcome> {
        let next = self.refresh.redeem(refresh_value).await?;

        let Some(user) = self.users.find_by_id(next.user_id).await? else {
            // Account removed while a token was outstanding.
            warn!(user_id = %next.user_id, "Refresh token for missing account");
            self.refresh.revoke_all(next.user_id).await?;
            return Err(AuthError::InvalidRefreshToken);
        };

        let access_token = self.jwt.issue_access_token(&user.username)?;
        Ok(RefreshOutcome {
            username: user.username,
            tokens: IssuedTokens {
                access_token,
                refresh_token: next.value,
            },
        })
    }

    /// Ends a session and revokes its user's refresh tokens.
    ///
    /// Idempotent: logging out with an unknown or already-ended session id
    /// succeeds without effect.
    ///
    /// # Errors
    ///
    /// Returns a storage error if revocation fails.
    pub async fn logout(&self, session_id: Option<&str>) -> AuthResult<()> {
        let Some(id) = session_id else {
            return Ok(());
        };
        let Some(session) = self.sessions.end(id) else {
            return Ok(());
        };

        self.refresh.revoke_all(session.user_id).await?;
        info!(user_id = %session.user_id, username = %session.username, "Logged out");
        Ok(())
    }

    /// Validates a bearer access token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` or `AuthError::InvalidToken`; the
    /// detailed failure kind is logged, not surfaced.
    pub fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        self.jwt.verify_for_request(token)
    }

    /// Revokes all refresh tokens for a user without touching sessions.
    /// Used on credential changes.
    ///
    /// # Errors
    ///
    /// Returns a storage error if revocation fails.
    pub async fn revoke_user_tokens(&self, user_id: Uuid) -> AuthResult<u64> {
        self.refresh.revoke_all(user_id).await
    }

    /// Deletes expired refresh token records. Driven by the sweep task.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the cleanup fails.
    pub async fn sweep_refresh_tokens(&self) -> AuthResult<u64> {
        self.refresh.sweep().await
    }

    /// Remaining login attempts for a client key.
    #[must_use]
    pub fn attempts_remaining(&self, client_key: &str) -> u32 {
        self.limiter.available(client_key)
    }

    /// Looks the user up and verifies the password, doing equivalent work
    /// whether or not the username exists.
    async fn verify_credentials(&self, username: &str, pw: &str) -> AuthResult<User> {
        let username = username.trim().to_lowercase();
        match self.users.find_by_username(&username).await? {
            Some(user) => {
                if password::verify(pw, &user.password_hash) {
                    Ok(user)
                } else {
                    debug!(username = %username, "Password verification failed");
                    Err(AuthError::InvalidCredentials)
                }
            }
            None => {
                // Burn a verification against the parity hash so unknown
                // usernames take as long as wrong passwords.
                let _ = password::verify(pw, &self.parity_hash);
                debug!(username = %username, "Unknown username");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    async fn issue_tokens(&self, user: &User) -> AuthResult<IssuedTokens> {
        let access_token = self.jwt.issue_access_token(&user.username)?;
        let refresh_token = self.refresh.issue(user.id).await?;
        Ok(IssuedTokens {
            access_token,
            refresh_token: refresh_token.value,
        })
    }
}
