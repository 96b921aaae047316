//! Refresh token rotation service.
//!
//! Implements one-time-use rotation over a [`RefreshTokenStorage`] backend:
//! redeeming a token consumes it and atomically replaces it with a fresh one
//! for the same user. Any outcome other than success collapses to the same
//! generic rejection at the API boundary; the precise reason is only logged.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::storage::RefreshTokenStorage;
use crate::types::RefreshToken;

/// Why a refresh token was refused. Never serialized into responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshRejection {
    /// No record matches the presented value.
    NotFound,
    /// The record exists but its expiry has passed.
    Expired,
    /// The record was already consumed by an earlier rotation.
    Used,
    /// The record was revoked by logout or by a newer login.
    Revoked,
}

impl RefreshRejection {
    fn kind(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Expired => "expired",
            Self::Used => "used",
            Self::Revoked => "revoked",
        }
    }
}

/// Issues, rotates, and revokes refresh tokens.
pub struct RefreshTokenService {
    storage: Arc<dyn RefreshTokenStorage>,
    lifetime: Duration,
}

impl RefreshTokenService {
    /// Creates a new service over the given storage backend.
    #[must_use]
    pub fn new(storage: Arc<dyn RefreshTokenStorage>, config: &AuthConfig) -> Self {
        Self {
            storage,
            lifetime: config.refresh_token_lifetime,
        }
    }

    /// Issues a fresh token for `user_id`, revoking any outstanding ones.
    ///
    /// Called at login: a new session always starts from a clean slate, so
    /// tokens held by a previous session stop working here.
    ///
    /// # Errors
    ///
    /// Returns a storage error if persistence fails.
    pub async fn issue(&self, user_id: Uuid) -> AuthResult<RefreshToken> {
        let token = RefreshToken::issue(user_id, self.lifetime);
        self.storage.insert_rotated(&token).await?;
        debug!(user_id = %user_id, token_id = %token.id, "Issued refresh token");
        Ok(token)
    }

    /// Redeems a token: consumes `value` and returns its replacement.
    ///
    /// The replacement belongs to the same user and restarts the full
    /// lifetime. Exactly one concurrent redemption of the same value can
    /// succeed; all others are rejected.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidRefreshToken` for every rejection reason
    /// (unknown, expired, used, revoked), so a caller probing the endpoint
    /// learns nothing about which one applied. A rejected record is deleted
    /// from storage; presenting the same value again reads as unknown.
    pub async fn redeem(&self, value: &str) -> AuthResult<RefreshToken> {
        let found = self.storage.find_by_value(value).await?;

        let Some(current) = found else {
            return Err(self.reject(None, RefreshRejection::NotFound));
        };

        if current.is_revoked() {
            self.storage.delete_by_value(value).await?;
            return Err(self.reject(Some(&current), RefreshRejection::Revoked));
        }
        if current.is_used() {
            self.storage.delete_by_value(value).await?;
            return Err(self.reject(Some(&current), RefreshRejection::Used));
        }
        if current.is_expired() {
            // The record is done for; delete it (and anything else past its
            // expiry) rather than waiting for the next scheduled sweep.
            self.storage.cleanup_expired().await?;
            return Err(self.reject(Some(&current), RefreshRejection::Expired));
        }

        // Claim the token. A concurrent redemption may have beaten us here;
        // the storage reports the prior state so only one caller wins.
        let was_used = self.storage.mark_used(value).await?;
        if was_used {
            self.storage.delete_by_value(value).await?;
            return Err(self.reject(Some(&current), RefreshRejection::Used));
        }

        let next = RefreshToken::issue(current.user_id, self.lifetime);
        self.storage.insert_rotated(&next).await?;

        debug!(
            user_id = %current.user_id,
            consumed = %current.id,
            issued = %next.id,
            "Rotated refresh token"
        );
        Ok(next)
    }

    /// Revokes every token belonging to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the operation fails.
    pub async fn revoke_all(&self, user_id: Uuid) -> AuthResult<u64> {
        let revoked = self.storage.revoke_by_user(user_id).await?;
        if revoked > 0 {
            debug!(user_id = %user_id, count = revoked, "Revoked refresh tokens");
        }
        Ok(revoked)
    }

    /// Deletes expired token records.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the cleanup fails.
    pub async fn sweep(&self) -> AuthResult<u64> {
        let deleted = self.storage.cleanup_expired().await?;
        if deleted > 0 {
            info!(deleted, "Swept expired refresh tokens");
        }
        Ok(deleted)
    }

    fn reject(&self, token: Option<&RefreshToken>, reason: RefreshRejection) -> AuthError {
        match token {
            Some(t) => {
                // Reuse of a consumed or revoked token can indicate theft of
                // the superseded value, so those log louder.
                if matches!(reason, RefreshRejection::Used | RefreshRejection::Revoked) {
                    warn!(
                        user_id = %t.user_id,
                        token_id = %t.id,
                        reason = reason.kind(),
                        "Refresh token replay rejected"
                    );
                } else {
                    debug!(
                        user_id = %t.user_id,
                        token_id = %t.id,
                        reason = reason.kind(),
                        "Refresh token rejected"
                    );
                }
            }
            None => debug!(reason = reason.kind(), "Refresh token rejected"),
        }
        AuthError::InvalidRefreshToken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_kinds_have_stable_names() {
        assert_eq!(RefreshRejection::NotFound.kind(), "not_found");
        assert_eq!(RefreshRejection::Used.kind(), "used");
        assert_eq!(RefreshRejection::Revoked.kind(), "revoked");
        assert_eq!(RefreshRejection::Expired.kind(), "expired");
    }
}
