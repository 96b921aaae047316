//! Request-scoped authentication context.

use crate::token::jwt::AccessTokenClaims;

/// Authentication context extracted from a validated bearer token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Validated token claims.
    pub claims: AccessTokenClaims,
}

impl AuthContext {
    /// The authenticated username (the token subject).
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.claims.sub
    }
}
