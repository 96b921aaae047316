//! Password hashing with Argon2id.
//!
//! Hashes use the PHC string format, so parameters travel with the hash and
//! can be tightened later without migrating stored credentials.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use tracing::error;

use crate::error::{AuthError, AuthResult};

/// Hashes a password with a random salt.
///
/// # Errors
///
/// Returns `AuthError::Internal` if hashing fails.
pub fn hash(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::internal(format!("password hashing failed: {e}")))
}

/// Verifies a password against an encoded hash.
///
/// Returns `false` both for a wrong password and for an unparseable hash;
/// the latter is a data problem and is logged, but callers always see the
/// same boolean either way.
#[must_use]
pub fn verify(password: &str, encoded: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(encoded) else {
        error!("Stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let encoded = hash("correct horse battery staple").unwrap();
        assert!(verify("correct horse battery staple", &encoded));
        assert!(!verify("wrong password", &encoded));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash("same-password").unwrap();
        let b = hash("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify("anything", "not-a-phc-string"));
        assert!(!verify("anything", ""));
    }

    #[test]
    fn hash_is_phc_encoded() {
        let encoded = hash("pw").unwrap();
        assert!(encoded.starts_with("$argon2id$"));
    }
}
