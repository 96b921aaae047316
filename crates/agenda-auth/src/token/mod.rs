//! Token issuance and rotation.
//!
//! - [`jwt`] - signed, self-describing access tokens
//! - [`refresh`] - opaque, server-tracked rotating refresh tokens

pub mod jwt;
pub mod refresh;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use rand::rngs::OsRng;

/// Generates a cryptographically random opaque token.
///
/// Used for refresh-token values, session identifiers, and CSRF tokens.
/// Returns `bytes` of OS entropy encoded as unpadded base64url.
#[must_use]
pub fn generate_opaque(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_tokens_are_distinct() {
        let a = generate_opaque(32);
        let b = generate_opaque(32);
        assert_ne!(a, b);
        // 32 bytes base64url encoded = 43 characters
        assert_eq!(a.len(), 43);
    }

    #[test]
    fn opaque_tokens_are_url_safe() {
        let token = generate_opaque(32);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
