//! Authentication engine configuration.
//!
//! Configuration is organized into sections with serde defaults, so a TOML
//! file only needs to override the values it cares about. Durations use
//! humantime strings ("15m", "7d", "30s").

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Minimum acceptable signing secret length in bytes.
///
/// HS256 keys shorter than the hash output weaken the signature; 32 bytes
/// matches the SHA-256 block the token MAC is built on.
pub const MIN_SECRET_BYTES: usize = 32;

/// Root configuration for the auth engine.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// issuer = "agenda-backend"
/// audience = "agenda-frontend"
/// signing_secret = "<at least 32 bytes of entropy>"
/// access_token_lifetime = "15m"
/// refresh_token_lifetime = "7d"
/// clock_skew = "30s"
///
/// [auth.rate_limit]
/// capacity = 5
/// refill_period = "1m"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token issuer string (the `iss` claim).
    pub issuer: String,

    /// Token audience string (the `aud` claim).
    pub audience: String,

    /// Symmetric signing secret for access tokens.
    /// Must be at least [`MIN_SECRET_BYTES`] bytes.
    pub signing_secret: String,

    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Clock-skew tolerance applied to `exp` and `nbf` validation.
    #[serde(with = "humantime_serde")]
    pub clock_skew: Duration,

    /// Login rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Interval between expired-refresh-token sweeps.
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "agenda-backend".to_string(),
            audience: "agenda-frontend".to_string(),
            signing_secret: String::new(),
            access_token_lifetime: Duration::from_secs(15 * 60),
            refresh_token_lifetime: Duration::from_secs(7 * 24 * 3600),
            clock_skew: Duration::from_secs(30),
            rate_limit: RateLimitConfig::default(),
            sweep_interval: Duration::from_secs(24 * 3600),
        }
    }
}

/// Login rate limiting configuration.
///
/// Token-bucket semantics: `capacity` attempts are available up front and
/// refill proportionally over `refill_period`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Bucket capacity (attempts available when full).
    pub capacity: u32,

    /// Time for an empty bucket to refill completely.
    #[serde(with = "humantime_serde")]
    pub refill_period: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            refill_period: Duration::from_secs(60),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the issuer or audience is empty, the
    /// signing secret is missing or too short, a lifetime is zero, or the
    /// rate-limit section is degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.is_empty() {
            return Err(ConfigError::InvalidValue(
                "issuer cannot be empty".to_string(),
            ));
        }

        if self.audience.is_empty() {
            return Err(ConfigError::InvalidValue(
                "audience cannot be empty".to_string(),
            ));
        }

        if self.signing_secret.is_empty() {
            return Err(ConfigError::Missing("signing_secret".to_string()));
        }

        if self.signing_secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::InvalidValue(format!(
                "signing_secret must be at least {MIN_SECRET_BYTES} bytes, got {}",
                self.signing_secret.len()
            )));
        }

        if self.access_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "access_token_lifetime must be > 0".to_string(),
            ));
        }

        if self.refresh_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "refresh_token_lifetime must be > 0".to_string(),
            ));
        }

        // Skew at or above the access lifetime makes every token "fresh" forever.
        if self.clock_skew >= self.access_token_lifetime {
            return Err(ConfigError::InvalidValue(
                "clock_skew must be smaller than access_token_lifetime".to_string(),
            ));
        }

        if self.rate_limit.capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "rate_limit.capacity must be > 0".to_string(),
            ));
        }

        if self.rate_limit.refill_period.is_zero() {
            return Err(ConfigError::InvalidValue(
                "rate_limit.refill_period must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AuthConfig {
        AuthConfig {
            signing_secret: "0123456789abcdef0123456789abcdef".to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn default_config_misses_secret() {
        let err = AuthConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
        assert!(err.to_string().contains("signing_secret"));
    }

    #[test]
    fn short_secret_fails() {
        let mut config = valid_config();
        config.signing_secret = "too-short".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at least"));
    }

    #[test]
    fn empty_issuer_fails() {
        let mut config = valid_config();
        config.issuer = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_audience_fails() {
        let mut config = valid_config();
        config.audience = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_capacity_fails() {
        let mut config = valid_config();
        config.rate_limit.capacity = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("capacity"));
    }

    #[test]
    fn oversized_skew_fails() {
        let mut config = valid_config();
        config.clock_skew = config.access_token_lifetime;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("clock_skew"));
    }

    #[test]
    fn default_lifetimes() {
        let config = AuthConfig::default();
        assert_eq!(config.access_token_lifetime, Duration::from_secs(900));
        assert_eq!(
            config.refresh_token_lifetime,
            Duration::from_secs(7 * 24 * 3600)
        );
        assert_eq!(config.rate_limit.capacity, 5);
        assert_eq!(config.rate_limit.refill_period, Duration::from_secs(60));
    }

    #[test]
    fn serde_roundtrip() {
        let config = valid_config();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AuthConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.issuer, parsed.issuer);
        assert_eq!(config.access_token_lifetime, parsed.access_token_lifetime);
        assert_eq!(config.rate_limit.capacity, parsed.rate_limit.capacity);
    }
}
