//! Configuration for the token authority.
//!
//! Everything is environment-supplied: the signing secret, the two token
//! lifetimes and the revocation-store URL. A `.env` file is honored in
//! debug builds for local development.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Placeholder secret used when JWT_SECRET_KEY is unset. Fine for local
/// development; running production traffic on it is an operational risk.
pub const DEFAULT_SECRET: &str = "your-secret-key-change-in-production";

const DEFAULT_ACCESS_TTL_SECS: i64 = 3600; // 1 hour
const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 3600; // 7 days

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    pub secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    pub redis_url: String,
}

impl AuthSettings {
    pub fn from_env() -> Result<Self> {
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
        }

        let secret = env::var("JWT_SECRET_KEY").unwrap_or_else(|_| DEFAULT_SECRET.to_string());
        if secret == DEFAULT_SECRET {
            warn!("JWT_SECRET_KEY not set; using the placeholder signing secret");
        }

        let settings = Self {
            secret,
            access_ttl_secs: env::var("ACCESS_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| DEFAULT_ACCESS_TTL_SECS.to_string())
                .parse()
                .context("Invalid ACCESS_TOKEN_TTL_SECS")?,
            refresh_ttl_secs: env::var("REFRESH_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| DEFAULT_REFRESH_TTL_SECS.to_string())
                .parse()
                .context("Invalid REFRESH_TOKEN_TTL_SECS")?,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379/0".to_string()),
        };

        if settings.access_ttl_secs <= 0 {
            anyhow::bail!("ACCESS_TOKEN_TTL_SECS must be a positive number of seconds");
        }
        if settings.refresh_ttl_secs <= 0 {
            anyhow::bail!("REFRESH_TOKEN_TTL_SECS must be a positive number of seconds");
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults() {
        env::remove_var("JWT_SECRET_KEY");
        env::remove_var("ACCESS_TOKEN_TTL_SECS");
        env::remove_var("REFRESH_TOKEN_TTL_SECS");
        env::remove_var("REDIS_URL");

        let settings = AuthSettings::from_env().unwrap();

        assert_eq!(settings.secret, DEFAULT_SECRET);
        assert_eq!(settings.access_ttl_secs, 3600);
        assert_eq!(settings.refresh_ttl_secs, 604800);
        assert_eq!(settings.redis_url, "redis://localhost:6379/0");
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var("JWT_SECRET_KEY", "test-secret");
        env::set_var("ACCESS_TOKEN_TTL_SECS", "120");
        env::set_var("REFRESH_TOKEN_TTL_SECS", "86400");
        env::set_var("REDIS_URL", "redis://cache:6379/1");

        let settings = AuthSettings::from_env().unwrap();

        assert_eq!(settings.secret, "test-secret");
        assert_eq!(settings.access_ttl_secs, 120);
        assert_eq!(settings.refresh_ttl_secs, 86400);
        assert_eq!(settings.redis_url, "redis://cache:6379/1");

        env::remove_var("JWT_SECRET_KEY");
        env::remove_var("ACCESS_TOKEN_TTL_SECS");
        env::remove_var("REFRESH_TOKEN_TTL_SECS");
        env::remove_var("REDIS_URL");
    }

    #[test]
    #[serial]
    fn test_invalid_ttl_is_rejected() {
        env::set_var("ACCESS_TOKEN_TTL_SECS", "soon");
        let result = AuthSettings::from_env();
        assert!(result.is_err());
        env::remove_var("ACCESS_TOKEN_TTL_SECS");
    }

    #[test]
    #[serial]
    fn test_non_positive_ttl_is_rejected() {
        env::set_var("REFRESH_TOKEN_TTL_SECS", "-604800");
        let result = AuthSettings::from_env();
        assert!(result.is_err());
        env::remove_var("REFRESH_TOKEN_TTL_SECS");

        env::set_var("ACCESS_TOKEN_TTL_SECS", "0");
        let result = AuthSettings::from_env();
        assert!(result.is_err());
        env::remove_var("ACCESS_TOKEN_TTL_SECS");
    }
}
