//! Token codec: self-contained signed claims using HS256.
//!
//! The codec verifies the MAC before trusting any claim. Expiry is reported
//! as a distinct [`CodecError`] kind here; the authority collapses it into
//! the generic invalid-token error at its boundary.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::{AuthError, Result};

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Token type tag carried in every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// Identity claims embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User identifier
    pub user_id: i64,
    /// Email, a display field only, not the trust anchor
    pub email: String,
    /// Role literal: "user", "manager" or "admin". Refresh tokens on the
    /// wire may omit it, in which case it defaults to "user".
    #[serde(default = "default_role")]
    pub role: String,
    /// Token type tag
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token identifier, for traceability only
    pub jti: String,
}

fn default_role() -> String {
    "user".to_string()
}

impl Claims {
    pub fn new(
        user_id: i64,
        email: &str,
        role: &str,
        token_type: TokenType,
        lifetime_secs: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            email: email.to_string(),
            role: role.to_string(),
            token_type,
            iat: now.timestamp(),
            exp: now.timestamp() + lifetime_secs,
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Decode failure kinds, MAC checked first.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token signature")]
    InvalidSignature,
    #[error("Malformed token")]
    Malformed,
}

impl From<jsonwebtoken::errors::Error> for CodecError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => CodecError::Expired,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::ImmatureSignature => CodecError::InvalidSignature,
            _ => CodecError::Malformed,
        }
    }
}

/// Serialize and sign claims into the compact token representation.
pub fn encode_claims(claims: &Claims, secret: &str) -> Result<String> {
    encode(
        &Header::new(JWT_ALGORITHM),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("Failed to encode token: {}", e)))
}

/// Verify the MAC and deserialize claims.
///
/// `enforce_expiry = false` skips only the expiry check (the signature is
/// always verified); it exists so revoke-all cleanup can still identify the
/// owner of a registered-but-expired refresh token.
pub fn decode_claims(
    token: &str,
    secret: &str,
    enforce_expiry: bool,
) -> std::result::Result<Claims, CodecError> {
    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = enforce_expiry;
    // Expiry must be exact, not fuzzy by the default 60s leeway
    validation.leeway = 0;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "codec-test-secret";

    #[test]
    fn test_encode_decode_roundtrip() {
        let claims = Claims::new(7, "test@example.com", "manager", TokenType::Access, 3600);
        let token = encode_claims(&claims, SECRET).expect("should encode");
        // JWT tokens have 3 parts separated by dots
        assert_eq!(token.matches('.').count(), 2);

        let decoded = decode_claims(&token, SECRET, true).expect("should decode");
        assert_eq!(decoded.user_id, 7);
        assert_eq!(decoded.email, "test@example.com");
        assert_eq!(decoded.role, "manager");
        assert_eq!(decoded.token_type, TokenType::Access);
        assert_eq!(decoded.jti, claims.jti);
    }

    #[test]
    fn test_wrong_secret_is_signature_error() {
        let claims = Claims::new(7, "test@example.com", "user", TokenType::Access, 3600);
        let token = encode_claims(&claims, SECRET).expect("should encode");

        let result = decode_claims(&token, "another-secret", true);
        assert!(matches!(result, Err(CodecError::InvalidSignature)));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let result = decode_claims("not.a.token", SECRET, true);
        assert!(matches!(result, Err(CodecError::Malformed)));
    }

    #[test]
    fn test_expired_token_is_distinct_kind() {
        let claims = Claims::new(7, "test@example.com", "user", TokenType::Access, -10);
        let token = encode_claims(&claims, SECRET).expect("should encode");

        let result = decode_claims(&token, SECRET, true);
        assert!(matches!(result, Err(CodecError::Expired)));
    }

    #[test]
    fn test_expiry_check_can_be_skipped() {
        let claims = Claims::new(42, "test@example.com", "user", TokenType::Refresh, -10);
        let token = encode_claims(&claims, SECRET).expect("should encode");

        let decoded = decode_claims(&token, SECRET, false).expect("should decode without expiry");
        assert_eq!(decoded.user_id, 42);
        assert_eq!(decoded.token_type, TokenType::Refresh);
    }

    #[test]
    fn test_jti_is_unique_per_token() {
        let a = Claims::new(1, "a@example.com", "user", TokenType::Access, 3600);
        let b = Claims::new(1, "a@example.com", "user", TokenType::Access, 3600);
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_missing_role_defaults_to_user() {
        // Refresh tokens from older issuers carry no role claim at all
        let json = serde_json::json!({
            "user_id": 5,
            "email": "old@example.com",
            "type": "refresh",
            "iat": 0,
            "exp": i64::MAX / 2,
            "jti": "fixed",
        });
        let claims: Claims = serde_json::from_value(json).expect("should deserialize");
        assert_eq!(claims.role, "user");
    }
}
