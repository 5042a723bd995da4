/// Password hashing and verification using Argon2id
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{AuthError, Result};

/// Hash a password using Argon2id with a fresh random salt.
///
/// Hashing the same password twice yields different digests because a new
/// 16-byte salt is generated per call.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let digest = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    Ok(digest)
}

/// Verify a password against a stored PHC-formatted digest.
///
/// A malformed digest is treated as a mismatch rather than an error, so
/// callers can use the result directly as an authentication decision.
pub fn verify_password(password: &str, digest: &str) -> bool {
    let parsed = match PasswordHash::new(digest) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse battery staple").expect("should hash");
        assert!(verify_password("correct horse battery staple", &hash));
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("correct horse battery staple").expect("should hash");
        assert!(!verify_password("Tr0ub4dor&3", &hash));
    }

    #[test]
    fn test_same_password_different_digests() {
        let hash1 = hash_password("hunter2").expect("should hash");
        let hash2 = hash_password("hunter2").expect("should hash");
        // Different salts must produce different digests
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_malformed_digest_is_false_not_error() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "$argon2id$garbage"));
    }
}
