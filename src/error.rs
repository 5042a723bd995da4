use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, AuthError>;

/// Error taxonomy of the token authority.
///
/// `TokenInvalid` deliberately collapses malformed, bad-signature, wrong-type,
/// expired and not-registered refresh tokens into one kind: callers never get
/// to distinguish why a credential was rejected.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    TokenInvalid,

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Revocation store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Message safe to return to a client. Transient/internal failures are
    /// masked; rejection reasons keep their short human-readable text.
    fn public_message(&self) -> &str {
        match self {
            AuthError::TokenInvalid => "Invalid token",
            AuthError::Unauthenticated(msg) | AuthError::Forbidden(msg) => msg,
            AuthError::StoreUnavailable(_) => "Service temporarily unavailable",
            AuthError::Internal(_) => "Internal server error",
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => AuthError::StoreUnavailable(msg),
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::TokenInvalid | AuthError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "message": self.public_message() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::TokenInvalid.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::Unauthenticated("no token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Forbidden("nope".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::StoreUnavailable("redis down".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_internal_detail_is_masked() {
        let err = AuthError::StoreUnavailable("connection refused at 10.0.0.5".into());
        assert_eq!(err.public_message(), "Service temporarily unavailable");

        let err = AuthError::Internal("argon2 parameter error".into());
        assert_eq!(err.public_message(), "Internal server error");
    }
}
