//! Token authority: orchestrates issuance, verification, refresh,
//! revocation and logout over the codec and the revocation store.
//!
//! The authority keeps no mutable in-process state; all session state lives
//! in the injected store, so any number of workers can share one instance.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AuthSettings;
use crate::error::{AuthError, Result};
use crate::store::{BlacklistKey, RefreshTokenKey, RevocationStore};
use crate::token::{decode_claims, encode_claims, Claims, TokenType};

/// Response minted by [`TokenAuthority::refresh_access_token`].
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshedAccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub struct TokenAuthority {
    store: Arc<dyn RevocationStore>,
    secret: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenAuthority {
    pub fn new(settings: &AuthSettings, store: Arc<dyn RevocationStore>) -> Self {
        Self {
            store,
            secret: settings.secret.clone(),
            access_ttl_secs: settings.access_ttl_secs,
            refresh_ttl_secs: settings.refresh_ttl_secs,
        }
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    /// Issue a short-lived stateless access token. No store interaction:
    /// validity is signature + expiry, subject only to later blacklisting.
    pub fn create_access_token(&self, user_id: i64, email: &str, role: &str) -> Result<String> {
        let claims = Claims::new(user_id, email, role, TokenType::Access, self.access_ttl_secs);
        encode_claims(&claims, &self.secret)
    }

    /// Issue a refresh token and register it in the store allow-list.
    ///
    /// Registration is a soft-fail step: if the store is unreachable the
    /// token is still returned so stateless access keeps working, but the
    /// session will not survive a refresh-token check until re-login.
    pub async fn create_refresh_token(&self, user_id: i64, email: &str) -> Result<String> {
        let claims = Claims::new(user_id, email, "user", TokenType::Refresh, self.refresh_ttl_secs);
        let token = encode_claims(&claims, &self.secret)?;

        if let Err(e) = self
            .store
            .put_with_ttl(
                &RefreshTokenKey::storage(&token),
                &user_id.to_string(),
                self.refresh_ttl_secs.max(0) as u64,
            )
            .await
        {
            warn!(user_id, error = %e, "failed to register refresh token; it will not be honored");
        }

        Ok(token)
    }

    /// Verify a token of the expected type.
    ///
    /// Malformed, bad-signature, expired and wrong-type tokens all surface
    /// as [`AuthError::TokenInvalid`]. A refresh token must additionally
    /// have a live allow-list entry; a store outage during that lookup is
    /// treated as "not found" (fail closed).
    pub async fn verify_token(&self, token: &str, expected_type: TokenType) -> Result<Claims> {
        let claims = decode_claims(token, &self.secret, true).map_err(|e| {
            debug!(error = %e, "token rejected by codec");
            AuthError::TokenInvalid
        })?;

        if claims.token_type != expected_type {
            return Err(AuthError::TokenInvalid);
        }

        if expected_type == TokenType::Refresh {
            let registered = match self.store.exists(&RefreshTokenKey::storage(token)).await {
                Ok(registered) => registered,
                Err(e) => {
                    warn!(error = %e, "store unavailable during refresh check; denying");
                    false
                }
            };
            if !registered {
                return Err(AuthError::TokenInvalid);
            }
        }

        Ok(claims)
    }

    /// Whether an access token's raw value sits on the deny-list.
    ///
    /// A store outage here answers "not blacklisted" (fail open); see
    /// DESIGN.md for the deliberate asymmetry with the refresh-token check.
    pub async fn is_blacklisted(&self, token: &str) -> bool {
        match self.store.exists(&BlacklistKey::storage(token)).await {
            Ok(blacklisted) => blacklisted,
            Err(e) => {
                warn!(error = %e, "store unavailable during blacklist check; allowing");
                false
            }
        }
    }

    /// Deny-list an access token until its natural expiry.
    ///
    /// Returns false without writing anything when the token is already
    /// expired: the deny-list never holds records past a token's lifetime.
    pub async fn blacklist_token(&self, token: &str, expires_at: DateTime<Utc>) -> bool {
        let ttl = (expires_at - Utc::now()).num_seconds();
        if ttl <= 0 {
            return false;
        }

        match self
            .store
            .put_with_ttl(&BlacklistKey::storage(token), "1", ttl as u64)
            .await
        {
            Ok(()) => {
                info!(ttl, "access token blacklisted");
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to blacklist token");
                false
            }
        }
    }

    /// Drop a refresh token from the allow-list. Returns true iff a record
    /// was actually removed.
    pub async fn revoke_refresh_token(&self, token: &str) -> bool {
        match self.store.delete(&RefreshTokenKey::storage(token)).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(error = %e, "failed to revoke refresh token");
                false
            }
        }
    }

    /// Remove every registered refresh token belonging to `user_id`.
    ///
    /// Scans the whole allow-list, so cost is proportional to the number of
    /// live refresh tokens across all users. Entries are decoded without
    /// expiry enforcement so registered-but-expired tokens are still cleaned
    /// up; entries that do not decode at all are deleted as garbage. The
    /// scan is not transactional: sessions created after its enumeration
    /// point may be missed, which is fine because they are not the sessions
    /// being revoked.
    pub async fn revoke_all_user_tokens(&self, user_id: i64) -> Result<u64> {
        let entries = self.store.scan_prefix(RefreshTokenKey::PREFIX).await?;

        let mut revoked = 0u64;
        for (key, _value) in entries {
            let Some(token) = RefreshTokenKey::token(&key) else {
                continue;
            };
            match decode_claims(token, &self.secret, false) {
                Ok(claims) if claims.user_id == user_id => {
                    if self.store.delete(&key).await.unwrap_or(false) {
                        revoked += 1;
                    }
                }
                Ok(_) => {}
                Err(_) => {
                    // Undecodable allow-list entries are garbage
                    let _ = self.store.delete(&key).await;
                }
            }
        }

        info!(user_id, revoked, "bulk refresh-token revocation finished");
        Ok(revoked)
    }

    /// Mint a fresh access token from a valid refresh token.
    ///
    /// Non-rotating by design: the refresh token stays honorable until its
    /// own expiry or explicit revocation, so it can back any number of
    /// refresh calls.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<RefreshedAccessToken> {
        let claims = self.verify_token(refresh_token, TokenType::Refresh).await?;

        let access_token =
            self.create_access_token(claims.user_id, &claims.email, &claims.role)?;

        Ok(RefreshedAccessToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_ttl_secs,
        })
    }

    /// End the session owning `refresh_token`.
    ///
    /// Returns false when the token is already invalid or revoked. The
    /// paired access token is *not* blacklisted; it stays honorable until
    /// its own short expiry, which is the accepted exposure window.
    pub async fn logout(&self, refresh_token: &str) -> bool {
        match self.verify_token(refresh_token, TokenType::Refresh).await {
            Ok(claims) => {
                self.revoke_refresh_token(refresh_token).await;
                info!(user_id = claims.user_id, "session logged out");
                true
            }
            Err(_) => false,
        }
    }
}
