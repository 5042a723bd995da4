//! Session/token authority for actix-web services.
//!
//! Issues, verifies, refreshes and revokes self-contained signed tokens,
//! backed by a shared revocation store (Redis in production, an in-memory
//! implementation for tests). The access guard middleware turns a verified
//! token into a request-scoped [`Identity`], and the role gate enforces the
//! `user < manager < admin` hierarchy on top of it.
//!
//! ```no_run
//! use std::sync::Arc;
//! use actix_web::{web, App, HttpServer};
//! use auth_core::{AuthGuard, AuthSettings, RedisStore, RoleGuard, Role, TokenAuthority};
//!
//! #[actix_web::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = AuthSettings::from_env()?;
//!     let store = Arc::new(RedisStore::connect(&settings.redis_url).await?);
//!     let authority = Arc::new(TokenAuthority::new(&settings, store));
//!
//!     HttpServer::new(move || {
//!         App::new().service(
//!             web::scope("/api")
//!                 .wrap(RoleGuard::new(Role::Manager))
//!                 .wrap(AuthGuard::new(authority.clone())),
//!         )
//!     })
//!     .bind(("0.0.0.0", 8080))?
//!     .run()
//!     .await?;
//!     Ok(())
//! }
//! ```

pub mod authority;
pub mod config;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod password;
pub mod store;
pub mod token;

pub use authority::{RefreshedAccessToken, TokenAuthority};
pub use config::AuthSettings;
pub use error::AuthError;
pub use identity::{role_rank, Identity, MaybeIdentity, Role};
pub use middleware::{AuthGuard, RoleGuard};
pub use password::{hash_password, verify_password};
pub use store::{MemoryStore, RedisStore, RevocationStore, StoreError};
pub use token::{Claims, TokenType};
