//! Request-scoped identity and the role hierarchy.

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Identity attached to a request by the access guard. Downstream handlers
/// receive this explicitly and never touch tokens directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub role: String,
}

/// Role hierarchy: user < manager < admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    User,
    Manager,
    Admin,
}

impl Role {
    pub fn rank(self) -> u8 {
        match self {
            Role::User => 1,
            Role::Manager => 2,
            Role::Admin => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }
}

/// Numeric rank of a role literal. Any string outside the three known
/// roles ranks below `user`.
pub fn role_rank(role: &str) -> u8 {
    match role {
        "user" => 1,
        "manager" => 2,
        "admin" => 3,
        _ => 0,
    }
}

impl FromRequest for Identity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<Identity>().cloned() {
            Some(identity) => ready(Ok(identity)),
            None => ready(Err(
                AuthError::Unauthenticated("User not authenticated".to_string()).into(),
            )),
        }
    }
}

/// Extractor for handlers behind the optional guard: absence of identity is
/// not a rejection, the handler decides.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl FromRequest for MaybeIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(MaybeIdentity(
            req.extensions().get::<Identity>().cloned(),
        )))
    }
}
