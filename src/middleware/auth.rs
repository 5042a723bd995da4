/// Access guard middleware: extracts the access token from the transport,
/// verifies it through the authority and attaches [`Identity`] to the
/// request extensions for downstream extractors.
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;

use crate::authority::TokenAuthority;
use crate::error::AuthError;
use crate::identity::Identity;
use crate::token::TokenType;

/// Cookie the access token travels in.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Access guard factory.
///
/// The strict guard rejects requests without a verifiable token; the
/// [`AuthGuard::optional`] variant runs the same checks but lets the
/// request through with no identity attached when they fail.
pub struct AuthGuard {
    authority: Arc<TokenAuthority>,
    optional: bool,
}

impl AuthGuard {
    pub fn new(authority: Arc<TokenAuthority>) -> Self {
        Self {
            authority,
            optional: false,
        }
    }

    pub fn optional(authority: Arc<TokenAuthority>) -> Self {
        Self {
            authority,
            optional: true,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGuardService {
            service: Rc::new(service),
            authority: self.authority.clone(),
            optional: self.optional,
        }))
    }
}

pub struct AuthGuardService<S> {
    service: Rc<S>,
    authority: Arc<TokenAuthority>,
    optional: bool,
}

impl<S, B> Service<ServiceRequest> for AuthGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let authority = self.authority.clone();
        let optional = self.optional;

        Box::pin(async move {
            // Cookie carrier first (the canonical transport), Bearer header
            // as the equivalent fallback.
            let token = req
                .cookie(ACCESS_TOKEN_COOKIE)
                .map(|c| c.value().to_string())
                .or_else(|| bearer_token(&req));

            let token = match token {
                Some(token) => token,
                None => {
                    if optional {
                        return service.call(req).await.map(ServiceResponse::map_into_left_body);
                    }
                    return Ok(reject(
                        req,
                        AuthError::Unauthenticated("Access token is missing".to_string()),
                    ));
                }
            };

            if authority.is_blacklisted(&token).await {
                if optional {
                    return service.call(req).await.map(ServiceResponse::map_into_left_body);
                }
                return Ok(reject(
                    req,
                    AuthError::Unauthenticated("Token has been revoked".to_string()),
                ));
            }

            match authority.verify_token(&token, TokenType::Access).await {
                Ok(claims) => {
                    req.extensions_mut().insert(Identity {
                        id: claims.user_id,
                        email: claims.email,
                        role: claims.role,
                    });
                }
                Err(err) => {
                    if !optional {
                        tracing::debug!("access token rejected: {}", err);
                        return Ok(reject(req, err));
                    }
                }
            }

            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Materialize a guard rejection as its `ResponseError` response so the
/// status and JSON body reach the client unchanged.
fn reject<B>(req: ServiceRequest, err: AuthError) -> ServiceResponse<EitherBody<B>> {
    let response = err.error_response().map_into_right_body();
    req.into_response(response)
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}
