/// Role gate middleware: compares the attached identity's role rank against
/// a required minimum. Composes with, and must run strictly after, the
/// access guard: no attached identity is an authentication failure, not a
/// permission failure.
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::error::AuthError;
use crate::identity::{role_rank, Identity, Role};

pub struct RoleGuard {
    min_role: Role,
}

impl RoleGuard {
    pub fn new(min_role: Role) -> Self {
        Self { min_role }
    }

    /// Shorthand for `RoleGuard::new(Role::Manager)`.
    pub fn manager() -> Self {
        Self::new(Role::Manager)
    }

    /// Shorthand for `RoleGuard::new(Role::Admin)`.
    pub fn admin() -> Self {
        Self::new(Role::Admin)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RoleGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RoleGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RoleGuardService {
            service: Rc::new(service),
            min_role: self.min_role,
        }))
    }
}

pub struct RoleGuardService<S> {
    service: Rc<S>,
    min_role: Role,
}

impl<S, B> Service<ServiceRequest> for RoleGuardService<S>
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
        let min_role = self.min_role;

        Box::pin(async move {
            let identity = req.extensions().get::<Identity>().cloned();

            let identity = match identity {
                Some(identity) => identity,
                None => {
                    return Ok(reject(
                        req,
                        AuthError::Unauthenticated("User not authenticated".to_string()),
                    ));
                }
            };

            if role_rank(&identity.role) < min_role.rank() {
                tracing::debug!(
                    user_id = identity.id,
                    role = %identity.role,
                    required = min_role.as_str(),
                    "request blocked by role gate"
                );
                return Ok(reject(
                    req,
                    AuthError::Forbidden("Insufficient permissions".to_string()),
                ));
            }

            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Materialize a gate rejection as its `ResponseError` response so the
/// status and JSON body reach the client unchanged.
fn reject<B>(req: ServiceRequest, err: AuthError) -> ServiceResponse<EitherBody<B>> {
    let response = err.error_response().map_into_right_body();
    req.into_response(response)
}
