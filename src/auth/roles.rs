use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;

use crate::{
    auth::middleware::Identity,
    errors::{AppError, AppResult},
    middleware::get_request_id,
    models::domain::Role,
};

/// Succeeds iff an identity has been resolved and its role is permitted.
/// An empty permitted set rejects everyone.
pub fn authorize(identity: Option<&Identity>, permitted: &[Role]) -> AppResult<()> {
    let identity = identity
        .ok_or_else(|| AppError::Unauthenticated("missing credential".to_string()))?;

    if permitted.contains(&identity.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden("role not permitted".to_string()))
    }
}

/// Role gate. Must be layered inside [`IdentityGate`](crate::auth::IdentityGate);
/// on its own every request is rejected as unauthenticated.
#[derive(Clone)]
pub struct RequireRole {
    permitted: Rc<[Role]>,
}

impl RequireRole {
    pub fn new(permitted: &[Role]) -> Self {
        Self {
            permitted: Rc::from(permitted),
        }
    }

    pub fn educator() -> Self {
        Self::new(&[Role::Educator])
    }

    pub fn student() -> Self {
        Self::new(&[Role::Student])
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleService {
            service: Rc::new(service),
            permitted: Rc::clone(&self.permitted),
        }))
    }
}

pub struct RequireRoleService<S> {
    service: Rc<S>,
    permitted: Rc<[Role]>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
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
        let service = Rc::clone(&self.service);
        let decision = authorize(req.extensions().get::<Identity>(), &self.permitted);

        Box::pin(async move {
            match decision {
                Ok(()) => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => {
                    log::debug!(
                        "[{}] {} {} rejected: {}",
                        get_request_id(req.request()).as_deref().unwrap_or("-"),
                        req.method(),
                        req.path(),
                        err
                    );
                    Ok(req.error_response(err).map_into_right_body())
                }
            }
        })
    }
}
