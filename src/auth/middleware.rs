use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;

use crate::{
    app_state::AppState,
    auth::JwtService,
    errors::{AppError, AppResult},
    middleware::get_request_id,
    models::{
        domain::{Role, User},
        dto::response::UserDto,
    },
    repositories::UserRepository,
};

/// The caller as resolved by [`IdentityGate`]. The role is the one stored on
/// the account, not the one echoed in the token.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
    pub user: UserDto,
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Identity {
            user_id: user.id.clone(),
            role: user.role,
            user: UserDto::from(user),
        }
    }
}

/// Credential present → signature and expiry valid → account exists.
/// Read-only; nothing is refreshed or written.
pub async fn resolve_identity(
    credential: Option<&str>,
    jwt_service: &JwtService,
    users: &dyn UserRepository,
) -> AppResult<Identity> {
    let credential = credential
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("missing credential".to_string()))?;

    let claims = jwt_service.validate_token(credential)?;

    let user = users
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("account not found".to_string()))?;

    Ok(Identity::from(user))
}

/// Resolves the session cookie to an [`Identity`] and stores it in request
/// extensions. Requests that fail are answered here and never reach the
/// wrapped service.
pub struct IdentityGate;

impl<S, B> Transform<S, ServiceRequest> for IdentityGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = IdentityGateService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IdentityGateService {
            service: Rc::new(service),
        }))
    }
}

pub struct IdentityGateService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for IdentityGateService<S>
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

        Box::pin(async move {
            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                let err = AppError::InternalError("application state not configured".to_string());
                return Ok(req.error_response(err).map_into_right_body());
            };

            let credential = req
                .cookie(&state.config.session_cookie_name)
                .map(|cookie| cookie.value().to_string());

            let resolved = resolve_identity(
                credential.as_deref(),
                &state.jwt_service,
                state.user_repository.as_ref(),
            )
            .await;

            match resolved {
                Ok(identity) => {
                    log::debug!("{} {} as user {}", req.method(), req.path(), identity.user_id);
                    req.extensions_mut().insert(identity);

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

/// Extractor for handlers mounted behind [`IdentityGate`].
pub struct AuthenticatedUser(pub Identity);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let identity = req
            .extensions()
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthenticated("missing credential".to_string()));

        ready(identity.map(AuthenticatedUser))
    }
}
