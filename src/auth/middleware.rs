use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::AuthService;
use crate::db::UserId;
use crate::error::{AppError, AuthError};

const BEARER: &str = "Bearer";

/// The authenticated caller, placed in request extensions by [`AuthGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub UserId);

impl CallerId {
    pub fn id(&self) -> UserId {
        self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromRequest for CallerId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<CallerId>()
                .copied()
                .ok_or(AppError::AuthError(AuthError::MissingCaller)),
        )
    }
}

/// Resolves the caller from an `Authorization: Bearer <token>` header.
pub fn authorize(headers: &HeaderMap, auth: &AuthService) -> Result<UserId, AuthError> {
    let header = match headers.get(AUTHORIZATION) {
        Some(value) => value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?,
        None => return Err(AuthError::EmptyAuthHeader),
    };
    if header.is_empty() {
        return Err(AuthError::EmptyAuthHeader);
    }

    let parts: Vec<&str> = header.split(' ').collect();
    let [scheme, token] = parts[..] else {
        return Err(AuthError::InvalidAuthHeader);
    };
    if scheme != BEARER {
        return Err(AuthError::InvalidAuthHeader);
    }
    if token.is_empty() {
        return Err(AuthError::EmptyToken);
    }

    auth.verify(token)
}

/// Middleware guarding protected scopes. Rejections short-circuit with a
/// 401 JSON body before the wrapped service runs.
#[derive(Clone)]
pub struct AuthGate {
    auth: Arc<AuthService>,
}

impl AuthGate {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self { auth }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateMiddleware {
            service,
            auth: self.auth.clone(),
        }))
    }
}

pub struct AuthGateMiddleware<S> {
    service: S,
    auth: Arc<AuthService>,
}

impl<S, B> Service<ServiceRequest> for AuthGateMiddleware<S>
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
        match authorize(req.headers(), &self.auth) {
            Ok(user_id) => {
                debug!("Authorized caller {} for {}", user_id, req.path());
                req.extensions_mut().insert(CallerId(user_id));
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(err) => {
                match &err {
                    AuthError::Unauthorized(reason) => {
                        warn!("Rejected token for {}: {}", req.path(), reason)
                    }
                    other => warn!("Rejected request to {}: {}", req.path(), other),
                }
                let response = req.error_response(AppError::from(err)).map_into_right_body();
                Box::pin(ready(Ok(response)))
            }
        }
    }
}
