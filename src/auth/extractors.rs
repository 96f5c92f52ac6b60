use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use log::warn;
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::config::OwnershipPolicy;
use crate::error::AppError;

/// The verified session of the caller.
///
/// Reads the `Claims` that `AuthMiddleware` placed in the request extensions.
/// Fails with `AppError::Unauthorized` when they are missing, which only
/// happens on a route outside the protected scope.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl AuthenticatedUser {
    pub fn username(&self) -> &str {
        self.0.username()
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticated(req).map(AuthenticatedUser).map_err(Into::into))
    }
}

fn authenticated(req: &HttpRequest) -> Result<Claims, AppError> {
    req.extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))
}

/// Authorization stage for routes carrying a `{userid}` segment.
///
/// Succeeds only when the segment equals the authenticated username, and yields
/// that username. Otherwise the request is rejected with 404 or 403 according
/// to the configured [`OwnershipPolicy`], before the handler or the store is
/// reached.
#[derive(Debug, Clone)]
pub struct AuthorizedOwner(pub String);

impl AuthorizedOwner {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequest for AuthorizedOwner {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authorize_owner(req).map(AuthorizedOwner).map_err(Into::into))
    }
}

fn authorize_owner(req: &HttpRequest) -> Result<String, AppError> {
    let claims = authenticated(req)?;
    let route_owner = req
        .match_info()
        .get("userid")
        .ok_or_else(|| AppError::InvalidInput("missing userid path segment".into()))?;

    if route_owner == claims.username() {
        return Ok(claims.sub);
    }

    warn!(
        "User {} attempted to access todos of {}",
        claims.username(),
        route_owner
    );
    let policy = req
        .app_data::<web::Data<OwnershipPolicy>>()
        .map(|policy| ***policy)
        .unwrap_or_default();
    Err(match policy {
        OwnershipPolicy::NotFound => AppError::NotFound("Todos not found".into()),
        OwnershipPolicy::Forbidden => {
            AppError::Forbidden("Access to another user's todos is not allowed".into())
        }
    })
}
