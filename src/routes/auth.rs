use crate::{
    auth::{AuthService, AuthenticatedUser, Credentials, SignupResponse, WhoAmIResponse},
    error::AppError,
};
use actix_web::{get, post, web, HttpResponse, Responder};

/// Register a new user
///
/// ## Responses:
/// - `201 Created`: `{"username": ...}`.
/// - `400 Bad Request`: malformed body, bad username, or password too short/long.
/// - `409 Conflict`: the username is taken.
#[post("/signup")]
pub async fn signup(
    auth: web::Data<AuthService>,
    credentials: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    let user = auth.signup(credentials.into_inner()).await?;
    Ok(HttpResponse::Created().json(SignupResponse {
        username: user.username,
    }))
}

/// Login user
///
/// ## Responses:
/// - `200 OK`: `{"token", "token_type", "expires_at"}`.
/// - `401 Unauthorized`: unknown user or wrong password, indistinguishably.
#[post("/login")]
pub async fn login(
    auth: web::Data<AuthService>,
    credentials: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    let response = auth.login(credentials.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Reports the identity carried by the caller's token (`GET /todo`).
///
/// `AuthMiddleware` has already verified the token, so this only reflects the
/// claims it stored.
#[get("")]
pub async fn whoami(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(WhoAmIResponse::from(&user.0))
}
