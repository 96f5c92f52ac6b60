pub mod extractors;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::{AuthenticatedUser, AuthorizedOwner};
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use service::AuthService;
pub use token::{Claims, TokenService};

lazy_static! {
    // Usernames appear as a path segment, so keep them URL-safe.
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap();
}

/// Credentials submitted to `POST /signup` and `POST /login`.
///
/// The password length minimum is configurable, so it is checked by
/// [`AuthService`] rather than by a static validation rule.
#[derive(Debug, Deserialize, Validate)]
pub struct Credentials {
    /// Between 1 and 64 characters: letters, digits, `_`, `.` or `-`.
    #[validate(
        length(min = 1, max = 64),
        regex(
            path = "USERNAME_REGEX",
            message = "Username may only contain letters, digits, underscores, dots or hyphens"
        )
    )]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Response to a successful signup. Never includes the password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    pub username: String,
}

/// Response to a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The signed session token, to be sent back as `Authorization: Bearer <token>`.
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

/// Response of `GET /todo`: the caller's own claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub username: String,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&Claims> for WhoAmIResponse {
    fn from(claims: &Claims) -> Self {
        Self {
            username: claims.sub.clone(),
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
        }
    }
}
