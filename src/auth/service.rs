use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;
use validator::Validate;

use crate::auth::password::{PasswordHasher, MAX_PASSWORD_BYTES};
use crate::auth::token::TokenService;
use crate::auth::{Credentials, LoginResponse};
use crate::error::AppError;
use crate::models::User;
use crate::store::Store;

/// Account creation and login.
///
/// Token introspection (`GET /todo`) needs no service: `AuthMiddleware` verifies
/// the token and the handler reflects its claims.
pub struct AuthService {
    store: Arc<dyn Store>,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenService>,
    min_password_length: usize,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn Store>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
        min_password_length: usize,
    ) -> Self {
        Self {
            store,
            hasher: Arc::new(hasher),
            tokens,
            min_password_length,
        }
    }

    /// Registers a new account and returns it. The stored credential is a
    /// salted hash; the plaintext never leaves this function.
    pub async fn signup(&self, credentials: Credentials) -> Result<User, AppError> {
        credentials.validate()?;
        self.check_password(&credentials.password)?;

        if self.store.find_user(&credentials.username).await?.is_some() {
            return Err(AppError::DuplicateUser(format!(
                "Username {} is already taken",
                credentials.username
            )));
        }

        let hasher = Arc::clone(&self.hasher);
        let password = credentials.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

        // A concurrent signup for the same name surfaces here as a store conflict.
        let user = self
            .store
            .create_user(User::new(credentials.username, password_hash))
            .await?;
        info!("Created user {}", user.username);
        Ok(user)
    }

    /// Verifies the credentials and issues a session token.
    ///
    /// An unknown username and a wrong password produce the same
    /// `AppError::InvalidCredentials`, after the same amount of hashing work.
    pub async fn login(&self, credentials: Credentials) -> Result<LoginResponse, AppError> {
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(AppError::InvalidInput(
                "username and password are required".into(),
            ));
        }

        let user = self.store.find_user(&credentials.username).await?;
        let hasher = Arc::clone(&self.hasher);
        let password = credentials.password;
        // bcrypt would truncate anything longer, so it could never have been set.
        let too_long = password.len() > MAX_PASSWORD_BYTES;
        let verified = tokio::task::spawn_blocking(move || match user {
            Some(user) if !too_long => {
                hasher.verify(&password, &user.password_hash).then_some(user)
            }
            _ => {
                hasher.verify_dummy(&password);
                None
            }
        })
        .await?;

        let user = verified.ok_or_else(|| {
            warn!("Failed login attempt for {}", credentials.username);
            AppError::InvalidCredentials
        })?;

        let ttl = self.tokens.default_ttl();
        let token = self.tokens.issue(&user.username, ttl)?;
        info!("User {} logged in", user.username);
        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_at: Utc::now() + ttl,
        })
    }

    fn check_password(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_password_length {
            return Err(AppError::InvalidInput(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AppError::InvalidInput(format!(
                "Password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }
        Ok(())
    }
}
