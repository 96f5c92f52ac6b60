//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the single error type returned by services and
//! handlers. Each variant maps to one HTTP status, and every error body has the
//! shape `{"error": "<message>"}`.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so handlers can return
//! `Result<_, AppError>` directly. `From` implementations for the store, validator,
//! JWT and bcrypt error types let the `?` operator do the conversion.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use log::error;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::store::StoreError;

/// Message sent for every rejected session token, whatever the underlying cause.
pub const INVALID_TOKEN_MESSAGE: &str = "invalid or expired token";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Malformed request body, path segment, or a value failing shape constraints (HTTP 400).
    InvalidInput(String),
    /// Signup for a username that is already registered (HTTP 409).
    DuplicateUser(String),
    /// Login failed. Covers both an unknown username and a wrong password (HTTP 401).
    InvalidCredentials,
    /// Missing, invalid or expired session token (HTTP 401).
    Unauthorized(String),
    /// Ownership mismatch when the service is configured to disclose it (HTTP 403).
    Forbidden(String),
    /// Resource absent, or owned by someone else (HTTP 404).
    NotFound(String),
    /// Store failure or other unexpected server-side error (HTTP 500).
    /// The message is logged but never sent to the client.
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "Invalid Input: {}", msg),
            AppError::DuplicateUser(msg) => write!(f, "Duplicate User: {}", msg),
            AppError::InvalidCredentials => write!(f, "Invalid Credentials"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateUser(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::InvalidInput(msg)
            | AppError::DuplicateUser(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::InvalidCredentials => "invalid username or password".to_string(),
            AppError::Internal(detail) => {
                error!("internal error: {}", detail);
                "internal server error".to_string()
            }
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::InvalidInput(error.to_string())
    }
}

/// A uniqueness conflict can only come from creating a user, so it maps to
/// `DuplicateUser`. Everything else is an internal failure.
impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::Conflict(msg) => AppError::DuplicateUser(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Every JWT failure collapses into the same client-visible message.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(INVALID_TOKEN_MESSAGE.into())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("password hashing failed: {}", error))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> AppError {
        AppError::Internal(format!("blocking task failed: {}", error))
    }
}
