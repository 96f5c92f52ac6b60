use crate::error::AppError;
use bcrypt::{hash, verify};
use log::warn;

/// bcrypt only reads the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Salted one-way password hashing backed by bcrypt.
///
/// Every call to [`PasswordHasher::hash`] draws a fresh salt, so hashing the same
/// password twice gives two different strings that both verify.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AppError> {
        // Verified against when a login names an unknown user, so both failure
        // paths spend the same bcrypt time.
        let dummy_hash = hash("tasky-dummy-password", cost)?;
        Ok(Self { cost, dummy_hash })
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Returns `false` for a wrong password and for a malformed stored hash.
    pub fn verify(&self, password: &str, hashed_password: &str) -> bool {
        match verify(password, hashed_password) {
            Ok(matches) => matches,
            Err(e) => {
                warn!("Stored password hash could not be parsed: {}", e);
                false
            }
        }
    }

    /// Burns one verification against a fixed hash. Always returns `false`.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let _ = verify(password, &self.dummy_hash);
        false
    }
}
