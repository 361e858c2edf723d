// Password hashing and session tokens

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Stored in place of a hash for accounts that cannot log in with a password.
pub const UNUSABLE_PASSWORD: &str = "!";

/// Hash a password using Argon2id, returning the PHC string for storage
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored hash. Unusable or malformed hashes never match.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    if stored_hash == UNUSABLE_PASSWORD {
        return false;
    }
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Malformed password hash in store: {}", e);
            false
        }
    }
}

pub fn new_session_token() -> String {
    Uuid::new_v4().simple().to_string()
}
