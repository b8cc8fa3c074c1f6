//! Password hashing with Argon2id.
//!
//! Hashes are stored in PHC string format, so parameters and salt travel
//! with the hash.

use crate::error::{AuthError, Result};
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Hash a password with a fresh random salt.
///
/// # Errors
///
/// Returns [`AuthError::HashingError`] if Argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::HashingError(e.to_string()))
}

/// Check a password against a stored PHC hash.
///
/// # Errors
///
/// Returns [`AuthError::HashingError`] if the stored hash is malformed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| AuthError::HashingError(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
