//! Argon2id password hashing (PHC string format).

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::domain::types::MIN_PASSWORD_LEN;
use crate::error::AuthServiceError;

/// Reject passwords below the minimum length before hashing anything.
pub fn check_policy(password: &str) -> Result<(), AuthServiceError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthServiceError::WeakPassword);
    }
    Ok(())
}

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthServiceError::Internal(anyhow::anyhow!("hash password: {e}")))
}

/// Verify a plaintext password against a stored PHC hash.
///
/// An unparseable stored hash is an internal fault (corrupt row), not a
/// failed verification.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthServiceError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AuthServiceError::Internal(anyhow::anyhow!("stored password hash unparseable: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
