//! Room password hashing. Only PHC-formatted argon2 hashes are ever stored.
//!
//! Argon2 is CPU bound, so both entry points run on the blocking pool.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tokio::task;
use tracing::warn;

use crate::error::ServiceError;

/// Hash `password` with a random salt.
pub async fn hash_password(password: &str) -> Result<String, ServiceError> {
    let password = password.to_owned();
    task::spawn_blocking(move || hash_blocking(&password))
        .await
        .map_err(|err| ServiceError::Internal(format!("password hashing task failed: {err}")))?
}

/// Check `password` against a stored hash. Malformed hashes never verify.
pub async fn verify_password(password: &str, stored: &str) -> Result<bool, ServiceError> {
    let password = password.to_owned();
    let stored = stored.to_owned();
    task::spawn_blocking(move || verify_blocking(&password, &stored))
        .await
        .map_err(|err| ServiceError::Internal(format!("password verification task failed: {err}")))
}

fn hash_blocking(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ServiceError::Internal(format!("failed to hash room password: {err}")))
}

fn verify_blocking(password: &str, stored: &str) -> bool {
    let parsed = match PasswordHash::new(stored) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(error = %err, "stored room password hash is malformed");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
