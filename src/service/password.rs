//! Argon2id password hashing. Hashes are PHC strings with a per-record salt.

use crate::error::CoopError;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use std::sync::LazyLock;

/// Hash verified against when no applicant matches, so both sign-in failure
/// paths pay for one Argon2 run.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("coop-membership-dummy-password").ok());

pub fn hash_password(plain: &str) -> Result<String, CoopError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(plain.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch; `Err` only when `stored_hash` is not a PHC string.
pub fn verify_password(plain: &str, stored_hash: &str) -> Result<bool, CoopError> {
    let parsed = PasswordHash::new(stored_hash)?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Build the dummy hash now so the first unknown-email sign-in is not slower
/// than the rest. Returns whether the hash is available.
pub fn prime_dummy_hash() -> bool {
    LazyLock::force(&DUMMY_HASH).is_some()
}

/// Burn one verification against the dummy hash. Always reports failure.
pub fn verify_dummy(plain: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(plain, hash);
    }
    false
}

/// `hash_password` on the blocking pool.
pub async fn hash_password_blocking(plain: String) -> Result<String, CoopError> {
    tokio::task::spawn_blocking(move || hash_password(&plain)).await?
}

/// `verify_password` on the blocking pool; a `None` hash runs `verify_dummy`.
pub async fn verify_password_blocking(
    plain: String,
    stored_hash: Option<String>,
) -> Result<bool, CoopError> {
    tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => verify_password(&plain, &hash),
        None => Ok(verify_dummy(&plain)),
    })
    .await?
}
