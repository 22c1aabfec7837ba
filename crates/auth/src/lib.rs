//! Password hashing.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`)
//! with a fresh random salt each time. The `_async` variants run the same work
//! on tokio's blocking pool so request handlers never stall the runtime.

use argon2::{
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
    Argon2, PasswordHasher,
};
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("hash error")]
    Hash,
    #[error("malformed password hash")]
    Malformed,
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// Tuned Argon2id parameters (balanced for security vs. latency; adjust after load tests)
const ARGON2_M_COST: u32 = 19456; // ~19 MB
const ARGON2_T_COST: u32 = 2; // iterations
const ARGON2_P_COST: u32 = 1; // parallelism

fn argon2_instance() -> Result<Argon2<'static>, AuthError> {
    let params = argon2::Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, None).map_err(|_| AuthError::Hash)?;
    Ok(Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params))
}

pub fn hash_password(raw: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2_instance()?
        .hash_password(raw.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| AuthError::Hash)
}

/// `Ok(false)` for a wrong password; `Err` only when `hash` is not a PHC string.
pub fn verify_password(raw: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::Malformed)?;
    Ok(Argon2::default().verify_password(raw.as_bytes(), &parsed).is_ok())
}

/// True when `hash` was produced with another algorithm or other cost parameters.
pub fn needs_rehash(hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::Malformed)?;
    let alg_ok = parsed.algorithm.as_str() == argon2::Algorithm::Argon2id.as_ref();
    let param = |name: &str| parsed.params.get_decimal(name).unwrap_or(0);
    Ok(!alg_ok || param("m") != ARGON2_M_COST || param("t") != ARGON2_T_COST || param("p") != ARGON2_P_COST)
}

pub async fn hash_password_async(raw: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&raw)).await?
}

pub async fn verify_password_async(raw: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&raw, &hash)).await?
}
