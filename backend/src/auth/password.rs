//! Password hashing using argon2
//!
//! Argon2id with a random salt per hash. Hashing and verification are
//! CPU-bound; the async variants run them on the blocking thread pool.

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use peso_shared::Credential;

/// Password hashing service
pub struct PasswordService;

impl PasswordService {
    /// Hash a password into a stored credential (blocking)
    pub fn hash(password: &str) -> Result<Credential> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

        Credential::from_hash(hash.to_string())
            .ok_or_else(|| anyhow::anyhow!("Password hash came back empty"))
    }

    pub async fn hash_async(password: String) -> Result<Credential> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Check a password against a credential (blocking).
    ///
    /// The comparison inside argon2 runs in constant time.
    pub fn verify(password: &str, credential: &Credential) -> Result<bool> {
        let parsed_hash = PasswordHash::new(credential.hash())
            .map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub async fn verify_async(password: String, credential: Credential) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &credential))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }
}
