//! Argon2id password hashing.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::{AuthError, AuthResult, MIN_PASSWORD_LENGTH};

/// Memory cost in KiB.
const MEMORY_COST_KIB: u32 = 19_456;
/// Number of passes.
const TIME_COST: u32 = 2;
/// Degree of parallelism.
const PARALLELISM: u32 = 1;

/// Hashes and verifies passwords with fixed Argon2id parameters.
///
/// Hashing is CPU-bound, so the async methods run it on the blocking pool.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Creates a hasher with the default cost parameters.
    pub fn new() -> AuthResult<Self> {
        let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
            .map_err(|e| AuthError::Configuration(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a password into a PHC string. Blocks the calling thread.
    pub fn hash_blocking(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>())?;
        let hash = self.argon2().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// Checks a password against a PHC string. Blocks the calling thread.
    ///
    /// A malformed stored hash counts as a mismatch.
    pub fn verify_blocking(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash could not be parsed");
                false
            }
        }
    }

    /// Hashes a password on the blocking pool.
    pub async fn hash(&self, password: &str) -> AuthResult<String> {
        let hasher = self.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash_blocking(&password))
            .await
            .map_err(|e| AuthError::Other(format!("Hashing task failed: {e}")))?
    }

    /// Verifies a password on the blocking pool.
    pub async fn verify(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let hasher = self.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify_blocking(&password, &hash))
            .await
            .map_err(|e| AuthError::Other(format!("Verification task failed: {e}")))
    }
}

/// Rejects passwords shorter than [`MIN_PASSWORD_LENGTH`] characters.
pub fn check_password_policy(password: &str) -> AuthResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword {
            min_length: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}
