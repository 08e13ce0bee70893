//! Password hashing and verification using Argon2id

use crate::config::SecurityConfig;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Salt generation or hashing failed
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Stored digest could not be parsed
    #[error("stored password digest is malformed")]
    InvalidCredentialRecord,
}

/// Password hasher with configurable parameters
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create hasher with default parameters (OWASP recommended)
    pub fn new() -> Self {
        // m=64MiB, t=3 iterations, p=4 lanes
        Self::with_params(65536, 3, 4).unwrap_or_else(|_| Self {
            argon2: Argon2::default(),
        })
    }

    /// Create hasher with explicit Argon2id cost parameters
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::Hashing(format!("invalid Argon2 params: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Create hasher from the security section of the config
    pub fn from_config(config: &SecurityConfig) -> Result<Self, PasswordError> {
        Self::with_params(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
        )
    }

    /// Hash a password
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                PasswordError::Hashing(e.to_string())
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored digest.
    ///
    /// Returns `Ok(false)` on mismatch. The digest comparison is constant-time;
    /// the cost parameters embedded in the digest are honoured, not ours.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            tracing::error!("Failed to parse stored password hash: {:?}", e);
            PasswordError::InvalidCredentialRecord
        })?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => {
                tracing::error!("Stored password hash rejected by verifier: {:?}", e);
                Err(PasswordError::InvalidCredentialRecord)
            }
        }
    }

    /// Validate password length against policy
    pub fn validate_password_policy(password: &str, config: &SecurityConfig) -> Result<(), String> {
        let length = password.chars().count();

        if length < config.password_min_length {
            return Err(format!(
                "Password must be at least {} characters",
                config.password_min_length
            ));
        }

        if length > config.password_max_length {
            return Err(format!(
                "Password must be at most {} characters",
                config.password_max_length
            ));
        }

        Ok(())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
