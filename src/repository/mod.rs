//! Storage collaborator layer
//!
//! The core talks to storage only through [`UserRepository`] and
//! [`SessionRepository`]. PostgreSQL and in-memory implementations live here.

pub mod memory;
pub mod session_repo;
pub mod user_repo;

pub use memory::MemoryStore;
pub use session_repo::PgSessionRepository;
pub use user_repo::PgUserRepository;

use crate::models::{LicenseKey, NewAccount, RevokeOutcome, RoleCode, Secret, SessionRecord, User};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Storage errors. Always retryable by the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("conflict: {0}")]
    Conflict(String),

    /// Backing store unavailable or failed
    #[error("backend failure: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

/// Outcome of an account write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountWrite {
    Created,
    EmailTaken,
    /// The license key was consumed by someone else first
    LicenseUnavailable,
}

/// Users, secrets and registration reference data
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Write user, secret and (optionally) license consumption atomically
    async fn create_account(&self, account: &NewAccount) -> Result<AccountWrite, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_secret_by_user_id(&self, user_id: Uuid) -> Result<Option<Secret>, StoreError>;

    async fn list_role_codes(&self) -> Result<Vec<RoleCode>, StoreError>;

    async fn list_license_keys(&self) -> Result<Vec<LicenseKey>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Session records
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert_session(&self, record: &SessionRecord) -> Result<(), StoreError>;

    /// Conditional `Active -> Revoked` transition gated on both ids
    async fn revoke_session(&self, token_id: Uuid, user_id: Uuid) -> Result<RevokeOutcome, StoreError>;

    async fn find_session(&self, token_id: Uuid) -> Result<Option<SessionRecord>, StoreError>;
}
