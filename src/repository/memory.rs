//! In-memory store implementing both repository traits.
//!
//! All writes for one operation happen under a single write lock, so an
//! account write is as atomic here as the PostgreSQL transaction is.

use super::{AccountWrite, SessionRepository, StoreError, UserRepository};
use crate::models::{
    LicenseKey, NewAccount, RevokeOutcome, RoleCode, Secret, SessionRecord, SessionStatus, User,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    emails: HashMap<String, Uuid>,
    secrets: HashMap<Uuid, Secret>,
    role_codes: Vec<RoleCode>,
    license_keys: Vec<LicenseKey>,
    sessions: HashMap<Uuid, SessionRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the reference tables
    pub fn with_reference_data(role_codes: Vec<RoleCode>, license_keys: Vec<LicenseKey>) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                role_codes,
                license_keys,
                ..Default::default()
            }),
        }
    }

    /// Insert a user without a credential record (legacy / partially migrated rows)
    pub async fn insert_user_without_secret(&self, user: User) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.emails.contains_key(&user.email) {
            return Err(StoreError::Conflict(format!("email {} exists", user.email)));
        }
        state.emails.insert(user.email.clone(), user.user_id);
        state.users.insert(user.user_id, user);
        Ok(())
    }

    /// Overwrite a stored credential digest
    pub async fn replace_secret(&self, secret: Secret) {
        self.state.write().await.secrets.insert(secret.user_id, secret);
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_account(&self, account: &NewAccount) -> Result<AccountWrite, StoreError> {
        let mut state = self.state.write().await;

        if state.emails.contains_key(&account.user.email) {
            return Ok(AccountWrite::EmailTaken);
        }

        if state.users.contains_key(&account.user.user_id) {
            return Err(StoreError::Conflict(format!(
                "user id {} exists",
                account.user.user_id
            )));
        }

        if let Some(key) = &account.consume_license_key {
            let license = state
                .license_keys
                .iter_mut()
                .find(|l| &l.license_key == key && l.is_outstanding());

            match license {
                Some(license) => license.consumed_at = Some(Utc::now()),
                None => return Ok(AccountWrite::LicenseUnavailable),
            }
        }

        state
            .emails
            .insert(account.user.email.clone(), account.user.user_id);
        state.users.insert(account.user.user_id, account.user.clone());
        state
            .secrets
            .insert(account.secret.user_id, account.secret.clone());

        Ok(AccountWrite::Created)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .emails
            .get(email)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn find_secret_by_user_id(&self, user_id: Uuid) -> Result<Option<Secret>, StoreError> {
        Ok(self.state.read().await.secrets.get(&user_id).cloned())
    }

    async fn list_role_codes(&self) -> Result<Vec<RoleCode>, StoreError> {
        Ok(self.state.read().await.role_codes.clone())
    }

    async fn list_license_keys(&self) -> Result<Vec<LicenseKey>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .license_keys
            .iter()
            .filter(|l| l.is_outstanding())
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn insert_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.sessions.contains_key(&record.token_id) {
            return Err(StoreError::Conflict(format!(
                "token id {} exists",
                record.token_id
            )));
        }
        state.sessions.insert(record.token_id, record.clone());
        Ok(())
    }

    async fn revoke_session(&self, token_id: Uuid, user_id: Uuid) -> Result<RevokeOutcome, StoreError> {
        let mut state = self.state.write().await;

        let Some(record) = state
            .sessions
            .get_mut(&token_id)
            .filter(|r| r.user_id == user_id)
        else {
            return Ok(RevokeOutcome::NotFound);
        };

        Ok(match record.status {
            SessionStatus::Active => {
                record.status = SessionStatus::Revoked;
                RevokeOutcome::Revoked
            }
            SessionStatus::Revoked => RevokeOutcome::AlreadyRevoked,
        })
    }

    async fn find_session(&self, token_id: Uuid) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.state.read().await.sessions.get(&token_id).cloned())
    }
}
