//! 会话记录存储：插入、撤销、活跃状态查询

use crate::{
    models::{RevokeOutcome, SessionRecord, SessionStatus},
    repository::{SessionRepository, StoreError},
};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// 会话存储错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,

    #[error("session already revoked")]
    AlreadyRevoked,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

pub struct SessionRecordStore {
    repo: Arc<dyn SessionRepository>,
}

impl SessionRecordStore {
    pub fn new(repo: Arc<dyn SessionRepository>) -> Self {
        Self { repo }
    }

    /// 存储新的 Active 会话记录
    pub async fn insert(&self, record: &SessionRecord) -> Result<(), SessionError> {
        debug_assert_eq!(record.status, SessionStatus::Active);
        self.repo.insert_session(record).await?;
        Ok(())
    }

    /// 撤销会话（token_id 与 user_id 必须同时匹配）
    pub async fn revoke(&self, token_id: Uuid, user_id: Uuid) -> Result<(), SessionError> {
        match self.repo.revoke_session(token_id, user_id).await? {
            RevokeOutcome::Revoked => Ok(()),
            RevokeOutcome::AlreadyRevoked => Err(SessionError::AlreadyRevoked),
            RevokeOutcome::NotFound => Err(SessionError::NotFound),
        }
    }

    /// 会话是否仍然有效：记录存在、未撤销、未过期
    pub async fn is_active(&self, token_id: Uuid) -> Result<bool, SessionError> {
        let record = self.repo.find_session(token_id).await?;

        Ok(record.is_some_and(|r| r.status == SessionStatus::Active && r.expires_at > Utc::now()))
    }
}
