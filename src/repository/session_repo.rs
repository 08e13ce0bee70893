//! Session record repository (会话记录数据访问)

use super::{SessionRepository, StoreError};
use crate::models::{RevokeOutcome, SessionRecord, SessionStatus};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgSessionRepository {
    db: PgPool,
}

impl PgSessionRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    /// 存储会话记录
    async fn insert_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO session_records (
                token_id, user_id, role, token_type, issued_at, expires_at, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.token_id)
        .bind(record.user_id)
        .bind(&record.role)
        .bind(&record.token_type)
        .bind(record.issued_at)
        .bind(record.expires_at)
        .bind(record.status)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// 撤销会话：只有 token_id 与 user_id 同时匹配且仍为 active 时才更新
    async fn revoke_session(&self, token_id: Uuid, user_id: Uuid) -> Result<RevokeOutcome, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE session_records
            SET status = $3, revoked_at = NOW()
            WHERE token_id = $1 AND user_id = $2 AND status = $4
            "#,
        )
        .bind(token_id)
        .bind(user_id)
        .bind(SessionStatus::Revoked)
        .bind(SessionStatus::Active)
        .execute(&self.db)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(RevokeOutcome::Revoked);
        }

        let existing: Option<SessionStatus> = sqlx::query_scalar(
            "SELECT status FROM session_records WHERE token_id = $1 AND user_id = $2",
        )
        .bind(token_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(match existing {
            Some(_) => RevokeOutcome::AlreadyRevoked,
            None => RevokeOutcome::NotFound,
        })
    }

    async fn find_session(&self, token_id: Uuid) -> Result<Option<SessionRecord>, StoreError> {
        let record = sqlx::query_as::<_, SessionRecord>(
            r#"
            SELECT token_id, user_id, role, token_type, issued_at, expires_at, status
            FROM session_records
            WHERE token_id = $1
            "#,
        )
        .bind(token_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(record)
    }
}
