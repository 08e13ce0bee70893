//! User repository (数据库访问层)

use super::{AccountWrite, StoreError, UserRepository};
use crate::models::{LicenseKey, NewAccount, RoleCode, Secret, User};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    /// 在同一事务中写入用户、凭据，并按需消耗许可证
    async fn create_account(&self, account: &NewAccount) -> Result<AccountWrite, StoreError> {
        let mut tx = self.db.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (user_id, email, display_name, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(account.user.user_id)
        .bind(&account.user.email)
        .bind(&account.user.display_name)
        .bind(account.user.role)
        .bind(account.user.created_at)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(AccountWrite::EmailTaken);
        }

        sqlx::query("INSERT INTO secrets (user_id, password_hash) VALUES ($1, $2)")
            .bind(account.secret.user_id)
            .bind(&account.secret.password_hash)
            .execute(&mut *tx)
            .await?;

        if let Some(license_key) = &account.consume_license_key {
            let consumed = sqlx::query(
                r#"
                UPDATE user_licenses
                SET consumed_at = NOW(), consumed_by = $2
                WHERE license_key = $1 AND consumed_at IS NULL
                "#,
            )
            .bind(license_key)
            .bind(account.user.user_id)
            .execute(&mut *tx)
            .await?;

            if consumed.rows_affected() == 0 {
                tx.rollback().await?;
                return Ok(AccountWrite::LicenseUnavailable);
            }
        }

        tx.commit().await?;

        Ok(AccountWrite::Created)
    }

    /// 根据邮箱查找用户
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, email, display_name, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// 根据 ID 查找用户
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, email, display_name, role, created_at FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn find_secret_by_user_id(&self, user_id: Uuid) -> Result<Option<Secret>, StoreError> {
        let secret = sqlx::query_as::<_, Secret>(
            "SELECT user_id, password_hash FROM secrets WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(secret)
    }

    async fn list_role_codes(&self) -> Result<Vec<RoleCode>, StoreError> {
        let codes = sqlx::query_as::<_, RoleCode>("SELECT code, role FROM role_codes")
            .fetch_all(&self.db)
            .await?;

        Ok(codes)
    }

    /// 仅返回未消耗的许可证
    async fn list_license_keys(&self) -> Result<Vec<LicenseKey>, StoreError> {
        let keys = sqlx::query_as::<_, LicenseKey>(
            "SELECT license_key, consumed_at FROM user_licenses WHERE consumed_at IS NULL",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(keys)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
