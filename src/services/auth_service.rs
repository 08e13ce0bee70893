//! 认证服务：注册、登录、登出

use crate::{
    auth::{jwt::TOKEN_SCHEME, PasswordHasher, RoleResolver, TokenService},
    config::AppConfig,
    error::AppError,
    models::*,
    repository::{AccountWrite, UserRepository},
    services::session_store::SessionRecordStore,
};
use chrono::{Duration, TimeZone, Utc};
use rand::{distributions::Alphanumeric, Rng};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<SessionRecordStore>,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
    config: Arc<AppConfig>,
    /// 未知用户登录时用于等时校验的摘要
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<SessionRecordStore>,
        tokens: Arc<TokenService>,
        config: Arc<AppConfig>,
    ) -> Result<Self, AppError> {
        let hasher = PasswordHasher::from_config(&config.security)?;

        let filler: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let dummy_hash = hasher.hash(&filler)?;

        Ok(Self {
            users,
            sessions,
            tokens,
            hasher,
            config,
            dummy_hash,
        })
    }

    /// 会员注册：角色码必须存在于参考表中
    pub async fn register_member(&self, req: SignUpRequest) -> Result<User, AppError> {
        req.validate()?;
        self.check_password_policy(&req.password)?;

        let role_codes = self.users.list_role_codes().await?;
        let role = RoleResolver::resolve_member_role(&req.role_code, &role_codes).map_err(|e| {
            metrics::counter!("auth_register_total", "path" => "member", "outcome" => "invalid_role_code")
                .increment(1);
            tracing::warn!(email = %normalize_email(&req.email), "Member registration with unknown role code");
            e
        })?;

        let user = self
            .create_account(&req.email, &req.name, &req.password, role, None)
            .await?;

        metrics::counter!("auth_register_total", "path" => "member", "outcome" => "success").increment(1);
        tracing::info!(user_id = %user.user_id, role = %role, "Member registered");

        Ok(user)
    }

    /// 管理员注册：许可证必须未被使用，角色固定为 admin
    pub async fn register_admin(&self, req: AdminSignUpRequest) -> Result<User, AppError> {
        req.validate()?;
        self.check_password_policy(&req.password)?;

        let licenses = self.users.list_license_keys().await?;
        let role = RoleResolver::resolve_admin_eligibility(&req.license_key, &licenses).map_err(|e| {
            metrics::counter!("auth_register_total", "path" => "admin", "outcome" => "invalid_license_key")
                .increment(1);
            tracing::warn!(email = %normalize_email(&req.email), "Admin registration with unknown license key");
            e
        })?;

        let consume = self
            .config
            .security
            .consume_license_keys
            .then(|| req.license_key.clone());

        let user = self
            .create_account(&req.email, &req.name, &req.password, role, consume)
            .await?;

        metrics::counter!("auth_register_total", "path" => "admin", "outcome" => "success").increment(1);
        tracing::info!(user_id = %user.user_id, "Administrator registered");

        Ok(user)
    }

    /// 用户登录：任何失败都返回同一个 InvalidCredentials
    pub async fn authenticate(&self, req: SignInRequest) -> Result<SignInResponse, AppError> {
        req.validate()?;

        let email = normalize_email(&req.email);
        let user = self
            .users
            .find_user_by_email(&email)
            .await?
            .filter(|user| match req.name.as_deref() {
                Some(name) => user.display_name == name,
                None => true,
            });

        let secret = match &user {
            Some(user) => self.users.find_secret_by_user_id(user.user_id).await?,
            None => None,
        };

        // 用户或凭据缺失时仍对哑摘要做一次校验，避免响应时间泄露账户是否存在
        let digest = secret
            .as_ref()
            .map(|s| s.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());
        let password_ok = self.verify_password(&req.password, digest).await?;

        let user = match (user, secret, password_ok) {
            (Some(user), Some(_), true) => user,
            (user, secret, _) => {
                if user.is_some() && secret.is_none() {
                    tracing::error!(email = %email, "User has no credential record");
                }
                metrics::counter!("auth_login_total", "outcome" => "failure").increment(1);
                tracing::info!(email = %email, "Login failed");
                return Err(AppError::InvalidCredentials);
            }
        };

        let ttl_secs = self.config.security.session_ttl_secs;
        let issued = self
            .tokens
            .issue(user.user_id, user.role_name(), Duration::seconds(ttl_secs as i64))?;

        let record = SessionRecord {
            token_id: issued.claims.token_id,
            user_id: user.user_id,
            role: issued.claims.role.clone(),
            token_type: issued.claims.token_type.clone(),
            issued_at: timestamp(issued.claims.iat),
            expires_at: timestamp(issued.claims.exp),
            status: SessionStatus::Active,
        };

        // 会话记录写入成功之前，令牌不会离开本服务
        self.sessions.insert(&record).await?;

        metrics::counter!("auth_login_total", "outcome" => "success").increment(1);
        tracing::info!(
            user_id = %user.user_id,
            token_id = %record.token_id,
            "Login succeeded"
        );

        Ok(SignInResponse {
            refresh_token: issued.token,
            token_type: TOKEN_SCHEME.to_string(),
            lifetime: ttl_secs,
        })
    }

    /// 登出（撤销会话记录）
    pub async fn revoke_session(&self, token_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        self.sessions.revoke(token_id, user_id).await?;

        metrics::counter!("auth_signout_total").increment(1);
        tracing::info!(user_id = %user_id, token_id = %token_id, "Session revoked");

        Ok(())
    }

    /// 获取当前用户资料
    pub async fn profile(&self, user_id: Uuid) -> Result<User, AppError> {
        self.users
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| {
                // 有效会话却没有对应用户记录
                tracing::error!(user_id = %user_id, "Authenticated user has no user record");
                AppError::UserNotFound
            })
    }

    async fn create_account(
        &self,
        email: &str,
        name: &str,
        password: &str,
        role: Role,
        consume_license_key: Option<String>,
    ) -> Result<User, AppError> {
        let password_hash = self.hash_password(password).await?;

        let user = User {
            user_id: Uuid::new_v4(),
            email: normalize_email(email),
            display_name: name.trim().to_string(),
            role: Some(role),
            created_at: Utc::now(),
        };

        let account = NewAccount {
            secret: Secret {
                user_id: user.user_id,
                password_hash,
            },
            user,
            consume_license_key,
        };

        match self.users.create_account(&account).await? {
            AccountWrite::Created => Ok(account.user),
            AccountWrite::EmailTaken => {
                tracing::info!(email = %account.user.email, "Registration for existing email");
                Err(AppError::EmailTaken)
            }
            AccountWrite::LicenseUnavailable => {
                tracing::warn!(email = %account.user.email, "License key consumed concurrently");
                Err(AppError::InvalidLicenseKey)
            }
        }
    }

    fn check_password_policy(&self, password: &str) -> Result<(), AppError> {
        PasswordHasher::validate_password_policy(password, &self.config.security)
            .map_err(AppError::Validation)
    }

    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();

        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Hashing(e.to_string()))??;

        Ok(hash)
    }

    async fn verify_password(&self, password: &str, digest: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();

        let ok = tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| AppError::Hashing(e.to_string()))??;

        Ok(ok)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn timestamp(secs: i64) -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_else(Utc::now)
}
