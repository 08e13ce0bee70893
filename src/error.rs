//! 统一错误模型
//! 定义所有错误类型和错误响应格式

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    auth::{jwt::TokenError, password::PasswordError, role::RoleError},
    repository::StoreError,
    services::session_store::SessionError,
};

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid role code")]
    InvalidRoleCode,

    #[error("Invalid license key")]
    InvalidLicenseKey,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Token invalid")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token malformed")]
    TokenMalformed,

    #[error("Session revoked")]
    SessionRevoked,

    #[error("Session not found")]
    SessionNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Session already revoked")]
    AlreadyRevoked,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Stored credential record is invalid")]
    InvalidCredentialRecord,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidRoleCode | AppError::InvalidLicenseKey => {
                StatusCode::BAD_REQUEST
            }
            AppError::EmailTaken | AppError::AlreadyRevoked => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::MissingToken
            | AppError::TokenInvalid
            | AppError::TokenExpired
            | AppError::TokenMalformed
            | AppError::SessionRevoked => StatusCode::UNAUTHORIZED,
            AppError::SessionNotFound | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Hashing(_)
            | AppError::Signing(_)
            | AppError::InvalidCredentialRecord
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 稳定的机器可读错误类型
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::InvalidRoleCode => "invalid_role_code",
            AppError::InvalidLicenseKey => "invalid_license_key",
            AppError::EmailTaken => "email_taken",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::MissingToken => "missing_token",
            AppError::TokenInvalid => "token_invalid",
            AppError::TokenExpired => "token_expired",
            AppError::TokenMalformed => "token_malformed",
            AppError::SessionRevoked => "session_revoked",
            AppError::SessionNotFound => "session_not_found",
            AppError::UserNotFound => "user_not_found",
            AppError::AlreadyRevoked => "already_revoked",
            AppError::Storage(_) => "storage_error",
            AppError::Hashing(_) => "hashing_error",
            AppError::Signing(_) => "signing_error",
            AppError::InvalidCredentialRecord => "invalid_credential_record",
            AppError::Config(_) => "config_error",
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::InvalidRoleCode => "Invalid role code".to_string(),
            AppError::InvalidLicenseKey => "Invalid license key".to_string(),
            AppError::EmailTaken => "Email is already registered".to_string(),
            AppError::InvalidCredentials => "Invalid email or password".to_string(),
            AppError::MissingToken => "Authorization header not found".to_string(),
            AppError::TokenInvalid
            | AppError::TokenMalformed
            | AppError::SessionRevoked => "Unauthorized".to_string(),
            AppError::TokenExpired => "Token expired".to_string(),
            AppError::SessionNotFound => "Session not found".to_string(),
            AppError::UserNotFound => "User not found".to_string(),
            AppError::AlreadyRevoked => "Session already revoked".to_string(),
            AppError::Storage(_) => "Storage temporarily unavailable".to_string(),
            AppError::Hashing(_)
            | AppError::Signing(_)
            | AppError::InvalidCredentialRecord
            | AppError::Config(_) => "Internal server error".to_string(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }

    // 便捷方法
    pub fn validation(msg: &str) -> Self {
        AppError::Validation(msg.to_string())
    }
}

/// 错误响应 DTO
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub kind: &'static str,
    pub code: u16,
    pub message: String,
    pub request_id: String,
    /// 仅开发模式下填充
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// 附加在错误响应扩展上的内部错误信息，供开发模式中间件使用
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub body: ErrorResponse,
    pub internal: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // 经过路由时由错误报告中间件替换为本次请求的 request_id
        let request_id = uuid::Uuid::new_v4().to_string();

        let error_response = ErrorResponse {
            error: ErrorDetail {
                kind: self.kind(),
                code: self.code(),
                message: self.user_message(),
                request_id,
                detail: None,
            },
        };

        // 记录错误日志：服务端错误用 error，客户端错误用 warn
        if status.is_server_error() {
            tracing::error!(
                kind = self.kind(),
                code = self.code(),
                message = %self,
                "Application error"
            );
        } else {
            tracing::warn!(
                kind = self.kind(),
                code = self.code(),
                "Request rejected"
            );
        }

        let report = ErrorReport {
            body: error_response.clone(),
            internal: self.to_string(),
        };

        let mut response = (status, Json(error_response)).into_response();
        response.extensions_mut().insert(report);
        response
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<PasswordError> for AppError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::Hashing(msg) => AppError::Hashing(msg),
            PasswordError::InvalidCredentialRecord => AppError::InvalidCredentialRecord,
        }
    }
}

impl From<RoleError> for AppError {
    fn from(e: RoleError) -> Self {
        match e {
            RoleError::InvalidRoleCode => AppError::InvalidRoleCode,
            RoleError::InvalidLicenseKey => AppError::InvalidLicenseKey,
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Invalid => AppError::TokenInvalid,
            TokenError::Expired => AppError::TokenExpired,
            TokenError::Malformed => AppError::TokenMalformed,
            TokenError::Signing(msg) => AppError::Signing(msg),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound => AppError::SessionNotFound,
            SessionError::AlreadyRevoked => AppError::AlreadyRevoked,
            SessionError::Storage(inner) => AppError::Storage(inner),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}
