//! Bearer token authentication middleware

use crate::{error::AppError, middleware::AppState};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

/// 认证上下文（附加到请求扩展）
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub token_id: Uuid,
    pub role: String,
}

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::MissingToken)
    }
}

/// 从 Authorization 头提取令牌
pub fn extract_token(headers: &HeaderMap) -> Result<String, AppError> {
    let value = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::MissingToken)?;

    value
        .strip_prefix("Bearer ")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(AppError::TokenMalformed)
}

/// 认证中间件：校验签名与有效期，并确认会话记录仍处于 Active 状态
pub async fn session_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers())?;

    let claims = state.token_service.parse(&token)?;

    if !state.session_store.is_active(claims.token_id).await? {
        tracing::warn!(
            user_id = %claims.sub,
            token_id = %claims.token_id,
            "Rejected token for inactive session"
        );
        return Err(AppError::SessionRevoked);
    }

    let auth_context = AuthContext {
        user_id: claims.sub,
        token_id: claims.token_id,
        role: claims.role,
    };

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
