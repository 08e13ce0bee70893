//! 认证相关的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext, error::AppError, handlers::extract::ApiJson,
    middleware::AppState, models::auth::*,
};
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

/// 会员注册
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SignUpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth_service.register_member(req).await?;

    Ok(Json(json!({
        "message": "SignUp successful, Please Login",
        "userid": user.user_id,
    })))
}

/// 管理员注册
pub async fn admin_sign_up(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<AdminSignUpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth_service.register_admin(req).await?;

    Ok(Json(json!({
        "message": "SignUp successful, Please Login to setup your Organization",
        "userid": user.user_id,
    })))
}

/// 登录
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SignInRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state.auth_service.authenticate(req).await?;

    Ok(Json(response))
}

/// 登出
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth_service
        .revoke_session(auth_context.token_id, auth_context.user_id)
        .await?;

    Ok(Json(json!({"message": "SignOut successful"})))
}

/// 校验令牌并返回其中的身份信息
pub async fn verify(auth_context: AuthContext) -> Result<impl IntoResponse, AppError> {
    Ok(Json(json!({
        "userid": auth_context.user_id,
        "token_id": auth_context.token_id,
        "role": auth_context.role,
    })))
}
