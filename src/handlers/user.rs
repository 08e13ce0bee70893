//! 用户资料的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext, error::AppError, middleware::AppState, models::UserResponse,
};
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

/// 获取当前用户资料
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth_service.profile(auth_context.user_id).await?;

    Ok(Json(UserResponse::from(user)))
}
