//! HTTP 中间件
//! 应用状态、请求追踪、开发模式错误详情

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::TokenService,
    config::AppConfig,
    error::{AppError, ErrorReport},
    repository::{SessionRepository, UserRepository},
    services::{AuthService, SessionRecordStore},
};

/// 应用状态
///
/// 所有组件在启动时构建一次，之后只读共享
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepository>,
    pub token_service: Arc<TokenService>,
    pub session_store: Arc<SessionRecordStore>,
    pub auth_service: Arc<AuthService>,
    pub started_at: Instant,
}

impl AppState {
    /// 根据配置与存储实现组装全部组件
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
    ) -> Result<Self, AppError> {
        let config = Arc::new(config);
        let token_service = Arc::new(TokenService::from_config(&config)?);
        let session_store = Arc::new(SessionRecordStore::new(sessions));
        let auth_service = Arc::new(AuthService::new(
            users.clone(),
            session_store.clone(),
            token_service.clone(),
            config.clone(),
        )?);

        Ok(Self {
            config,
            users,
            token_service,
            session_store,
            auth_service,
            started_at: Instant::now(),
        })
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(mut req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    req.extensions_mut().insert(RequestId(request_id.clone()));

    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        metrics::counter!(
            "http_requests_total",
            "method" => method.clone(),
            "status" => status.to_string()
        )
        .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            path = %path,
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        // 在响应头中添加 trace_id
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 当前请求的 request_id（由请求追踪中间件写入请求扩展）
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// 重写错误响应体：request_id 与 x-request-id 响应头一致，开发模式下附带内部错误信息
pub async fn error_report_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let request_id = req.extensions().get::<RequestId>().cloned();

    let response = next.run(req).await;

    let Some(report) = response.extensions().get::<ErrorReport>().cloned() else {
        return response;
    };

    let mut body = report.body;
    if let Some(RequestId(id)) = request_id {
        body.error.request_id = id;
    }
    if state.config.server.dev_mode {
        body.error.detail = Some(report.internal);
    }

    (response.status(), Json(body)).into_response()
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_or_generate_trace_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-trace-id", "test-trace-123".parse().unwrap());

        let trace_id = extract_or_generate_trace_id(&headers);
        assert_eq!(trace_id, "test-trace-123");

        let headers = HeaderMap::new();
        let trace_id = extract_or_generate_trace_id(&headers);
        assert!(!trace_id.is_empty());
        assert_ne!(trace_id, "test-trace-123");
    }
}
