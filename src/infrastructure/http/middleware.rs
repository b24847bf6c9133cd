//! HTTP Middleware
//!
//! 记录非 2xx/3xx 的 HTTP 状态（如超过上传上限的 413）以及耗时。
//! 业务错误以 HTTP 200 + errno 返回，在 ApiError::into_response() 中记录。

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// 状态码对应的日志级别，成功响应不记录
fn log_level(status: StatusCode) -> Option<tracing::Level> {
    if status.is_server_error() {
        Some(tracing::Level::ERROR)
    } else if status.is_client_error() {
        Some(tracing::Level::WARN)
    } else {
        None
    }
}

/// HTTP 状态码错误日志中间件
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let content_length = request
        .headers()
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let Some(level) = log_level(status) else {
        return response;
    };

    if level == tracing::Level::ERROR {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP server error"
        );
    } else {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            content_length,
            elapsed_ms,
            "HTTP client error"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, Bytes},
        extract::DefaultBodyLimit,
        http::Request as HttpRequest,
        routing::{get, post},
        Router,
    };
    use tower::util::ServiceExt;

    fn router() -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .route("/broken", get(|| async { StatusCode::BAD_GATEWAY }))
            .route("/upload", post(|body: Bytes| async move { body.len().to_string() }))
            .layer(DefaultBodyLimit::max(16))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    async fn status_of(request: HttpRequest<Body>) -> StatusCode {
        router().oneshot(request).await.unwrap().status()
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(StatusCode::OK), None);
        assert_eq!(log_level(StatusCode::FOUND), None);
        assert_eq!(log_level(StatusCode::PAYLOAD_TOO_LARGE), Some(tracing::Level::WARN));
        assert_eq!(log_level(StatusCode::BAD_GATEWAY), Some(tracing::Level::ERROR));
    }

    #[tokio::test]
    async fn test_responses_pass_through_unchanged() {
        let ok = HttpRequest::get("/ping").body(Body::empty()).unwrap();
        assert_eq!(status_of(ok).await, StatusCode::OK);

        let broken = HttpRequest::get("/broken").body(Body::empty()).unwrap();
        assert_eq!(status_of(broken).await, StatusCode::BAD_GATEWAY);

        let unknown = HttpRequest::get("/nowhere").body(Body::empty()).unwrap();
        assert_eq!(status_of(unknown).await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let small = HttpRequest::post("/upload").body(Body::from("tiny")).unwrap();
        assert_eq!(status_of(small).await, StatusCode::OK);

        let large = HttpRequest::post("/upload")
            .body(Body::from(vec![b'x'; 64]))
            .unwrap();
        assert_eq!(status_of(large).await, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
