use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware для логирования HTTP запросов
///
/// Пишет в лог:
/// - request id (берётся из заголовка `x-request-id` или генерируется)
/// - метод и путь
/// - статус код
/// - длительность (ms)
pub async fn request_logger(mut req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        req.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let mut response = next.run(req).await;

    let status = response.status();
    let duration = start.elapsed();
    if status.is_server_error() {
        tracing::error!(
            request_id = %request_id,
            "{} {} -> {} ({} ms)",
            method,
            path,
            status.as_u16(),
            duration.as_millis()
        );
    } else if status.is_client_error() {
        tracing::warn!(
            request_id = %request_id,
            "{} {} -> {} ({} ms)",
            method,
            path,
            status.as_u16(),
            duration.as_millis()
        );
    } else {
        tracing::info!(
            request_id = %request_id,
            "{} {} -> {} ({} ms)",
            method,
            path,
            status.as_u16(),
            duration.as_millis()
        );
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
