//! 헬스 체크 endpoint.
//!
//! 동기화 상태와 무관하게 항상 `200 OK`를 응답합니다 (liveness probe용).

use std::net::SocketAddr;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::Result;

/// 간단한 헬스 체크.
///
/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// 헬스 체크 라우터 생성.
///
/// 알 수 없는 경로도 동일하게 응답합니다.
pub fn health_router() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .fallback(health_check)
}

/// 헬스 체크 서버 실행 (종료 토큰이 취소될 때까지).
pub async fn serve_health(addr: SocketAddr, shutdown: CancellationToken) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "헬스 체크 서버 listening");

    axum::serve(listener, health_router().layer(TraceLayer::new_for_http()))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("헬스 체크 서버 종료됨");
    Ok(())
}
