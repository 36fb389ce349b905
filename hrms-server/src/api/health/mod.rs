//! 健康检查接口

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use shared::util::now_rfc3339;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

/// GET /api/health - 服务健康状态
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: now_rfc3339(),
    })
}
