//! HTTP 服务器组装与启动
//!
//! `build_router` 负责把各资源路由、认证中间件和 tower 层叠起来，
//! 集成测试直接复用它；`Server::run` 在其上加监听和优雅退出。

use std::net::Ipv4Addr;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::auth::require_auth;
use crate::core::{Config, ServerState};
use crate::utils::{AppError, AppResult};

/// 访问日志，每个请求一条，target 固定为 `http_access`
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        target: "http_access",
        "{} {} {} ({}ms)",
        method,
        uri,
        response.status(),
        started.elapsed().as_millis()
    );
    response
}

/// 组装完整路由
///
/// 层次从内到外：业务路由 → 认证中间件 → CORS/压缩/请求体上限 → 访问日志。
/// `require_auth` 挂在整个路由上，公共路径在中间件内部放行。
pub fn build_router(state: ServerState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    let api = Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::auth::router())
        .merge(crate::api::users::router())
        .merge(crate::api::employees::router())
        .merge(crate::api::timesheets::router())
        .merge(crate::api::leaves::router())
        .merge(crate::api::documents::router())
        .merge(crate::api::customers::router())
        .merge(crate::api::projects::router())
        .merge(crate::api::allocations::router());

    api.layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_request))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}

/// HTTP 服务器
pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    /// 用已初始化的状态建服务器，状态同时供后台任务和测试使用
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    /// 绑定端口、启动后台任务并一直服务到收到退出信号
    pub async fn run(&self) -> AppResult<()> {
        let tasks = self.state.start_background_tasks();
        let app = build_router(self.state.clone());

        let listener = tokio::net::TcpListener::bind((Ipv4Addr::UNSPECIFIED, self.config.http_port))
            .await
            .map_err(|e| {
                AppError::internal(format!("Failed to bind port {}: {e}", self.config.http_port))
            })?;
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(%addr, "HRMS server listening");
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

        tasks.shutdown().await;
        Ok(())
    }
}
