//! 认证 API
//!
//! 登录颁发短期访问令牌 (JWT) 和长期刷新令牌；刷新令牌只存在
//! HttpOnly Cookie 中，数据库只保存其 SHA-256 哈希。

pub mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/login", post(handler::login))
        .route("/refresh", post(handler::refresh))
        .route("/logout", post(handler::logout))
        .route("/me", get(handler::me))
        .route("/forgot-password", post(handler::forgot_password))
        .route("/reset-password", post(handler::reset_password))
}
