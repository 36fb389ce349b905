//! 日工时 / 周工时 API
//!
//! 审批类路由独立成组并用 `require_role(APPROVER_ROLES)` 拦截，
//! 与提交/查询路由的路径互不重叠。

pub mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::APPROVER_ROLES;
use crate::auth::require_role;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/timesheets", base_routes().merge(approval_routes()))
}

fn base_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/weekly", get(handler::list_weekly))
        .route("/weekly/{id}", get(handler::get_weekly))
        .route(
            "/{id}",
            get(handler::get_one)
                .put(handler::update)
                .delete(handler::remove),
        )
}

fn approval_routes() -> Router<ServerState> {
    Router::new()
        .route("/{id}/approve", post(handler::approve))
        .route("/{id}/reject", post(handler::reject))
        .route("/bulk-approval", post(handler::bulk_approval))
        .route("/weekly/{id}/approve", post(handler::approve_weekly))
        .route("/weekly/{id}/reject", post(handler::reject_weekly))
        .route("/weekly/sync", post(handler::sync_weekly))
        .route_layer(middleware::from_fn(require_role(APPROVER_ROLES)))
}
