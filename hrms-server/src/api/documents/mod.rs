//! 员工证件 API
//!
//! 上传走 multipart，文件落在 `work_dir/uploads/`，库里只存元数据。
//! HR 专属路由 (按员工查询、审核) 独立成组拦截。

pub mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::HR_ROLES;
use crate::auth::require_role;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/documents", base_routes().merge(hr_routes()))
}

fn base_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::upload).get(handler::list_own))
        .route("/{id}", get(handler::get_one).delete(handler::remove))
        .route("/{id}/download", get(handler::download))
}

fn hr_routes() -> Router<ServerState> {
    Router::new()
        .route("/employee/{employee_id}", get(handler::list_for_employee))
        .route("/{id}/approve", post(handler::approve))
        .route("/{id}/reject", post(handler::reject))
        .route_layer(middleware::from_fn(require_role(HR_ROLES)))
}
