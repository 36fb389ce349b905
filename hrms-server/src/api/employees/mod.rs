//! 员工档案 API
//!
//! 读写权限不同但共享路径，授权在处理函数内检查。

pub mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/employees", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/my-team", get(handler::my_team))
        .route(
            "/{id}",
            get(handler::get_one)
                .put(handler::update)
                .delete(handler::remove),
        )
}
