//! 资源派单 API

pub mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/allocations", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/by-employee/{employee_id}", get(handler::list_by_employee))
        .route("/by-project/{project_id}", get(handler::list_by_project))
        .route(
            "/{id}",
            get(handler::get_one)
                .put(handler::update)
                .delete(handler::remove),
        )
}
