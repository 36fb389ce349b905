//! 项目 API

pub mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/projects", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/by-customer/{customer_id}", get(handler::list_by_customer))
        .route(
            "/{id}",
            get(handler::get_one)
                .put(handler::update)
                .delete(handler::remove),
        )
}
