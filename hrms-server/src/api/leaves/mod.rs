//! 请假 API

pub mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::APPROVER_ROLES;
use crate::auth::require_role;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/leaves", base_routes().merge(approval_routes()))
}

fn base_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/{id}", get(handler::get_one).delete(handler::remove))
}

fn approval_routes() -> Router<ServerState> {
    Router::new()
        .route("/{id}/approve", post(handler::approve))
        .route("/{id}/reject", post(handler::reject))
        .route_layer(middleware::from_fn(require_role(APPROVER_ROLES)))
}
