//! 用户账号管理 API (仅管理员)

pub mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::permissions::ADMIN_ROLES;
use crate::auth::require_role;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_one)
                .put(handler::update)
                .delete(handler::remove),
        )
        .route_layer(middleware::from_fn(require_role(ADMIN_ROLES)))
}
