//! User API 模块

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_auth;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/users", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    // 仅后台员工可见
    Router::new()
        .route("/", get(handler::list))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
