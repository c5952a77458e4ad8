//! Statistics API 模块 (数据统计)

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_auth;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/statistics", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    // 报表查看：需要登录
    Router::new()
        .route("/main", get(handler::main_statistics))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
