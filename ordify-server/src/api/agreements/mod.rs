//! Agreement API 模块
//!
//! 协议把客户和一个可复用的下单令牌绑定在一起，带有效期；
//! 每个客户同一时刻最多一份生效协议。令牌只在签订时返回一次。

mod handler;

pub(crate) use handler::issue_agreement;

use axum::{
    Router, middleware,
    routing::{get, patch, put},
};

use crate::auth::require_auth;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/agreements", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    // 公开路由：读取、校验令牌、签订协议 (结账流程无需登录)
    // POST /{id} 里的 {id} 是客户 id (同一位置的路由参数必须同名)
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id).post(handler::create))
        .route("/customer/{customer_id}", get(handler::get_active_by_customer))
        .route("/token/{token}", get(handler::get_by_token))
        .route("/validate/{token}", get(handler::validate));

    // 管理路由：需要登录
    let manage_routes = Router::new()
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/deactivate", patch(handler::deactivate))
        .route("/{id}/renew", patch(handler::renew))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    read_routes.merge(manage_routes)
}
