//! Order API 模块
//!
//! 三种公开下单方式：
//! - `POST /{customerId}/{productId}` 普通下单
//! - `POST /agreement/{customerId}/{productId}` 下单同时签订协议
//! - `POST /token/{token}/{productId}` 凭客户端令牌下单
//!
//! 状态/支付字段的修改和删除是后台操作。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::require_auth;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/orders", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    // 公开路由：读取 + 三种下单方式 (结账流程无需登录)
    // 同一位置的路由参数必须同名，下单路径里的 {id} 是客户 id
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/{product_id}", post(handler::create))
        .route(
            "/agreement/{customer_id}/{product_id}",
            post(handler::create_with_agreement),
        )
        .route("/token/{token}/{product_id}", post(handler::create_by_token));

    // 管理路由：需要登录
    let manage_routes = Router::new()
        .route("/{id}", patch(handler::update).delete(handler::delete))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    read_routes.merge(manage_routes)
}
