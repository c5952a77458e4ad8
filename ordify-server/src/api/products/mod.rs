//! Product API 模块
//!
//! 商品目录和每个商品的配送方式列表。库存数量只能在这里直接设置；
//! 下单扣减走订单事务。

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::require_auth;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/products", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    // 读取路由：公开
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    // 管理路由：需要登录
    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/delivery-options", post(handler::add_delivery_option))
        .route(
            "/{id}/delivery-options/{type}",
            delete(handler::remove_delivery_options),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    read_routes.merge(manage_routes)
}
