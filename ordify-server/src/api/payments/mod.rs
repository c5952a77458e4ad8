//! Payment API 模块
//!
//! 模拟 Stripe 的结账接口，对外契约与 Stripe 测试模式一致
//! (intent id、clientSecret、以分为单位的金额、测试卡表)。
//! 全部公开，结账流程无需登录。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/create-intent", post(handler::create_intent))
        .route("/confirm", post(handler::confirm))
        .route("/pay-order", post(handler::pay_order))
        .route("/status/{order_id}", get(handler::status))
}
