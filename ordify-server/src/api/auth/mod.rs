//! Auth API 模块
//!
//! 注册、登录、令牌刷新和账号激活。所有路由公开；刷新/登出依赖
//! HTTP-only 的 `refreshToken` cookie 而非 Authorization 头。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/logout", get(handler::logout))
        .route("/refresh", get(handler::refresh))
        .route("/activate/{link}", get(handler::activate))
}
