//! 路由组装
//!
//! 把各资源的子路由合并成一个应用，并套上 tower-http 中间件。
//! 权限控制在各资源模块内部完成（管理路由挂 require_auth）。

use axum::Router;
use http::{HeaderName, HeaderValue, Method, header};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::api;
use crate::core::ServerState;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).unwrap()))
    }
}

/// Build a router with all routes registered (no middleware)
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        // Health - public route
        .merge(api::health::router())
        // Auth API - register/login/refresh/activate
        .merge(api::auth::router())
        // Staff-only user list
        .merge(api::users::router(state))
        // Catalog and back-office resources
        .merge(api::customers::router(state))
        .merge(api::products::router(state))
        .merge(api::orders::router(state))
        .merge(api::agreements::router(state))
        // Mocked checkout
        .merge(api::payments::router())
        .merge(api::statistics::router(state))
}

/// Build the fully configured application with middleware and state
pub fn build_app(state: ServerState) -> Router {
    let cors = build_cors(&state);

    build_router(&state)
        // ========== Tower HTTP Middleware ==========
        // CORS - 凭证模式 (cookie) 下必须回显具体的前端源
        .layer(cors)
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // Request ID - Generate unique ID for each request
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        .with_state(state)
}

fn build_cors(state: &ServerState) -> CorsLayer {
    let origin = state
        .config
        .frontend_url
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:4200"));

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
