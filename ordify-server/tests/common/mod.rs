//! 集成测试公共设施
//!
//! 每个测试启动一个完整的 HTTP 服务：临时 SQLite 数据库 + 随机端口，
//! 通过 reqwest 走真实网络栈（路由、中间件、序列化全部参与）。

#![allow(dead_code)]

use ordify_server::routes::build_app;
use ordify_server::services::PaymentService;
use ordify_server::{Config, ServerState};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

/// 一个运行中的测试服务
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub state: ServerState,
    // 临时目录随 TestServer 一起销毁，数据库文件不残留
    _db_dir: tempfile::TempDir,
}

impl TestServer {
    /// 启动干净的服务实例
    pub async fn spawn() -> Self {
        let db_dir = tempfile::tempdir().expect("create temp dir");
        let db_path = db_dir.path().join("ordify-test.db");

        let config = Config::with_overrides(db_path.to_string_lossy(), 0);
        let mut state = ServerState::initialize(&config)
            .await
            .expect("initialize server state");
        // 测试不等模拟的 Stripe 延迟
        state.payment_service =
            Arc::new(PaymentService::with_delays(Duration::ZERO, Duration::ZERO));

        let app = build_app(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        // 激活接口 302 跳转到前端地址，测试要看原始响应而不是跟着跳
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("build http client");

        Self {
            base_url: format!("http://{addr}"),
            client,
            state,
            _db_dir: db_dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// 注册并返回 access token
pub async fn register_and_login(server: &TestServer, email: &str) -> String {
    let resp = server
        .client
        .post(server.url("/api/auth/register"))
        .json(&json!({ "email": email, "password": "secret1" }))
        .send()
        .await
        .expect("register request");
    assert_eq!(resp.status(), 200, "register should succeed");
    let body: Value = resp.json().await.expect("register body");
    body["accessToken"]
        .as_str()
        .expect("accessToken in response")
        .to_string()
}

/// 创建客户，返回完整的客户 JSON
pub async fn create_customer(server: &TestServer, token: &str, name: &str) -> Value {
    let resp = server
        .client
        .post(server.url("/api/customers"))
        .bearer_auth(token)
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("create customer request");
    assert_eq!(resp.status(), 200, "create customer should succeed");
    resp.json().await.expect("customer body")
}

/// 创建商品，返回完整的商品 JSON
pub async fn create_product(
    server: &TestServer,
    token: &str,
    name: &str,
    price: f64,
    quantity: i64,
) -> Value {
    let resp = server
        .client
        .post(server.url("/api/products"))
        .bearer_auth(token)
        .json(&json!({ "name": name, "price": price, "quantity": quantity }))
        .send()
        .await
        .expect("create product request");
    assert_eq!(resp.status(), 200, "create product should succeed");
    resp.json().await.expect("product body")
}

/// 下单（公开接口，POST /api/orders/{customer_id}/{product_id}）
pub async fn create_order(
    server: &TestServer,
    customer_id: i64,
    product_id: i64,
    quantity: i64,
) -> reqwest::Response {
    server
        .client
        .post(server.url(&format!("/api/orders/{customer_id}/{product_id}")))
        .json(&json!({ "quantity": quantity }))
        .send()
        .await
        .expect("create order request")
}
