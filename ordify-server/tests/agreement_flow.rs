//! 协议与客户端令牌集成测试
//!
//! 签订 / 唯一性 / 令牌校验 / 凭令牌下单 / 续签。

mod common;

use common::{TestServer, create_customer, create_order, create_product, register_and_login};
use serde_json::{Value, json};

/// 签订协议（无请求体），断言 201 并返回协议 JSON
async fn issue_agreement(server: &TestServer, token: &str, customer_id: i64) -> Value {
    let resp = server
        .client
        .post(server.url(&format!("/api/agreements/{customer_id}")))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    resp.json().await.unwrap()
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

#[tokio::test]
async fn test_issue_agreement_mints_hex_token() {
    let server = TestServer::spawn().await;
    let token = register_and_login(&server, "staff@example.com").await;
    let customer = create_customer(&server, &token, "Acme").await;
    let customer_id = customer["id"].as_i64().unwrap();

    let agreement = issue_agreement(&server, &token, customer_id).await;
    assert_eq!(agreement["customerId"].as_i64().unwrap(), customer_id);
    assert_eq!(agreement["isActive"], true);
    assert!(agreement["legalEntityId"].is_null());

    // 令牌是 32 字节的十六进制
    let client_token = agreement["clientToken"].as_str().unwrap();
    assert_eq!(client_token.len(), 64);
    assert!(client_token.chars().all(|c| c.is_ascii_hexdigit()));

    // 默认期限一年，粗略断言在 300 天之后
    let ends_at = agreement["ends_at"].as_i64().unwrap();
    assert!(ends_at > now_millis() + 300 * 24 * 60 * 60 * 1000);
}

#[tokio::test]
async fn test_issue_requires_auth_and_existing_customer() {
    let server = TestServer::spawn().await;
    let token = register_and_login(&server, "staff@example.com").await;

    let resp = server
        .client
        .post(server.url("/api/agreements/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = server
        .client
        .post(server.url("/api/agreements/424242"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Customer not found");
}

#[tokio::test]
async fn test_one_active_agreement_per_customer() {
    let server = TestServer::spawn().await;
    let token = register_and_login(&server, "staff@example.com").await;
    let customer = create_customer(&server, &token, "Acme").await;
    let customer_id = customer["id"].as_i64().unwrap();

    let first = issue_agreement(&server, &token, customer_id).await;

    let resp = server
        .client
        .post(server.url(&format!("/api/agreements/{customer_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Customer already has an active agreement");

    // 停用后就能重新签
    let id = first["id"].as_i64().unwrap();
    let resp = server
        .client
        .patch(server.url(&format!("/api/agreements/{id}/deactivate")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let deactivated: Value = resp.json().await.unwrap();
    assert_eq!(deactivated["isActive"], false);

    issue_agreement(&server, &token, customer_id).await;
}

#[tokio::test]
async fn test_active_agreement_lookup_by_customer() {
    let server = TestServer::spawn().await;
    let token = register_and_login(&server, "staff@example.com").await;
    let customer = create_customer(&server, &token, "Acme").await;
    let customer_id = customer["id"].as_i64().unwrap();
    let agreement = issue_agreement(&server, &token, customer_id).await;

    let resp = server
        .client
        .get(server.url(&format!("/api/agreements/customer/{customer_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let found: Value = resp.json().await.unwrap();
    assert_eq!(found["id"], agreement["id"]);

    let id = agreement["id"].as_i64().unwrap();
    server
        .client
        .patch(server.url(&format!("/api/agreements/{id}/deactivate")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    let resp = server
        .client
        .get(server.url(&format!("/api/agreements/customer/{customer_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "No active agreement found for this customer");
}

#[tokio::test]
async fn test_validate_token_always_answers_200() {
    let server = TestServer::spawn().await;
    let token = register_and_login(&server, "staff@example.com").await;
    let customer = create_customer(&server, &token, "Acme").await;
    let agreement = issue_agreement(&server, &token, customer["id"].as_i64().unwrap()).await;
    let client_token = agreement["clientToken"].as_str().unwrap();

    let resp = server
        .client
        .get(server.url(&format!("/api/agreements/validate/{client_token}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["valid"], true);
    assert_eq!(body["agreement"]["id"], agreement["id"]);

    // 未知令牌：同样 200，valid=false，不带 agreement 字段
    let resp = server
        .client
        .get(server.url("/api/agreements/validate/deadbeef"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["valid"], false);
    assert!(body.get("agreement").is_none());

    // 停用后 valid=false，但按令牌直查仍能找到这行
    let id = agreement["id"].as_i64().unwrap();
    server
        .client
        .patch(server.url(&format!("/api/agreements/{id}/deactivate")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    let resp = server
        .client
        .get(server.url(&format!("/api/agreements/validate/{client_token}")))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["valid"], false);

    let resp = server
        .client
        .get(server.url(&format!("/api/agreements/token/{client_token}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["isActive"], false);
}

#[tokio::test]
async fn test_order_by_client_token() {
    let server = TestServer::spawn().await;
    let token = register_and_login(&server, "staff@example.com").await;
    let customer = create_customer(&server, &token, "Acme").await;
    let product = create_product(&server, &token, "Widget", 10.0, 10).await;
    let customer_id = customer["id"].as_i64().unwrap();
    let product_id = product["id"].as_i64().unwrap();
    let agreement = issue_agreement(&server, &token, customer_id).await;
    let client_token = agreement["clientToken"].as_str().unwrap();

    let resp = server
        .client
        .post(server.url(&format!("/api/orders/token/{client_token}/{product_id}")))
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let order: Value = resp.json().await.unwrap();
    // 客户身份来自令牌解析出的协议
    assert_eq!(order["customerId"].as_i64().unwrap(), customer_id);
    assert_eq!(order["agreementId"], agreement["id"]);

    // 停用协议后令牌失效
    let id = agreement["id"].as_i64().unwrap();
    server
        .client
        .patch(server.url(&format!("/api/agreements/{id}/deactivate")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    let resp = server
        .client
        .post(server.url(&format!("/api/orders/token/{client_token}/{product_id}")))
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Invalid or expired client token");
}

#[tokio::test]
async fn test_renew_reactivates_unless_conflicting() {
    let server = TestServer::spawn().await;
    let token = register_and_login(&server, "staff@example.com").await;
    let customer = create_customer(&server, &token, "Acme").await;
    let customer_id = customer["id"].as_i64().unwrap();

    let first = issue_agreement(&server, &token, customer_id).await;
    let first_id = first["id"].as_i64().unwrap();

    server
        .client
        .patch(server.url(&format!("/api/agreements/{first_id}/deactivate")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    // 续签：重新激活并给出新有效期
    let ends_at = now_millis() + 30 * 24 * 60 * 60 * 1000;
    let resp = server
        .client
        .patch(server.url(&format!("/api/agreements/{first_id}/renew")))
        .bearer_auth(&token)
        .json(&json!({ "ends_at": ends_at }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let renewed: Value = resp.json().await.unwrap();
    assert_eq!(renewed["isActive"], true);
    assert_eq!(renewed["ends_at"].as_i64().unwrap(), ends_at);

    // 客户换签了新协议之后，旧协议不允许再续
    server
        .client
        .patch(server.url(&format!("/api/agreements/{first_id}/deactivate")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    issue_agreement(&server, &token, customer_id).await;

    let resp = server
        .client
        .patch(server.url(&format!("/api/agreements/{first_id}/renew")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Customer already has an active agreement");
}

#[tokio::test]
async fn test_expired_agreement_is_replaceable() {
    let server = TestServer::spawn().await;
    let token = register_and_login(&server, "staff@example.com").await;
    let customer = create_customer(&server, &token, "Acme").await;
    let customer_id = customer["id"].as_i64().unwrap();

    // 有效期已经过去的协议
    let resp = server
        .client
        .post(server.url(&format!("/api/agreements/{customer_id}")))
        .bearer_auth(&token)
        .json(&json!({ "ends_at": now_millis() - 1000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let expired: Value = resp.json().await.unwrap();
    let client_token = expired["clientToken"].as_str().unwrap();

    // 行还标着 active，但令牌校验看的是有效期
    let resp = server
        .client
        .get(server.url(&format!("/api/agreements/validate/{client_token}")))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["valid"], false);

    // 换新协议时过期的旧行被自动清理，不算冲突
    issue_agreement(&server, &token, customer_id).await;
}

#[tokio::test]
async fn test_combined_order_with_agreement() {
    let server = TestServer::spawn().await;
    let token = register_and_login(&server, "staff@example.com").await;
    let customer = create_customer(&server, &token, "Acme").await;
    let product = create_product(&server, &token, "Widget", 25.0, 10).await;
    let customer_id = customer["id"].as_i64().unwrap();
    let product_id = product["id"].as_i64().unwrap();

    let resp = server
        .client
        .post(server.url(&format!(
            "/api/orders/agreement/{customer_id}/{product_id}"
        )))
        .json(&json!({
            "quantity": 2,
            "agreement": {
                "legalEntity": {
                    "name": "Acme Holding GmbH",
                    "registrationNumber": "HRB 12345",
                    "directorName": "J. Doe"
                }
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();

    let order = &body["order"];
    let agreement = &body["agreement"];
    assert_eq!(order["agreementId"], agreement["id"]);
    assert_eq!(order["price"], 50.0);
    assert_eq!(agreement["customerId"].as_i64().unwrap(), customer_id);
    assert!(agreement["legalEntityId"].as_i64().is_some());

    // 协议详情里内嵌法人实体
    let agreement_id = agreement["id"].as_i64().unwrap();
    let resp = server
        .client
        .get(server.url(&format!("/api/agreements/{agreement_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let detail: Value = resp.json().await.unwrap();
    assert_eq!(detail["legalEntity"]["name"], "Acme Holding GmbH");
    assert_eq!(detail["legalEntity"]["registrationNumber"], "HRB 12345");
    assert_eq!(detail["customer"]["name"], "Acme");

    // 已有有效协议时组合下单直接失败
    let resp = server
        .client
        .post(server.url(&format!(
            "/api/orders/agreement/{customer_id}/{product_id}"
        )))
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Customer already has an active agreement");
}
