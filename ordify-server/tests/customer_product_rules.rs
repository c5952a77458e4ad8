//! 客户与商品目录的业务规则测试
//!
//! 覆盖按名称去重、库存排序、配送方式维护等规则。

mod common;

use common::{TestServer, create_customer, create_product, register_and_login};
use serde_json::{Value, json};

#[tokio::test]
async fn test_customer_create_upserts_by_name() {
    let server = TestServer::spawn().await;
    let token = register_and_login(&server, "staff@example.com").await;

    let first = create_customer(&server, &token, "Acme GmbH").await;
    let id = first["id"].as_i64().unwrap();
    assert!(first["city"].is_null());

    // 同名再建不会生成新客户，而是补齐字段
    let resp = server
        .client
        .post(server.url("/api/customers"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Acme GmbH", "city": "Berlin", "contactPerson": "J. Doe" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let merged: Value = resp.json().await.unwrap();
    assert_eq!(merged["id"].as_i64().unwrap(), id);
    assert_eq!(merged["city"], "Berlin");
    assert_eq!(merged["contactPerson"], "J. Doe");

    let resp = server
        .client
        .get(server.url("/api/customers"))
        .send()
        .await
        .unwrap();
    let all: Value = resp.json().await.unwrap();
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_customer_write_requires_auth() {
    let server = TestServer::spawn().await;

    let resp = server
        .client
        .post(server.url("/api/customers"))
        .json(&json!({ "name": "Ghost" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // 读接口是公开的
    let resp = server
        .client
        .get(server.url("/api/customers"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_customer_update_and_delete() {
    let server = TestServer::spawn().await;
    let token = register_and_login(&server, "staff@example.com").await;
    let customer = create_customer(&server, &token, "Initech").await;
    let id = customer["id"].as_i64().unwrap();

    let resp = server
        .client
        .put(server.url(&format!("/api/customers/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "phone": "+49 30 123456" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["phone"], "+49 30 123456");
    assert_eq!(updated["name"], "Initech");

    let resp = server
        .client
        .delete(server.url(&format!("/api/customers/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let removed: Value = resp.json().await.unwrap();
    assert_eq!(removed["id"].as_i64().unwrap(), id);

    let resp = server
        .client
        .get(server.url(&format!("/api/customers/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], format!("Customer {id} not found"));
}

#[tokio::test]
async fn test_product_name_uniqueness_messages() {
    let server = TestServer::spawn().await;
    let token = register_and_login(&server, "staff@example.com").await;
    create_product(&server, &token, "Widget", 9.99, 10).await;

    let resp = server
        .client
        .post(server.url("/api/products"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Widget", "price": 1.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Product with this name already exist");

    // 无名草稿商品只允许存在一个，提示语不同
    create_product(&server, &token, "", 0.0, 0).await;
    let resp = server
        .client
        .post(server.url("/api/products"))
        .bearer_auth(&token)
        .json(&json!({ "price": 0.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["message"],
        "There is already an empty product. Fill it or delete to create a new one"
    );
}

#[tokio::test]
async fn test_product_update_rules() {
    let server = TestServer::spawn().await;
    let token = register_and_login(&server, "staff@example.com").await;
    let widget = create_product(&server, &token, "Widget", 9.99, 10).await;
    create_product(&server, &token, "Gadget", 19.99, 5).await;
    let widget_id = widget["id"].as_i64().unwrap();

    // 改成别的商品的名字被拒绝
    let resp = server
        .client
        .put(server.url(&format!("/api/products/{widget_id}")))
        .bearer_auth(&token)
        .json(&json!({ "name": "Gadget" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // 改回自己的名字没问题
    let resp = server
        .client
        .put(server.url(&format!("/api/products/{widget_id}")))
        .bearer_auth(&token)
        .json(&json!({ "name": "Widget", "price": 12.5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["price"], 12.5);

    // 负库存被拒绝
    let resp = server
        .client
        .put(server.url(&format!("/api/products/{widget_id}")))
        .bearer_auth(&token)
        .json(&json!({ "quantity": -1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Quantity can't be less than zero");
}

#[tokio::test]
async fn test_out_of_stock_products_sort_last() {
    let server = TestServer::spawn().await;
    let token = register_and_login(&server, "staff@example.com").await;

    // 先建的没货，后建的有货；列表应把没货的沉底
    create_product(&server, &token, "Sold out", 5.0, 0).await;
    create_product(&server, &token, "In stock", 5.0, 3).await;

    let resp = server
        .client
        .get(server.url("/api/products"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["In stock", "Sold out"]);
}

#[tokio::test]
async fn test_delivery_options_append_and_remove() {
    let server = TestServer::spawn().await;
    let token = register_and_login(&server, "staff@example.com").await;
    let product = create_product(&server, &token, "Drone", 499.0, 4).await;
    let id = product["id"].as_i64().unwrap();
    assert_eq!(product["deliveryOptions"].as_array().unwrap().len(), 0);

    let resp = server
        .client
        .post(server.url(&format!("/api/products/{id}/delivery-options")))
        .bearer_auth(&token)
        .json(&json!({ "type": "COURIER", "price": 15.0, "period": "1-2 days" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = server
        .client
        .post(server.url(&format!("/api/products/{id}/delivery-options")))
        .bearer_auth(&token)
        .json(&json!({ "type": "PICKUP" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let detail: Value = resp.json().await.unwrap();
    let options = detail["deliveryOptions"].as_array().unwrap();
    assert_eq!(options.len(), 2);
    // 顺序号按追加顺序递增
    assert_eq!(options[0]["type"], "COURIER");
    assert_eq!(options[0]["sort_order"], 0);
    assert_eq!(options[1]["type"], "PICKUP");
    assert_eq!(options[1]["sort_order"], 1);

    // 按类型删除
    let resp = server
        .client
        .delete(server.url(&format!("/api/products/{id}/delivery-options/COURIER")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let detail: Value = resp.json().await.unwrap();
    let options = detail["deliveryOptions"].as_array().unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0]["type"], "PICKUP");

    // 删除商品没有的类型是 no-op
    let resp = server
        .client
        .delete(server.url(&format!("/api/products/{id}/delivery-options/POSTAL")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let detail: Value = resp.json().await.unwrap();
    assert_eq!(detail["deliveryOptions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_negative_quantity_rejected_on_create() {
    let server = TestServer::spawn().await;
    let token = register_and_login(&server, "staff@example.com").await;

    let resp = server
        .client
        .post(server.url("/api/products"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Broken", "price": 1.0, "quantity": -5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Quantity can't be less than zero");
}
