//! 主面板统计接口测试

mod common;

use common::{TestServer, create_customer, create_order, create_product, register_and_login};
use serde_json::Value;

#[tokio::test]
async fn test_statistics_require_auth() {
    let server = TestServer::spawn().await;

    let resp = server
        .client
        .get(server.url("/api/statistics/main"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Unauthorized");

    // 过期/伪造令牌同样拦下
    let resp = server
        .client
        .get(server.url("/api/statistics/main"))
        .bearer_auth("not.a.token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_main_statistics_counts_and_revenue() {
    let server = TestServer::spawn().await;
    let token = register_and_login(&server, "staff@example.com").await;

    // 空库：全零
    let resp = server
        .client
        .get(server.url("/api/statistics/main"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let metrics: Value = resp.json().await.unwrap();
    let metrics = metrics.as_array().unwrap().clone();
    assert_eq!(metrics.len(), 4);
    assert!(metrics.iter().all(|m| m["value"] == 0 || m["value"] == 0.0));

    // 固定顺序：Products, Customers, Orders, Total orders price
    let names: Vec<&str> = metrics
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Products", "Customers", "Orders", "Total orders price"]
    );

    let customer = create_customer(&server, &token, "Acme").await;
    let widget = create_product(&server, &token, "Widget", 10.0, 50).await;
    create_product(&server, &token, "Gadget", 30.0, 50).await;
    let customer_id = customer["id"].as_i64().unwrap();
    let widget_id = widget["id"].as_i64().unwrap();

    // 两单：10×2=20 和 10×3=30，合计 50
    assert_eq!(create_order(&server, customer_id, widget_id, 2).await.status(), 200);
    assert_eq!(create_order(&server, customer_id, widget_id, 3).await.status(), 200);

    let resp = server
        .client
        .get(server.url("/api/statistics/main"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let metrics: Value = resp.json().await.unwrap();
    let metrics = metrics.as_array().unwrap();

    assert_eq!(metrics[0]["value"], 2);
    assert!(metrics[0].get("isCurrencyValue").is_none());
    assert_eq!(metrics[1]["value"], 1);
    assert_eq!(metrics[2]["value"], 2);
    assert_eq!(metrics[3]["value"], 50.0);
    assert_eq!(metrics[3]["isCurrencyValue"], true);
}
