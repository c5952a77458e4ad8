//! 认证全流程集成测试
//!
//! 注册 / 登录 / 刷新 / 登出 / 激活，走真实 HTTP 与 cookie。

mod common;

use common::{TestServer, register_and_login};
use ordify_server::db::repository::user;
use serde_json::{Value, json};

/// 从 Set-Cookie 头里取出 refreshToken 的值
fn refresh_cookie(resp: &reqwest::Response) -> Option<String> {
    let raw = resp.headers().get("set-cookie")?.to_str().ok()?;
    let pair = raw.split(';').next()?;
    pair.strip_prefix("refreshToken=").map(str::to_string)
}

#[tokio::test]
async fn test_register_returns_tokens_and_cookie() {
    let server = TestServer::spawn().await;

    let resp = server
        .client
        .post(server.url("/api/auth/register"))
        .json(&json!({ "email": "alice@example.com", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let raw_cookie = resp
        .headers()
        .get("set-cookie")
        .expect("register should set refresh cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(raw_cookie.starts_with("refreshToken="));
    assert!(raw_cookie.contains("HttpOnly"));
    assert!(raw_cookie.contains("SameSite=None"));

    let body: Value = resp.json().await.unwrap();
    assert!(body["accessToken"].as_str().unwrap().contains('.'));
    assert!(body["refreshToken"].as_str().unwrap().contains('.'));
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["isActivated"], false);
    // 响应里绝不能出现口令相关字段
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_validation_errors() {
    let server = TestServer::spawn().await;

    // 非法邮箱 + 过短口令，两个字段错误都要报出来
    let resp = server
        .client
        .post(server.url("/api/auth/register"))
        .json(&json!({ "email": "not-an-email", "password": "abc" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Validation error");
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);

    // 重复邮箱
    register_and_login(&server, "bob@example.com").await;
    let resp = server
        .client
        .post(server.url("/api/auth/register"))
        .json(&json!({ "email": "bob@example.com", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Already exists");
}

#[tokio::test]
async fn test_login_checks_email_and_password() {
    let server = TestServer::spawn().await;
    register_and_login(&server, "carol@example.com").await;

    let resp = server
        .client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": "nobody@example.com", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "This email is not registered");

    let resp = server
        .client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": "carol@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Password does not match");

    let resp = server
        .client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": "carol@example.com", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["email"], "carol@example.com");
}

#[tokio::test]
async fn test_refresh_requires_valid_cookie() {
    let server = TestServer::spawn().await;

    // 没有 cookie 直接 401
    let resp = server
        .client
        .get(server.url("/api/auth/refresh"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // 伪造的令牌同样 401
    let resp = server
        .client
        .get(server.url("/api/auth/refresh"))
        .header("cookie", "refreshToken=not.a.jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // 注册拿到 cookie 后可以换新令牌对
    let resp = server
        .client
        .post(server.url("/api/auth/register"))
        .json(&json!({ "email": "dave@example.com", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    let token = refresh_cookie(&resp).expect("refresh cookie");

    let resp = server
        .client
        .get(server.url("/api/auth/refresh"))
        .header("cookie", format!("refreshToken={token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(refresh_cookie(&resp).is_some(), "refresh rotates the cookie");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["email"], "dave@example.com");
    assert!(body["accessToken"].as_str().unwrap().contains('.'));
}

#[tokio::test]
async fn test_logout_clears_token_once() {
    let server = TestServer::spawn().await;

    let resp = server
        .client
        .post(server.url("/api/auth/register"))
        .json(&json!({ "email": "erin@example.com", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    let token = refresh_cookie(&resp).expect("refresh cookie");

    let resp = server
        .client
        .get(server.url("/api/auth/logout"))
        .header("cookie", format!("refreshToken={token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let cleared = resp
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cleared.contains("Max-Age=0"), "logout clears the cookie");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!(true));

    // 令牌已删除，重复登出是 401
    let resp = server
        .client
        .get(server.url("/api/auth/logout"))
        .header("cookie", format!("refreshToken={token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_activation_link_flips_flag_and_redirects() {
    let server = TestServer::spawn().await;
    register_and_login(&server, "frank@example.com").await;

    let stored = user::find_by_email(&server.state.pool, "frank@example.com")
        .await
        .unwrap()
        .expect("user exists");
    assert!(!stored.is_activated);

    let resp = server
        .client
        .get(server.url(&format!("/api/auth/activate/{}", stored.activation_link)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(
        resp.headers().get("location").unwrap().to_str().unwrap(),
        server.state.config.frontend_url
    );

    let stored = user::find_by_email(&server.state.pool, "frank@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_activated);

    // 未知的激活链接
    let resp = server
        .client
        .get(server.url("/api/auth/activate/no-such-link"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Incorrect activation link");
}

#[tokio::test]
async fn test_user_list_is_staff_only() {
    let server = TestServer::spawn().await;

    let resp = server
        .client
        .get(server.url("/api/users"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let token = register_and_login(&server, "grace@example.com").await;
    let resp = server
        .client
        .get(server.url("/api/users"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "grace@example.com");
    assert!(users[0].get("password_hash").is_none());
}
