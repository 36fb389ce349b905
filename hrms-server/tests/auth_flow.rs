//! 认证流程集成测试
//!
//! 覆盖登录、刷新令牌轮换、登出、密码找回和用户管理的对外行为。

mod common;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{PASSWORD, login, request, seed_user, setup};
use hrms_server::db::repository::session as session_repo;

/// 带刷新 Cookie 调 /api/auth/refresh，返回 (状态码, 新 Cookie, 响应 JSON)
async fn refresh(app: &Router, cookie: &str) -> (StatusCode, Option<String>, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/refresh")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .expect("refresh request");

    let response = app.clone().oneshot(request).await.expect("refresh response");
    let status = response.status();
    let next_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = common::body_bytes(response).await;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, next_cookie, body)
}

#[tokio::test]
async fn health_is_public() {
    let env = setup().await;

    let (status, body) = request(&env.app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn protected_routes_require_token() {
    let env = setup().await;

    let (status, _) = request(&env.app, "GET", "/api/employees", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&env.app, "GET", "/api/employees", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let env = setup().await;
    seed_user(&env.state, "admin", "admin", None).await;

    let (status, _) = request(
        &env.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "admin", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // 未知用户和密码错误不可区分
    let (status, _) = request(
        &env.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "ghost", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_returns_token_and_profile() {
    let env = setup().await;
    let admin_id = seed_user(&env.state, "admin", "admin", None).await;

    let (token, cookie) = login(&env.app, "admin").await;
    assert!(cookie.starts_with("hrms_refresh="));

    let (status, body) = request(&env.app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], admin_id);
    assert_eq!(body["username"], "admin");
    assert_eq!(body["role"], "admin");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn refresh_rotates_the_session() {
    let env = setup().await;
    seed_user(&env.state, "admin", "admin", None).await;
    let (_, first_cookie) = login(&env.app, "admin").await;

    let (status, second_cookie, body) = refresh(&env.app, &first_cookie).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    let second_cookie = second_cookie.expect("rotated cookie");
    assert_ne!(second_cookie, first_cookie);

    // 旧令牌轮换后立即作废
    let (status, _, _) = refresh(&env.app, &first_cookie).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // 新令牌可以继续用
    let (status, _, _) = refresh(&env.app, &second_cookie).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn logout_revokes_the_refresh_session() {
    let env = setup().await;
    seed_user(&env.state, "admin", "admin", None).await;
    let (token, cookie) = login(&env.app, "admin").await;

    let logout = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .expect("logout request");
    let response = env.app.clone().oneshot(logout).await.expect("logout response");
    assert_eq!(response.status(), StatusCode::OK);

    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("clear cookie");
    assert!(cleared.contains("Max-Age=0"));

    let (status, _, _) = refresh(&env.app, &cookie).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forgot_password_does_not_reveal_accounts() {
    let env = setup().await;
    seed_user(&env.state, "admin", "admin", None).await;

    let (status, known) = request(
        &env.app,
        "POST",
        "/api/auth/forgot-password",
        None,
        Some(json!({"identifier": "admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, unknown) = request(
        &env.app,
        "POST",
        "/api/auth/forgot-password",
        None,
        Some(json!({"identifier": "nobody@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // 已注册和未注册的响应完全一致
    assert_eq!(known, unknown);
}

#[tokio::test]
async fn reset_password_rejects_unknown_token() {
    let env = setup().await;

    let (status, _) = request(
        &env.app,
        "POST",
        "/api/auth/reset-password",
        None,
        Some(json!({"token": "bogus-token-value", "new_password": "An0ther!pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 密码长度不达标也在令牌校验之前被拒
    let (status, _) = request(
        &env.app,
        "POST",
        "/api/auth/reset-password",
        None,
        Some(json!({"token": "bogus-token-value", "new_password": "short"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reset_token_is_single_use() {
    use sha2::{Digest, Sha256};

    let env = setup().await;
    let user_id = seed_user(&env.state, "jdoe", "employee", None).await;

    // 直接落一行令牌，等价于 forgot-password 邮件里携带的原始值
    let raw_token = "integration-reset-token";
    let token_hash = hex::encode(Sha256::digest(raw_token.as_bytes()));
    let expires_at = (chrono::Utc::now() + chrono::Duration::minutes(30))
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    session_repo::create_reset_token(&env.state.pool(), user_id, &token_hash, &expires_at)
        .await
        .expect("seed reset token");

    let (status, _) = request(
        &env.app,
        "POST",
        "/api/auth/reset-password",
        None,
        Some(json!({"token": raw_token, "new_password": "An0ther!pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // 同一令牌第二次使用被拒
    let (status, _) = request(
        &env.app,
        "POST",
        "/api/auth/reset-password",
        None,
        Some(json!({"token": raw_token, "new_password": "Th1rd!password"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 旧密码失效，新密码生效
    let (status, _) = request(
        &env.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "jdoe", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(
        &env.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "jdoe", "password": "An0ther!pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn user_management_requires_admin() {
    let env = setup().await;
    let admin_id = seed_user(&env.state, "admin", "admin", None).await;
    seed_user(&env.state, "dev", "employee", None).await;

    let (dev_token, _) = login(&env.app, "dev").await;
    let (status, _) = request(&env.app, "GET", "/api/users", Some(&dev_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (admin_token, _) = login(&env.app, "admin").await;
    let (status, body) = request(
        &env.app,
        "POST",
        "/api/users",
        Some(&admin_token),
        Some(json!({
            "username": "hr1",
            "email": "hr1@example.com",
            "password": PASSWORD,
            "role": "hr"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "hr");
    assert!(body.get("password_hash").is_none());

    // 用户名唯一
    let (status, _) = request(
        &env.app,
        "POST",
        "/api/users",
        Some(&admin_token),
        Some(json!({
            "username": "hr1",
            "email": "other@example.com",
            "password": PASSWORD,
            "role": "hr"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // 不认识的角色名被拒
    let (status, _) = request(
        &env.app,
        "POST",
        "/api/users",
        Some(&admin_token),
        Some(json!({
            "username": "weird",
            "email": "weird@example.com",
            "password": PASSWORD,
            "role": "root"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 管理员不能删除自己的账号
    let (status, _) = request(
        &env.app,
        "DELETE",
        &format!("/api/users/{admin_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deactivated_accounts_cannot_login_or_refresh() {
    let env = setup().await;
    seed_user(&env.state, "admin", "admin", None).await;
    let dev_id = seed_user(&env.state, "dev", "employee", None).await;
    let (_, dev_cookie) = login(&env.app, "dev").await;

    let (admin_token, _) = login(&env.app, "admin").await;
    let (status, _) = request(
        &env.app,
        "PUT",
        &format!("/api/users/{dev_id}"),
        Some(&admin_token),
        Some(json!({"is_active": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &env.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "dev", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // 停用时既有会话一并失效
    let (status, _, _) = refresh(&env.app, &dev_cookie).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
