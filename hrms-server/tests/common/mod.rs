//! 集成测试公共工具
//!
//! 每个测试在 tempfile 临时目录里建独立的工作目录和 SQLite 数据库，
//! 用 tower::ServiceExt::oneshot 直接驱动路由，不绑定端口。

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use hrms_server::auth::{JwtConfig, hash_password};
use hrms_server::core::server::build_router;
use hrms_server::db::repository::user as user_repo;
use hrms_server::{Config, ServerState};
use shared::models::UserCreate;

/// 所有测试账号共用的密码
pub const PASSWORD: &str = "S3cret!passw0rd";

pub struct TestEnv {
    pub state: ServerState,
    pub app: Router,
    _work_dir: TempDir,
}

/// 初始化一套独立的测试环境
///
/// 显式设置 JWT 配置和零登录延迟，避免测试受环境变量影响。
pub async fn setup() -> TestEnv {
    let work_dir = tempfile::tempdir().expect("tempdir");
    let mut config = Config::with_overrides(work_dir.path().to_string_lossy(), 0);
    config.login_delay_ms = 0;
    config.jwt = JwtConfig {
        secret: "integration-test-secret-0123456789abcdef".into(),
        expiration_minutes: 60,
        issuer: "hrms-server".into(),
        audience: "hrms-clients".into(),
    };

    let state = ServerState::initialize(&config).await;
    let app = build_router(state.clone());

    TestEnv {
        state,
        app,
        _work_dir: work_dir,
    }
}

/// 直接往数据库里种一个账号，返回用户 id
pub async fn seed_user(
    state: &ServerState,
    username: &str,
    role: &str,
    employee_id: Option<i64>,
) -> i64 {
    let password_hash = hash_password(PASSWORD).expect("hash password");
    let user = user_repo::create(
        &state.pool(),
        &UserCreate {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: PASSWORD.to_string(),
            role: role.to_string(),
            employee_id,
        },
        &password_hash,
    )
    .await
    .expect("seed user");
    user.id
}

/// 登录并返回 (Bearer 令牌, 刷新 Cookie 的 name=value 部分)
pub async fn login(app: &Router, username: &str) -> (String, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({"username": username, "password": PASSWORD}).to_string(),
        ))
        .expect("login request");

    let response = app.clone().oneshot(request).await.expect("login response");
    assert_eq!(response.status(), StatusCode::OK, "login for {username}");

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
        .expect("refresh cookie");

    let bytes = body_bytes(response).await;
    let value: Value = serde_json::from_slice(&bytes).expect("login body");
    let token = value["token"].as_str().expect("token").to_string();
    (token, cookie)
}

/// 发送一个 JSON 请求，返回 (状态码, 响应 JSON)
///
/// 非 JSON 响应体返回 Value::Null。
pub async fn request(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = body_bytes(response).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub async fn body_bytes(response: http::Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes()
        .to_vec()
}

/// 通过 API 建一个员工档案，返回员工 id
pub async fn create_employee(
    app: &Router,
    token: &str,
    employee_code: &str,
    email: &str,
) -> i64 {
    let (status, body) = request(
        app,
        "POST",
        "/api/employees",
        Some(token),
        Some(serde_json::json!({
            "employee_code": employee_code,
            "first_name": "Test",
            "last_name": "Employee",
            "email": email,
            "date_of_joining": "2024-01-15"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create employee {employee_code}");
    body["id"].as_i64().expect("employee id")
}
