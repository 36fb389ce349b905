//! 认证处理函数

use std::time::Duration;

use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
};
use chrono::{SecondsFormat, Utc};
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::auth::permissions::get_default_permissions;
use crate::auth::{CurrentUser, hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::{session as session_repo, user as user_repo};
use crate::security_log;
use crate::utils::validation::MAX_PASSWORD_LEN;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{User, UserInfo};
use shared::util::now_rfc3339;

/// 刷新令牌 Cookie 名
const REFRESH_COOKIE: &str = "hrms_refresh";

/// 刷新令牌长度 (字母数字)
const REFRESH_TOKEN_LEN: usize = 64;

/// 密码重置令牌长度
const RESET_TOKEN_LEN: usize = 48;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    /// 用户名或邮箱
    pub identifier: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ── Cookie / token helpers ──────────────────────────────────────────

fn refresh_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{REFRESH_COOKIE}={token}; HttpOnly; SameSite=Strict; Path=/api/auth; Max-Age={max_age_secs}"
    )
}

fn clear_refresh_cookie() -> String {
    refresh_cookie("", 0)
}

fn read_refresh_cookie(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|part| {
        let (name, value) = part.trim().split_once('=')?;
        (name == REFRESH_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

fn set_cookie_headers(cookie: &str) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| AppError::internal(format!("Invalid cookie value: {e}")))?;
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}

pub(crate) fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

pub(crate) fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn expiry_after(duration: chrono::Duration) -> String {
    (Utc::now() + duration).to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn user_agent_of(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok())
}

/// 颁发访问令牌 + 刷新令牌会话，返回 Set-Cookie 头和响应体
async fn issue_tokens(
    state: &ServerState,
    user: &User,
    user_agent: Option<&str>,
) -> AppResult<(HeaderMap, Json<LoginResponse>)> {
    let permissions = get_default_permissions(&user.role);
    let token = state
        .get_jwt_service()
        .generate_token(user.id, &user.username, &user.role, &permissions)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    let refresh = random_token(REFRESH_TOKEN_LEN);
    let ttl = chrono::Duration::days(state.config.refresh_token_ttl_days);
    session_repo::create_session(
        &state.pool(),
        user.id,
        &sha256_hex(&refresh),
        user_agent,
        &expiry_after(ttl),
    )
    .await?;

    let headers = set_cookie_headers(&refresh_cookie(
        &refresh,
        state.config.refresh_token_ttl_days * 24 * 3600,
    ))?;

    Ok((
        headers,
        Json(LoginResponse {
            token,
            user: UserInfo::from(user),
        }),
    ))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /api/auth/login - 用户名/邮箱 + 密码登录
pub async fn login(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> AppResult<(HeaderMap, Json<LoginResponse>)> {
    let found = user_repo::find_by_username_or_email(&state.pool(), &payload.username).await?;

    // 固定延时，拉平"用户不存在"与"密码错误"的响应时间
    tokio::time::sleep(Duration::from_millis(state.config.login_delay_ms)).await;

    let Some(user) = found else {
        security_log!(
            "WARN",
            "login_failed",
            username = payload.username.clone(),
            reason = "unknown_user"
        );
        return Err(AppError::invalid_credentials());
    };

    if !verify_password(&payload.password, &user.password_hash) {
        security_log!(
            "WARN",
            "login_failed",
            user_id = user.id,
            username = user.username.clone(),
            reason = "bad_password"
        );
        return Err(AppError::invalid_credentials());
    }

    if !user.is_active {
        security_log!(
            "WARN",
            "login_denied",
            user_id = user.id,
            username = user.username.clone(),
            reason = "disabled"
        );
        return Err(AppError::forbidden("Account has been disabled"));
    }

    security_log!(
        "INFO",
        "login_success",
        user_id = user.id,
        username = user.username.clone()
    );

    issue_tokens(&state, &user, user_agent_of(&headers)).await
}

/// POST /api/auth/refresh - 用刷新令牌换新的访问令牌 (轮换刷新令牌)
pub async fn refresh(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> AppResult<(HeaderMap, Json<LoginResponse>)> {
    let token = read_refresh_cookie(&headers)
        .ok_or_else(|| AppError::invalid_token("Missing refresh token"))?;
    let hash = sha256_hex(&token);

    let session = session_repo::find_session_by_hash(&state.pool(), &hash)
        .await?
        .ok_or_else(|| AppError::invalid_token("Unknown refresh token"))?;

    if session.expires_at < now_rfc3339() {
        session_repo::delete_session_by_hash(&state.pool(), &hash).await?;
        return Err(AppError::token_expired());
    }

    let user = user_repo::find_by_id(&state.pool(), session.user_id)
        .await?
        .ok_or_else(|| AppError::invalid_token("Unknown refresh token"))?;
    if !user.is_active {
        session_repo::delete_sessions_for_user(&state.pool(), user.id).await?;
        return Err(AppError::forbidden("Account has been disabled"));
    }

    // 轮换：旧会话立即作废，新刷新令牌随响应下发
    session_repo::delete_session_by_hash(&state.pool(), &hash).await?;
    issue_tokens(&state, &user, user_agent_of(&headers)).await
}

/// POST /api/auth/logout - 注销当前刷新令牌会话
pub async fn logout(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
) -> AppResult<(HeaderMap, Json<MessageResponse>)> {
    if let Some(token) = read_refresh_cookie(&headers) {
        session_repo::delete_session_by_hash(&state.pool(), &sha256_hex(&token)).await?;
    }

    security_log!(
        "INFO",
        "logout",
        user_id = user.id,
        username = user.username.clone()
    );

    Ok((
        set_cookie_headers(&clear_refresh_cookie())?,
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    ))
}

/// GET /api/auth/me - 当前登录用户信息
pub async fn me(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<UserInfo>> {
    let account = user_repo::find_by_id(&state.pool(), user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", user.id)))?;
    Ok(Json(UserInfo::from(&account)))
}

/// POST /api/auth/forgot-password - 发起密码重置
///
/// 无论账号是否存在都返回同一提示，避免探测注册用户。
pub async fn forgot_password(
    State(state): State<ServerState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let found = user_repo::find_by_username_or_email(&state.pool(), &payload.identifier).await?;

    if let Some(user) = found.filter(|u| u.is_active) {
        session_repo::delete_reset_tokens_for_user(&state.pool(), user.id).await?;

        let token = random_token(RESET_TOKEN_LEN);
        let ttl = chrono::Duration::minutes(state.config.reset_token_ttl_minutes);
        session_repo::create_reset_token(
            &state.pool(),
            user.id,
            &sha256_hex(&token),
            &expiry_after(ttl),
        )
        .await?;

        state
            .mailer()
            .send_password_reset(&user.email, &user.username, &token)
            .await;

        security_log!(
            "INFO",
            "password_reset_requested",
            user_id = user.id,
            username = user.username.clone()
        );
    }

    Ok(Json(MessageResponse {
        message: "If the account exists, a reset link has been sent".to_string(),
    }))
}

/// POST /api/auth/reset-password - 用重置令牌设置新密码
///
/// 未知/过期/已用过的令牌统一报 "Invalid or expired reset token"。
pub async fn reset_password(
    State(state): State<ServerState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    if payload.new_password.len() < MIN_PASSWORD_LEN || payload.new_password.len() > MAX_PASSWORD_LEN
    {
        return Err(AppError::validation(format!(
            "Password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
        )));
    }

    let invalid =
        || AppError::with_message(ErrorCode::ResetTokenInvalid, "Invalid or expired reset token");

    let record = session_repo::find_reset_token_by_hash(&state.pool(), &sha256_hex(&payload.token))
        .await?
        .ok_or_else(invalid)?;

    if record.expires_at < now_rfc3339() {
        session_repo::delete_expired_reset_tokens(&state.pool(), &now_rfc3339()).await?;
        return Err(invalid());
    }

    // DELETE 作为一次性消费保证；并发请求只有一个能成功
    if !session_repo::consume_reset_token(&state.pool(), record.id).await? {
        return Err(invalid());
    }

    let password_hash = hash_password(&payload.new_password)?;
    user_repo::update_password(&state.pool(), record.user_id, &password_hash).await?;

    // 密码已换，所有既有会话一并失效
    session_repo::delete_sessions_for_user(&state.pool(), record.user_id).await?;

    security_log!("INFO", "password_reset_completed", user_id = record.user_id);

    Ok(Json(MessageResponse {
        message: "Password has been reset".to_string(),
    }))
}
