//! 用户账号处理函数
//!
//! 整个路由树已由 `require_role(ADMIN_ROLES)` 拦截，处理函数内不再重复检查角色。

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::page_bounds;
use crate::audit_log;
use crate::auth::permissions::is_valid_role;
use crate::auth::{CurrentUser, hash_password};
use crate::core::ServerState;
use crate::db::repository::{session as session_repo, user as user_repo};
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{User, UserCreate, UserUpdate};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

fn validate_email(email: &str) -> AppResult<()> {
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    if !email.contains('@') {
        return Err(AppError::validation("email is not a valid address"));
    }
    Ok(())
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < MIN_PASSWORD_LEN || password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_role(role: &str) -> AppResult<()> {
    if !is_valid_role(role) {
        return Err(AppError::validation(format!("Unknown role: {role}")));
    }
    Ok(())
}

/// GET /api/users - 列出用户账号
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<User>>> {
    let (limit, offset) = page_bounds(query.limit, query.offset);
    let users = user_repo::find_all(&state.pool(), limit, offset).await?;
    Ok(Json(users))
}

/// GET /api/users/{id} - 查询单个用户账号
pub async fn get_one(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    let user = user_repo::find_by_id(&state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {id}")))?;
    Ok(Json(user))
}

/// POST /api/users - 创建用户账号
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<User>> {
    validate_required_text(&payload.username, "username", MAX_NAME_LEN)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    validate_role(&payload.role)?;

    let password_hash = hash_password(&payload.password)?;
    let user = user_repo::create(&state.pool(), &payload, &password_hash).await?;

    audit_log!(
        "user_created",
        actor_id = current.id,
        user_id = user.id,
        username = user.username.clone(),
        role = user.role.clone()
    );

    Ok(Json(user))
}

/// PUT /api/users/{id} - 更新用户账号
pub async fn update(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    if let Some(email) = &payload.email {
        validate_email(email)?;
    }
    if let Some(role) = &payload.role {
        validate_role(role)?;
    }

    let password_hash = match &payload.password {
        Some(password) => {
            validate_password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let user = user_repo::update(&state.pool(), id, &payload, password_hash.as_deref()).await?;

    // 禁用账号或改密码后，既有刷新令牌会话全部作废
    if payload.is_active == Some(false) || password_hash.is_some() {
        session_repo::delete_sessions_for_user(&state.pool(), id).await?;
    }

    audit_log!(
        "user_updated",
        actor_id = current.id,
        user_id = user.id,
        username = user.username.clone()
    );

    Ok(Json(user))
}

/// DELETE /api/users/{id} - 删除用户账号
pub async fn remove(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    if current.id == id {
        return Err(AppError::validation("You cannot delete your own account"));
    }

    session_repo::delete_sessions_for_user(&state.pool(), id).await?;
    user_repo::delete(&state.pool(), id).await?;

    audit_log!("user_deleted", actor_id = current.id, user_id = id);

    Ok(Json(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("jdoe@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("longenough1").is_ok());
        assert!(validate_password(&"x".repeat(MAX_PASSWORD_LEN + 1)).is_err());
    }

    #[test]
    fn test_role_validation() {
        assert!(validate_role("hr").is_ok());
        assert!(validate_role("wizard").is_err());
    }
}
