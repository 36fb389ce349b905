//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{User, UserCreate, UserUpdate};
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, role, employee_id, is_active, created_at, updated_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, role, employee_id, is_active, created_at, updated_at FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Lookup by login name or account email, used by the password reset flow
pub async fn find_by_username_or_email(
    pool: &SqlitePool,
    identifier: &str,
) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, role, employee_id, is_active, created_at, updated_at FROM users WHERE username = ?1 OR email = ?1",
    )
    .bind(identifier)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_all(pool: &SqlitePool, limit: i32, offset: i32) -> RepoResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, role, employee_id, is_active, created_at, updated_at FROM users ORDER BY id LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(users)
}

/// Insert a new user; `password_hash` is a ready bcrypt hash
pub async fn create(
    pool: &SqlitePool,
    data: &UserCreate,
    password_hash: &str,
) -> RepoResult<User> {
    let now = shared::util::now_rfc3339();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash, role, employee_id, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, 1, ?6, ?6) RETURNING id",
    )
    .bind(&data.username)
    .bind(&data.email)
    .bind(password_hash)
    .bind(&data.role)
    .bind(data.employee_id)
    .bind(&now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &UserUpdate,
    password_hash: Option<&str>,
) -> RepoResult<User> {
    let now = shared::util::now_rfc3339();
    let rows = sqlx::query(
        "UPDATE users SET email = COALESCE(?, email), password_hash = COALESCE(?, password_hash), role = COALESCE(?, role), employee_id = COALESCE(?, employee_id), is_active = COALESCE(?, is_active), updated_at = ? WHERE id = ?",
    )
    .bind(&data.email)
    .bind(password_hash)
    .bind(&data.role)
    .bind(data.employee_id)
    .bind(data.is_active)
    .bind(&now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

/// Replace the stored bcrypt hash, used by the reset-password flow
pub async fn update_password(pool: &SqlitePool, id: i64, password_hash: &str) -> RepoResult<()> {
    let now = shared::util::now_rfc3339();
    let rows = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(password_hash)
        .bind(&now)
        .bind(id)
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    Ok(())
}
