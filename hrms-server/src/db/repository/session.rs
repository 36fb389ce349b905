//! Session and Password Reset Token Repository
//!
//! Both tables store sha256 hex digests, never raw tokens.

use super::RepoResult;
use shared::models::{PasswordResetToken, Session};
use sqlx::SqlitePool;

pub async fn create_session(
    pool: &SqlitePool,
    user_id: i64,
    refresh_token_hash: &str,
    user_agent: Option<&str>,
    expires_at: &str,
) -> RepoResult<()> {
    let now = shared::util::now_rfc3339();
    sqlx::query(
        "INSERT INTO sessions (user_id, refresh_token_hash, user_agent, expires_at, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(refresh_token_hash)
    .bind(user_agent)
    .bind(expires_at)
    .bind(&now)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_session_by_hash(
    pool: &SqlitePool,
    refresh_token_hash: &str,
) -> RepoResult<Option<Session>> {
    let session = sqlx::query_as::<_, Session>(
        "SELECT id, user_id, refresh_token_hash, user_agent, expires_at, created_at FROM sessions WHERE refresh_token_hash = ?",
    )
    .bind(refresh_token_hash)
    .fetch_optional(pool)
    .await?;
    Ok(session)
}

/// Delete one session row; returns whether a row existed
pub async fn delete_session_by_hash(
    pool: &SqlitePool,
    refresh_token_hash: &str,
) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM sessions WHERE refresh_token_hash = ?")
        .bind(refresh_token_hash)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Drop every session of one user, used after a password reset
pub async fn delete_sessions_for_user(pool: &SqlitePool, user_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}

pub async fn delete_expired_sessions(pool: &SqlitePool, now: &str) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}

pub async fn create_reset_token(
    pool: &SqlitePool,
    user_id: i64,
    token_hash: &str,
    expires_at: &str,
) -> RepoResult<()> {
    let now = shared::util::now_rfc3339();
    sqlx::query(
        "INSERT INTO password_reset_tokens (user_id, token_hash, expires_at, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .bind(&now)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_reset_token_by_hash(
    pool: &SqlitePool,
    token_hash: &str,
) -> RepoResult<Option<PasswordResetToken>> {
    let token = sqlx::query_as::<_, PasswordResetToken>(
        "SELECT id, user_id, token_hash, expires_at, created_at FROM password_reset_tokens WHERE token_hash = ?",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;
    Ok(token)
}

/// Consume a reset token; single use, so the DELETE doubles as the guard.
/// Returns false when the token was already consumed by a concurrent request.
pub async fn consume_reset_token(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM password_reset_tokens WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Invalidate outstanding reset tokens before issuing a fresh one
pub async fn delete_reset_tokens_for_user(pool: &SqlitePool, user_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}

pub async fn delete_expired_reset_tokens(pool: &SqlitePool, now: &str) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM password_reset_tokens WHERE expires_at < ?")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}
