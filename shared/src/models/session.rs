//! Session and password reset token models

use serde::{Deserialize, Serialize};

/// Refresh token session
///
/// Only the sha256 hex digest of the refresh token is stored. Rotation
/// replaces the row; cleanup removes expired rows hourly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    /// sha256 hex digest of the refresh token, unique
    pub refresh_token_hash: String,
    /// Client user agent captured at login
    pub user_agent: Option<String>,
    /// RFC3339 expiry
    pub expires_at: String,
    pub created_at: String,
}

/// Single-use password reset token, consumed on redemption
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PasswordResetToken {
    pub id: i64,
    pub user_id: i64,
    /// sha256 hex digest of the reset token, unique
    pub token_hash: String,
    /// RFC3339 expiry
    pub expires_at: String,
    pub created_at: String,
}
