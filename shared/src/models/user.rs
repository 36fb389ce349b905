//! User account model

use serde::{Deserialize, Serialize};

/// Login account
///
/// Separate from [`super::Employee`]: a user row carries credentials and a
/// role, and optionally links to an employee record via `employee_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    /// Unique login name
    pub username: String,
    /// Unique account email (password reset target)
    pub email: String,
    /// bcrypt hash, never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// One of: superUser, admin, hr, manager, employee, customer
    pub role: String,
    /// Linked employee record, if any
    pub employee_id: Option<i64>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Public view of a user, embedded in login and profile responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub employee_id: Option<i64>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            employee_id: user.employee_id,
        }
    }
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    /// Plaintext, hashed with bcrypt before storage
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub employee_id: Option<i64>,
}

/// Update user payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub employee_id: Option<i64>,
    pub is_active: Option<bool>,
}
