//! 仓储层
//!
//! 每张表一个子模块，全部是拿 `&SqlitePool` 的自由函数。
//! 仓储内部用 [`RepoError`]，出了 handler 边界再换成 `AppError`。

pub mod customer;
pub mod daily_timesheet;
pub mod document;
pub mod employee;
pub mod leave;
pub mod project;
pub mod resource_allocation;
pub mod session;
pub mod user;
pub mod weekly_timesheet;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// 仓储层错误
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        // UNIQUE 约束冲突单独成类，handler 才能映射为 409
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Duplicate(db.message().to_string())
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository database error");
                AppError::database(msg)
            }
        }
    }
}
