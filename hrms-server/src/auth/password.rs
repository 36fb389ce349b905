//! 密码哈希
//!
//! 使用 bcrypt 进行密码哈希和验证。

use bcrypt::{DEFAULT_COST, hash, verify};

use shared::error::{AppError, AppResult};

/// 对明文密码进行 bcrypt 哈希
pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))
}

/// 验证明文密码与存储的哈希是否匹配
///
/// 哈希格式非法或为空时返回 false，不返回错误。
/// 登录流程据此对"用户不存在"和"密码错误"给出同一响应。
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    verify(password, password_hash).unwrap_or(false)
}
