//! 输入校验
//!
//! 各 handler 共用的长度上限与小型校验函数。SQLite 的 TEXT 列不限长，
//! 所以写入前在这里兜底。

use chrono::NaiveDate;

use crate::utils::AppError;

/// 实体名称：员工、客户、项目、证件标题等
pub const MAX_NAME_LEN: usize = 200;
/// 备注、描述、请假理由、审批意见等
pub const MAX_NOTE_LEN: usize = 500;
/// 短标识：电话、PAN、Aadhaar、银行账号、PF 号等
pub const MAX_SHORT_TEXT_LEN: usize = 100;
/// 邮箱地址 (RFC 5321 上限)
pub const MAX_EMAIL_LEN: usize = 254;
/// 明文密码 (哈希前)
pub const MAX_PASSWORD_LEN: usize = 128;
/// 通讯地址
pub const MAX_ADDRESS_LEN: usize = 500;

fn too_long(field: &str, len: usize, max_len: usize) -> AppError {
    AppError::validation(format!("{field} exceeds {max_len} characters (got {len})"))
        .with_detail("field", field)
}

/// 必填字段：非空白且不超过 `max_len` 字节
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(
            AppError::validation(format!("{field} must not be empty")).with_detail("field", field)
        );
    }
    if value.len() > max_len {
        return Err(too_long(field, value.len(), max_len));
    }
    Ok(())
}

/// 可选字段：出现时不超过 `max_len` 字节
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    match value {
        Some(v) if v.len() > max_len => Err(too_long(field, v.len(), max_len)),
        _ => Ok(()),
    }
}

/// 解析 `YYYY-MM-DD` 日期串
pub fn validate_date(value: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::validation(format!("{field} must be a date in YYYY-MM-DD format"))
            .with_detail("field", field)
    })
}

/// 单日工时必须落在 (0, 24] 且是有限数
pub fn validate_hours(hours: f64, field: &str) -> Result<(), AppError> {
    if hours.is_finite() && hours > 0.0 && hours <= 24.0 {
        return Ok(());
    }
    Err(AppError::validation(format!("{field} must be between 0 and 24")).with_detail("field", field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_rejects_blank() {
        assert!(validate_required_text("  ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("Alice", "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn test_required_text_rejects_overlong() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        let err = validate_required_text(&long, "name", MAX_NAME_LEN).expect_err("too long");
        assert_eq!(err.details.expect("details")["field"], "name");
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "note", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(&Some("ok".into()), "note", MAX_NOTE_LEN).is_ok());
        let long = Some("x".repeat(MAX_NOTE_LEN + 1));
        assert!(validate_optional_text(&long, "note", MAX_NOTE_LEN).is_err());
    }

    #[test]
    fn test_date_parsing() {
        assert!(validate_date("2024-03-11", "work_date").is_ok());
        assert!(validate_date("11/03/2024", "work_date").is_err());
        assert!(validate_date("2024-13-40", "work_date").is_err());
    }

    #[test]
    fn test_hours_range() {
        assert!(validate_hours(8.0, "total_hours").is_ok());
        assert!(validate_hours(0.5, "total_hours").is_ok());
        assert!(validate_hours(24.0, "total_hours").is_ok());
        assert!(validate_hours(0.0, "total_hours").is_err());
        assert!(validate_hours(25.0, "total_hours").is_err());
        assert!(validate_hours(f64::NAN, "total_hours").is_err());
    }
}
