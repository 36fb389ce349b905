/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Current UTC time as an RFC 3339 string (stored in TEXT columns).
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Generate the next task identifier from the current task count.
///
/// IDs are sequential and zero-padded to three digits:
/// `generate_task_id(7) == "TASK008"`, `generate_task_id(150) == "TASK151"`.
pub fn generate_task_id(current_count: u32) -> String {
    format!("TASK{:03}", current_count + 1)
}

/// Format a task number without padding beyond the number itself.
///
/// `format_task_number(150) == "TASK150"`.
pub fn format_task_number(number: u32) -> String {
    format!("TASK{}", number)
}

/// Convert an `HH:MM` duration string to decimal hours.
///
/// `"08:30"` becomes `8.5`. Returns `None` for anything that is not
/// two colon-separated numeric fields with minutes below 60.
pub fn convert_hours_to_decimal(value: &str) -> Option<f64> {
    let (hours, minutes) = value.split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    Some(hours as f64 + minutes as f64 / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_task_id_pads_to_three_digits() {
        assert_eq!(generate_task_id(0), "TASK001");
        assert_eq!(generate_task_id(7), "TASK008");
        assert_eq!(generate_task_id(99), "TASK100");
        assert_eq!(generate_task_id(150), "TASK151");
    }

    #[test]
    fn test_format_task_number() {
        assert_eq!(format_task_number(1), "TASK1");
        assert_eq!(format_task_number(150), "TASK150");
    }

    #[test]
    fn test_convert_hours_to_decimal() {
        assert_eq!(convert_hours_to_decimal("08:30"), Some(8.5));
        assert_eq!(convert_hours_to_decimal("0:00"), Some(0.0));
        assert_eq!(convert_hours_to_decimal("12:45"), Some(12.75));
    }

    #[test]
    fn test_convert_hours_to_decimal_rejects_bad_input() {
        assert_eq!(convert_hours_to_decimal(""), None);
        assert_eq!(convert_hours_to_decimal("8"), None);
        assert_eq!(convert_hours_to_decimal("8:60"), None);
        assert_eq!(convert_hours_to_decimal("ab:cd"), None);
        assert_eq!(convert_hours_to_decimal("8:30:00"), None);
    }
}
