//! Grouping of error codes by their thousands digit

use serde::{Deserialize, Serialize};

use super::codes::ErrorCode;

/// Domain an error code belongs to, derived from its numeric range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Auth,
    Permission,
    Employee,
    Timesheet,
    Leave,
    /// Customers, projects and resource allocations
    Resource,
    Document,
    Notification,
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code / 1000 {
            0 => Self::General,
            1 => Self::Auth,
            2 => Self::Permission,
            3 => Self::Employee,
            4 => Self::Timesheet,
            5 => Self::Leave,
            6 => Self::Resource,
            7 => Self::Document,
            8 => Self::Notification,
            _ => Self::System,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Employee => "employee",
            Self::Timesheet => "timesheet",
            Self::Leave => "leave",
            Self::Resource => "resource",
            Self::Document => "document",
            Self::Notification => "notification",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_range_maps_to_its_category() {
        let ranges = [
            (0u16, 999, ErrorCategory::General),
            (1000, 1999, ErrorCategory::Auth),
            (2000, 2999, ErrorCategory::Permission),
            (3000, 3999, ErrorCategory::Employee),
            (4000, 4999, ErrorCategory::Timesheet),
            (5000, 5999, ErrorCategory::Leave),
            (6000, 6999, ErrorCategory::Resource),
            (7000, 7999, ErrorCategory::Document),
            (8000, 8999, ErrorCategory::Notification),
            (9000, u16::MAX, ErrorCategory::System),
        ];
        for (lo, hi, expected) in ranges {
            assert_eq!(ErrorCategory::from_code(lo), expected, "low end of {expected:?}");
            assert_eq!(ErrorCategory::from_code(hi), expected, "high end of {expected:?}");
        }
    }

    #[test]
    fn test_codes_carry_their_category() {
        let cases = [
            (ErrorCode::Success, ErrorCategory::General),
            (ErrorCode::NotAuthenticated, ErrorCategory::Auth),
            (ErrorCode::PermissionDenied, ErrorCategory::Permission),
            (ErrorCode::EmployeeNotFound, ErrorCategory::Employee),
            (ErrorCode::TimesheetDuplicate, ErrorCategory::Timesheet),
            (ErrorCode::LeaveRequestNotFound, ErrorCategory::Leave),
            (ErrorCode::AllocationDuplicate, ErrorCategory::Resource),
            (ErrorCode::DocumentNotFound, ErrorCategory::Document),
            (ErrorCode::MailSendFailed, ErrorCategory::Notification),
            (ErrorCode::InternalError, ErrorCategory::System),
        ];
        for (code, expected) in cases {
            assert_eq!(code.category(), expected, "{code:?}");
        }
    }

    #[test]
    fn test_name_and_serde_agree() {
        for category in [
            ErrorCategory::General,
            ErrorCategory::Auth,
            ErrorCategory::Timesheet,
            ErrorCategory::System,
        ] {
            let json = serde_json::to_string(&category).expect("serialize");
            assert_eq!(json, format!("\"{}\"", category.name()));
            let back: ErrorCategory = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(back, category);
        }
    }
}
