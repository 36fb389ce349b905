//! Daily and weekly timesheet models

use super::status::ApprovalStatus;
use serde::{Deserialize, Serialize};

/// Single task entry inside a daily timesheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetTask {
    /// Sequential per-sheet id, e.g. "TASK001"
    pub task_id: String,
    pub description: String,
    /// Worked time as `HH:MM`
    pub hours: String,
}

/// Daily timesheet row
///
/// `tasks_json` is the raw JSON column; the typed `tasks` vector is
/// populated by the service layer after deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DailyTimesheet {
    pub id: i64,
    pub employee_id: i64,
    /// Work date, `YYYY-MM-DD`. Unique per employee.
    pub work_date: String,
    /// Raw JSON array of tasks as stored
    #[serde(skip_serializing)]
    pub tasks_json: String,
    /// Sum of task hours as a decimal, e.g. 8.5
    pub total_hours: f64,
    pub status: ApprovalStatus,
    /// Reviewer user id, set on approve/reject
    pub approver_id: Option<i64>,
    pub approver_comment: Option<String>,
    /// RFC3339 timestamp of the approve/reject decision
    pub approved_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,

    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub tasks: Vec<TimesheetTask>,
}

/// Create daily timesheet payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTimesheetCreate {
    /// Omitted when an employee files their own sheet
    #[serde(default)]
    pub employee_id: Option<i64>,
    /// `YYYY-MM-DD`
    pub work_date: String,
    pub tasks: Vec<TimesheetTaskInput>,
}

/// Task entry as submitted; `task_id` is assigned server-side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimesheetTaskInput {
    pub description: String,
    /// `HH:MM`
    pub hours: String,
}

/// Update daily timesheet payload (only while status is REQUESTED)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTimesheetUpdate {
    pub tasks: Vec<TimesheetTaskInput>,
}

/// Weekly timesheet row, folded from daily sheets by the sync job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct WeeklyTimesheet {
    pub id: i64,
    pub employee_id: i64,
    /// Monday of the week, `YYYY-MM-DD`. Unique per employee.
    pub week_start: String,
    /// Sunday of the same week, `YYYY-MM-DD`
    pub week_end: String,
    /// Raw JSON array of the folded daily entries
    #[serde(skip_serializing)]
    pub entries_json: String,
    pub total_hours: f64,
    pub status: ApprovalStatus,
    pub approver_id: Option<i64>,
    pub approver_comment: Option<String>,
    pub approved_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,

    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub entries: Vec<WeeklyEntry>,
}

/// One day inside a weekly timesheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyEntry {
    /// `YYYY-MM-DD`
    pub work_date: String,
    pub total_hours: f64,
    pub tasks: Vec<TimesheetTask>,
}

/// Bulk approve/reject request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkApprovalRequest {
    pub ids: Vec<i64>,
    /// Target status, must be APPROVED or REJECTED
    pub status: ApprovalStatus,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Per-record outcome of a bulk approval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkApprovalOutcome {
    pub id: i64,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_round_trip() {
        let task = TimesheetTask {
            task_id: "TASK001".to_string(),
            description: "Code review".to_string(),
            hours: "02:30".to_string(),
        };
        let json = serde_json::to_string(&task).unwrap();
        let back: TimesheetTask = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn test_bulk_request_deserialize() {
        let json = r#"{"ids":[1,2,3],"status":"APPROVED","comment":"ok"}"#;
        let req: BulkApprovalRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.ids, vec![1, 2, 3]);
        assert_eq!(req.status, ApprovalStatus::Approved);
        assert_eq!(req.comment.as_deref(), Some("ok"));
    }

    #[test]
    fn test_bulk_outcome_skips_error_when_ok() {
        let outcome = BulkApprovalOutcome {
            id: 7,
            ok: true,
            error: None,
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(!json.contains("error"));
    }
}
