//! Leave request model

use super::status::ApprovalStatus;
use serde::{Deserialize, Serialize};

/// Leave request row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LeaveRequest {
    pub id: i64,
    pub employee_id: i64,
    /// Free-form type, e.g. "CASUAL", "SICK", "EARNED"
    pub leave_type: String,
    /// `YYYY-MM-DD`, inclusive
    pub start_date: String,
    /// `YYYY-MM-DD`, inclusive
    pub end_date: String,
    /// Number of working days requested; supports half days (0.5 steps)
    pub day_count: f64,
    pub reason: String,
    /// Raw JSON array of approver user ids as stored
    #[serde(skip_serializing)]
    pub approvers_json: String,
    pub status: ApprovalStatus,
    pub approver_id: Option<i64>,
    pub approver_comment: Option<String>,
    pub approved_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,

    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub approvers: Vec<i64>,
}

/// Create leave request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequestCreate {
    /// Omitted when an employee files their own request
    #[serde(default)]
    pub employee_id: Option<i64>,
    pub leave_type: String,
    pub start_date: String,
    pub end_date: String,
    /// Computed from the date range when omitted
    #[serde(default)]
    pub day_count: Option<f64>,
    pub reason: String,
    /// Approver user ids to notify
    #[serde(default)]
    pub approvers: Vec<i64>,
}
