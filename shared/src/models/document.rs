//! Employee document model

use super::status::ApprovalStatus;
use serde::{Deserialize, Serialize};

/// Uploaded employee document awaiting HR review
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct EmployeeDocument {
    pub id: i64,
    pub employee_id: i64,
    /// Category, e.g. "ID_PROOF", "OFFER_LETTER", "CERTIFICATE"
    pub document_type: String,
    /// Original filename as uploaded
    pub file_name: String,
    /// Server-side storage name (uuid + extension)
    #[serde(skip_serializing)]
    pub stored_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub status: ApprovalStatus,
    pub approver_id: Option<i64>,
    pub approver_comment: Option<String>,
    pub approved_at: Option<String>,
    pub uploaded_by: i64,
    pub created_at: String,
    pub updated_at: String,
}
