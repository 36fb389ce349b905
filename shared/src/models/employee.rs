//! Employee Model

use serde::{Deserialize, Serialize};

/// Employee record
///
/// PII columns (`pan_enc`, `aadhaar_enc`, `bank_account_enc`, `pf_number_enc`)
/// hold AES-256-GCM envelopes and are never serialized. The plaintext
/// counterparts are populated by the service layer after decryption.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    /// Unique human-assigned code, e.g. "EMP042"
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    /// Unique work email
    pub email: String,
    pub phone: Option<String>,
    pub designation: Option<String>,
    pub department: Option<String>,
    /// Reporting manager (employee id)
    pub manager_id: Option<i64>,
    /// Reporting director (employee id)
    pub director_id: Option<i64>,
    /// Joining date, `YYYY-MM-DD`
    pub date_of_joining: String,
    /// Encrypted PAN envelope
    #[serde(skip_serializing)]
    pub pan_enc: Option<String>,
    /// Encrypted Aadhaar envelope
    #[serde(skip_serializing)]
    pub aadhaar_enc: Option<String>,
    /// Encrypted bank account envelope
    #[serde(skip_serializing)]
    pub bank_account_enc: Option<String>,
    /// Encrypted PF number envelope
    #[serde(skip_serializing)]
    pub pf_number_enc: Option<String>,
    pub is_active: bool,
    /// RFC3339 creation timestamp
    pub created_at: String,
    /// RFC3339 last-update timestamp
    pub updated_at: String,

    // Decrypted PII, populated by the service layer for authorized reads
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub pan: Option<String>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub aadhaar: Option<String>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub bank_account: Option<String>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub pf_number: Option<String>,
}

/// Create employee payload (plaintext PII, encrypted on write)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub manager_id: Option<i64>,
    #[serde(default)]
    pub director_id: Option<i64>,
    /// `YYYY-MM-DD`
    pub date_of_joining: String,
    #[serde(default)]
    pub pan: Option<String>,
    #[serde(default)]
    pub aadhaar: Option<String>,
    #[serde(default)]
    pub bank_account: Option<String>,
    #[serde(default)]
    pub pf_number: Option<String>,
}

/// Update employee payload, all fields optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub designation: Option<String>,
    pub department: Option<String>,
    pub manager_id: Option<i64>,
    pub director_id: Option<i64>,
    pub date_of_joining: Option<String>,
    pub pan: Option<String>,
    pub aadhaar: Option<String>,
    pub bank_account: Option<String>,
    pub pf_number: Option<String>,
    pub is_active: Option<bool>,
}

/// Compact employee listing row (no PII columns selected)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct EmployeeSummary {
    pub id: i64,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub designation: Option<String>,
    pub department: Option<String>,
    pub manager_id: Option<i64>,
    pub is_active: bool,
}
