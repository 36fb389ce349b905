//! Resource allocation model

use serde::{Deserialize, Serialize};

/// Assignment of an employee to a project
///
/// `customer_id` is denormalized from the project at creation time so the
/// triple (project, customer, employee) stays unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ResourceAllocation {
    pub id: i64,
    pub project_id: i64,
    pub customer_id: i64,
    pub employee_id: i64,
    /// Role on the project, e.g. "Developer", "QA"
    pub allocation_role: Option<String>,
    /// `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`, open-ended when absent
    pub end_date: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,

    // Joined display fields for list reads
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub project_name: Option<String>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub customer_name: Option<String>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub employee_name: Option<String>,
}

/// Create allocation payload; the customer is derived from the project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceAllocationCreate {
    pub project_id: i64,
    pub employee_id: i64,
    #[serde(default)]
    pub allocation_role: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Update allocation payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceAllocationUpdate {
    pub allocation_role: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_active: Option<bool>,
}
