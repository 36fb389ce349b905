//! Project model

use serde::{Deserialize, Serialize};

/// Project row, always owned by one customer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Project {
    pub id: i64,
    /// Unique project code, e.g. "PRJ-ACME-01"
    pub project_code: String,
    pub name: String,
    pub customer_id: i64,
    pub description: Option<String>,
    /// `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`
    pub end_date: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,

    /// Owning customer name, joined in list/detail reads
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub customer_name: Option<String>,
}

/// Create project payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCreate {
    pub project_code: String,
    pub name: String,
    pub customer_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Update project payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_active: Option<bool>,
}
