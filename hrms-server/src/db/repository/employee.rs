//! Employee Repository

use super::{RepoError, RepoResult};
use shared::models::{Employee, EmployeeCreate, EmployeeSummary, EmployeeUpdate};
use sqlx::SqlitePool;

/// PII column values after encryption, produced by the crypto service
#[derive(Debug, Default, Clone)]
pub struct EncryptedPii {
    pub pan_enc: Option<String>,
    pub aadhaar_enc: Option<String>,
    pub bank_account_enc: Option<String>,
    pub pf_number_enc: Option<String>,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Employee>> {
    let employee = sqlx::query_as::<_, Employee>(
        "SELECT id, employee_code, first_name, last_name, email, phone, designation, department, manager_id, director_id, date_of_joining, pan_enc, aadhaar_enc, bank_account_enc, pf_number_enc, is_active, created_at, updated_at FROM employees WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(employee)
}

pub async fn find_by_code(pool: &SqlitePool, code: &str) -> RepoResult<Option<Employee>> {
    let employee = sqlx::query_as::<_, Employee>(
        "SELECT id, employee_code, first_name, last_name, email, phone, designation, department, manager_id, director_id, date_of_joining, pan_enc, aadhaar_enc, bank_account_enc, pf_number_enc, is_active, created_at, updated_at FROM employees WHERE employee_code = ?",
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;
    Ok(employee)
}

/// List employees without PII columns
pub async fn find_all(
    pool: &SqlitePool,
    include_inactive: bool,
    limit: i32,
    offset: i32,
) -> RepoResult<Vec<EmployeeSummary>> {
    let sql = if include_inactive {
        "SELECT id, employee_code, first_name, last_name, email, designation, department, manager_id, is_active FROM employees ORDER BY employee_code LIMIT ? OFFSET ?"
    } else {
        "SELECT id, employee_code, first_name, last_name, email, designation, department, manager_id, is_active FROM employees WHERE is_active = 1 ORDER BY employee_code LIMIT ? OFFSET ?"
    };
    let employees = sqlx::query_as::<_, EmployeeSummary>(sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(employees)
}

/// Direct reports of a manager, used for manager-scoped listings
pub async fn find_by_manager(pool: &SqlitePool, manager_id: i64) -> RepoResult<Vec<EmployeeSummary>> {
    let employees = sqlx::query_as::<_, EmployeeSummary>(
        "SELECT id, employee_code, first_name, last_name, email, designation, department, manager_id, is_active FROM employees WHERE manager_id = ? AND is_active = 1 ORDER BY employee_code",
    )
    .bind(manager_id)
    .fetch_all(pool)
    .await?;
    Ok(employees)
}

pub async fn create(
    pool: &SqlitePool,
    data: &EmployeeCreate,
    pii: EncryptedPii,
) -> RepoResult<Employee> {
    let now = shared::util::now_rfc3339();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO employees (employee_code, first_name, last_name, email, phone, designation, department, manager_id, director_id, date_of_joining, pan_enc, aadhaar_enc, bank_account_enc, pf_number_enc, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?15, ?15) RETURNING id",
    )
    .bind(&data.employee_code)
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.designation)
    .bind(&data.department)
    .bind(data.manager_id)
    .bind(data.director_id)
    .bind(&data.date_of_joining)
    .bind(&pii.pan_enc)
    .bind(&pii.aadhaar_enc)
    .bind(&pii.bank_account_enc)
    .bind(&pii.pf_number_enc)
    .bind(&now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create employee".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &EmployeeUpdate,
    pii: EncryptedPii,
) -> RepoResult<Employee> {
    let now = shared::util::now_rfc3339();
    let rows = sqlx::query(
        "UPDATE employees SET first_name = COALESCE(?, first_name), last_name = COALESCE(?, last_name), email = COALESCE(?, email), phone = COALESCE(?, phone), designation = COALESCE(?, designation), department = COALESCE(?, department), manager_id = COALESCE(?, manager_id), director_id = COALESCE(?, director_id), date_of_joining = COALESCE(?, date_of_joining), pan_enc = COALESCE(?, pan_enc), aadhaar_enc = COALESCE(?, aadhaar_enc), bank_account_enc = COALESCE(?, bank_account_enc), pf_number_enc = COALESCE(?, pf_number_enc), is_active = COALESCE(?, is_active), updated_at = ? WHERE id = ?",
    )
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.designation)
    .bind(&data.department)
    .bind(data.manager_id)
    .bind(data.director_id)
    .bind(&data.date_of_joining)
    .bind(&pii.pan_enc)
    .bind(&pii.aadhaar_enc)
    .bind(&pii.bank_account_enc)
    .bind(&pii.pf_number_enc)
    .bind(data.is_active)
    .bind(&now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Employee {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))
}

pub async fn set_active(pool: &SqlitePool, id: i64, active: bool) -> RepoResult<()> {
    let now = shared::util::now_rfc3339();
    let rows = sqlx::query("UPDATE employees SET is_active = ?, updated_at = ? WHERE id = ?")
        .bind(active)
        .bind(&now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Employee {id} not found")));
    }
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Employee {id} not found")));
    }
    Ok(())
}
