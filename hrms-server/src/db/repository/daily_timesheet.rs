//! Daily Timesheet Repository

use super::{RepoError, RepoResult};
use shared::models::{ApprovalStatus, DailyTimesheet};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, employee_id, work_date, tasks_json, total_hours, status, approver_id, approver_comment, approved_at, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DailyTimesheet>> {
    let sheet = sqlx::query_as::<_, DailyTimesheet>(&format!(
        "SELECT {COLUMNS} FROM daily_timesheets WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(sheet)
}

pub async fn find_by_employee_and_date(
    pool: &SqlitePool,
    employee_id: i64,
    work_date: &str,
) -> RepoResult<Option<DailyTimesheet>> {
    let sheet = sqlx::query_as::<_, DailyTimesheet>(&format!(
        "SELECT {COLUMNS} FROM daily_timesheets WHERE employee_id = ? AND work_date = ?"
    ))
    .bind(employee_id)
    .bind(work_date)
    .fetch_optional(pool)
    .await?;
    Ok(sheet)
}

pub async fn find_by_employee(
    pool: &SqlitePool,
    employee_id: i64,
    limit: i32,
    offset: i32,
) -> RepoResult<Vec<DailyTimesheet>> {
    let sheets = sqlx::query_as::<_, DailyTimesheet>(&format!(
        "SELECT {COLUMNS} FROM daily_timesheets WHERE employee_id = ? ORDER BY work_date DESC LIMIT ? OFFSET ?"
    ))
    .bind(employee_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(sheets)
}

pub async fn find_by_status(
    pool: &SqlitePool,
    status: ApprovalStatus,
    limit: i32,
    offset: i32,
) -> RepoResult<Vec<DailyTimesheet>> {
    let sheets = sqlx::query_as::<_, DailyTimesheet>(&format!(
        "SELECT {COLUMNS} FROM daily_timesheets WHERE status = ? ORDER BY work_date DESC LIMIT ? OFFSET ?"
    ))
    .bind(status.as_str())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(sheets)
}

/// Approved sheets for one work date, consumed by the weekly sync job
pub async fn find_approved_for_date(
    pool: &SqlitePool,
    work_date: &str,
) -> RepoResult<Vec<DailyTimesheet>> {
    let sheets = sqlx::query_as::<_, DailyTimesheet>(&format!(
        "SELECT {COLUMNS} FROM daily_timesheets WHERE work_date = ? AND status = 'APPROVED' ORDER BY employee_id"
    ))
    .bind(work_date)
    .fetch_all(pool)
    .await?;
    Ok(sheets)
}

/// Insert a new sheet; the UNIQUE (employee_id, work_date) index turns a
/// duplicate submission into `RepoError::Duplicate`
pub async fn create(
    pool: &SqlitePool,
    employee_id: i64,
    work_date: &str,
    tasks_json: &str,
    total_hours: f64,
) -> RepoResult<DailyTimesheet> {
    let now = shared::util::now_rfc3339();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO daily_timesheets (employee_id, work_date, tasks_json, total_hours, status, created_at, updated_at) VALUES (?, ?, ?, ?, 'REQUESTED', ?5, ?5) RETURNING id",
    )
    .bind(employee_id)
    .bind(work_date)
    .bind(tasks_json)
    .bind(total_hours)
    .bind(&now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create daily timesheet".into()))
}

/// Replace the task list; only a REQUESTED sheet can change
pub async fn update_tasks(
    pool: &SqlitePool,
    id: i64,
    tasks_json: &str,
    total_hours: f64,
) -> RepoResult<DailyTimesheet> {
    let now = shared::util::now_rfc3339();
    let rows = sqlx::query(
        "UPDATE daily_timesheets SET tasks_json = ?, total_hours = ?, updated_at = ? WHERE id = ? AND status = 'REQUESTED'",
    )
    .bind(tasks_json)
    .bind(total_hours)
    .bind(&now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Timesheet {id} not found or already decided"
        )));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Timesheet {id} not found")))
}

/// Move a REQUESTED sheet to APPROVED or REJECTED
///
/// The status guard in the WHERE clause makes a lost race surface as zero
/// affected rows instead of a double decision.
pub async fn set_status(
    pool: &SqlitePool,
    id: i64,
    status: ApprovalStatus,
    approver_id: i64,
    comment: Option<&str>,
) -> RepoResult<DailyTimesheet> {
    let now = shared::util::now_rfc3339();
    let rows = sqlx::query(
        "UPDATE daily_timesheets SET status = ?1, approver_id = ?2, approver_comment = ?3, approved_at = ?4, updated_at = ?4 WHERE id = ?5 AND status = 'REQUESTED'",
    )
    .bind(status.as_str())
    .bind(approver_id)
    .bind(comment)
    .bind(&now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Timesheet {id} not found or already decided"
        )));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Timesheet {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM daily_timesheets WHERE id = ? AND status = 'REQUESTED'")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Timesheet {id} not found or already decided"
        )));
    }
    Ok(())
}
