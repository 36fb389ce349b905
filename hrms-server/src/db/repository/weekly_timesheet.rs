//! Weekly Timesheet Repository

use super::{RepoError, RepoResult};
use shared::models::{ApprovalStatus, WeeklyTimesheet};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, employee_id, week_start, week_end, entries_json, total_hours, status, approver_id, approver_comment, approved_at, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<WeeklyTimesheet>> {
    let sheet = sqlx::query_as::<_, WeeklyTimesheet>(&format!(
        "SELECT {COLUMNS} FROM weekly_timesheets WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(sheet)
}

pub async fn find_by_employee_and_week(
    pool: &SqlitePool,
    employee_id: i64,
    week_start: &str,
) -> RepoResult<Option<WeeklyTimesheet>> {
    let sheet = sqlx::query_as::<_, WeeklyTimesheet>(&format!(
        "SELECT {COLUMNS} FROM weekly_timesheets WHERE employee_id = ? AND week_start = ?"
    ))
    .bind(employee_id)
    .bind(week_start)
    .fetch_optional(pool)
    .await?;
    Ok(sheet)
}

pub async fn find_by_employee(
    pool: &SqlitePool,
    employee_id: i64,
    limit: i32,
    offset: i32,
) -> RepoResult<Vec<WeeklyTimesheet>> {
    let sheets = sqlx::query_as::<_, WeeklyTimesheet>(&format!(
        "SELECT {COLUMNS} FROM weekly_timesheets WHERE employee_id = ? ORDER BY week_start DESC LIMIT ? OFFSET ?"
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
) -> RepoResult<Vec<WeeklyTimesheet>> {
    let sheets = sqlx::query_as::<_, WeeklyTimesheet>(&format!(
        "SELECT {COLUMNS} FROM weekly_timesheets WHERE status = ? ORDER BY week_start DESC LIMIT ? OFFSET ?"
    ))
    .bind(status.as_str())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(sheets)
}

/// Create or refresh the weekly row for one employee and week
///
/// An already decided week is left untouched: the conflict branch only
/// fires while the row is still REQUESTED.
pub async fn upsert_week(
    pool: &SqlitePool,
    employee_id: i64,
    week_start: &str,
    week_end: &str,
    entries_json: &str,
    total_hours: f64,
) -> RepoResult<Option<WeeklyTimesheet>> {
    let now = shared::util::now_rfc3339();
    sqlx::query(
        "INSERT INTO weekly_timesheets (employee_id, week_start, week_end, entries_json, total_hours, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 'REQUESTED', ?6, ?6) ON CONFLICT (employee_id, week_start) DO UPDATE SET entries_json = excluded.entries_json, total_hours = excluded.total_hours, updated_at = excluded.updated_at WHERE weekly_timesheets.status = 'REQUESTED'",
    )
    .bind(employee_id)
    .bind(week_start)
    .bind(week_end)
    .bind(entries_json)
    .bind(total_hours)
    .bind(&now)
    .execute(pool)
    .await?;

    find_by_employee_and_week(pool, employee_id, week_start).await
}

/// Move a REQUESTED weekly sheet to APPROVED or REJECTED
pub async fn set_status(
    pool: &SqlitePool,
    id: i64,
    status: ApprovalStatus,
    approver_id: i64,
    comment: Option<&str>,
) -> RepoResult<WeeklyTimesheet> {
    let now = shared::util::now_rfc3339();
    let rows = sqlx::query(
        "UPDATE weekly_timesheets SET status = ?1, approver_id = ?2, approver_comment = ?3, approved_at = ?4, updated_at = ?4 WHERE id = ?5 AND status = 'REQUESTED'",
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
            "Weekly timesheet {id} not found or already decided"
        )));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Weekly timesheet {id} not found")))
}
