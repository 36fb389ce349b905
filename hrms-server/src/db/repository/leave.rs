//! Leave Request Repository

use super::{RepoError, RepoResult};
use shared::models::{ApprovalStatus, LeaveRequest};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, employee_id, leave_type, start_date, end_date, day_count, reason, approvers_json, status, approver_id, approver_comment, approved_at, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<LeaveRequest>> {
    let req = sqlx::query_as::<_, LeaveRequest>(&format!(
        "SELECT {COLUMNS} FROM leave_requests WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(req)
}

pub async fn find_by_employee(
    pool: &SqlitePool,
    employee_id: i64,
    limit: i32,
    offset: i32,
) -> RepoResult<Vec<LeaveRequest>> {
    let reqs = sqlx::query_as::<_, LeaveRequest>(&format!(
        "SELECT {COLUMNS} FROM leave_requests WHERE employee_id = ? ORDER BY start_date DESC LIMIT ? OFFSET ?"
    ))
    .bind(employee_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(reqs)
}

pub async fn find_by_status(
    pool: &SqlitePool,
    status: ApprovalStatus,
    limit: i32,
    offset: i32,
) -> RepoResult<Vec<LeaveRequest>> {
    let reqs = sqlx::query_as::<_, LeaveRequest>(&format!(
        "SELECT {COLUMNS} FROM leave_requests WHERE status = ? ORDER BY start_date DESC LIMIT ? OFFSET ?"
    ))
    .bind(status.as_str())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(reqs)
}

pub async fn create(
    pool: &SqlitePool,
    employee_id: i64,
    leave_type: &str,
    start_date: &str,
    end_date: &str,
    day_count: f64,
    reason: &str,
    approvers_json: &str,
) -> RepoResult<LeaveRequest> {
    let now = shared::util::now_rfc3339();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO leave_requests (employee_id, leave_type, start_date, end_date, day_count, reason, approvers_json, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, 'REQUESTED', ?8, ?8) RETURNING id",
    )
    .bind(employee_id)
    .bind(leave_type)
    .bind(start_date)
    .bind(end_date)
    .bind(day_count)
    .bind(reason)
    .bind(approvers_json)
    .bind(&now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create leave request".into()))
}

/// Move a REQUESTED leave request to APPROVED or REJECTED
pub async fn set_status(
    pool: &SqlitePool,
    id: i64,
    status: ApprovalStatus,
    approver_id: i64,
    comment: Option<&str>,
) -> RepoResult<LeaveRequest> {
    let now = shared::util::now_rfc3339();
    let rows = sqlx::query(
        "UPDATE leave_requests SET status = ?1, approver_id = ?2, approver_comment = ?3, approved_at = ?4, updated_at = ?4 WHERE id = ?5 AND status = 'REQUESTED'",
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
            "Leave request {id} not found or already decided"
        )));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Leave request {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM leave_requests WHERE id = ? AND status = 'REQUESTED'")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Leave request {id} not found or already decided"
        )));
    }
    Ok(())
}
