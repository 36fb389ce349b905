//! Employee Document Repository

use super::{RepoError, RepoResult};
use shared::models::{ApprovalStatus, EmployeeDocument};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, employee_id, document_type, file_name, stored_name, content_type, file_size, status, approver_id, approver_comment, approved_at, uploaded_by, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<EmployeeDocument>> {
    let doc = sqlx::query_as::<_, EmployeeDocument>(&format!(
        "SELECT {COLUMNS} FROM employee_documents WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(doc)
}

pub async fn find_by_employee(
    pool: &SqlitePool,
    employee_id: i64,
) -> RepoResult<Vec<EmployeeDocument>> {
    let docs = sqlx::query_as::<_, EmployeeDocument>(&format!(
        "SELECT {COLUMNS} FROM employee_documents WHERE employee_id = ? ORDER BY id DESC"
    ))
    .bind(employee_id)
    .fetch_all(pool)
    .await?;
    Ok(docs)
}

pub async fn create(
    pool: &SqlitePool,
    employee_id: i64,
    document_type: &str,
    file_name: &str,
    stored_name: &str,
    content_type: &str,
    file_size: i64,
    uploaded_by: i64,
) -> RepoResult<EmployeeDocument> {
    let now = shared::util::now_rfc3339();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO employee_documents (employee_id, document_type, file_name, stored_name, content_type, file_size, status, uploaded_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, 'REQUESTED', ?, ?8, ?8) RETURNING id",
    )
    .bind(employee_id)
    .bind(document_type)
    .bind(file_name)
    .bind(stored_name)
    .bind(content_type)
    .bind(file_size)
    .bind(uploaded_by)
    .bind(&now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create document record".into()))
}

/// Move a REQUESTED document to APPROVED or REJECTED
pub async fn set_status(
    pool: &SqlitePool,
    id: i64,
    status: ApprovalStatus,
    approver_id: i64,
    comment: Option<&str>,
) -> RepoResult<EmployeeDocument> {
    let now = shared::util::now_rfc3339();
    let rows = sqlx::query(
        "UPDATE employee_documents SET status = ?1, approver_id = ?2, approver_comment = ?3, approved_at = ?4, updated_at = ?4 WHERE id = ?5 AND status = 'REQUESTED'",
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
            "Document {id} not found or already reviewed"
        )));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Document {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM employee_documents WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Document {id} not found")));
    }
    Ok(())
}
