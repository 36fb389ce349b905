//! Project Repository

use super::{RepoError, RepoResult};
use shared::models::{Project, ProjectCreate, ProjectUpdate};
use sqlx::SqlitePool;
use std::collections::HashMap;

const COLUMNS: &str = "id, project_code, name, customer_id, description, start_date, end_date, is_active, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Project>> {
    let project =
        sqlx::query_as::<_, Project>(&format!("SELECT {COLUMNS} FROM projects WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(project)
}

/// List projects with the owning customer name populated
pub async fn find_all(pool: &SqlitePool, limit: i32, offset: i32) -> RepoResult<Vec<Project>> {
    let mut projects = sqlx::query_as::<_, Project>(&format!(
        "SELECT {COLUMNS} FROM projects ORDER BY project_code LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let names = customer_names(pool).await?;
    for p in &mut projects {
        p.customer_name = names.get(&p.customer_id).cloned();
    }
    Ok(projects)
}

pub async fn find_by_customer(pool: &SqlitePool, customer_id: i64) -> RepoResult<Vec<Project>> {
    let mut projects = sqlx::query_as::<_, Project>(&format!(
        "SELECT {COLUMNS} FROM projects WHERE customer_id = ? ORDER BY project_code"
    ))
    .bind(customer_id)
    .fetch_all(pool)
    .await?;

    let names = customer_names(pool).await?;
    for p in &mut projects {
        p.customer_name = names.get(&p.customer_id).cloned();
    }
    Ok(projects)
}

pub async fn count_by_customer(pool: &SqlitePool, customer_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE customer_id = ?")
        .bind(customer_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn create(pool: &SqlitePool, data: &ProjectCreate) -> RepoResult<Project> {
    let now = shared::util::now_rfc3339();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO projects (project_code, name, customer_id, description, start_date, end_date, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, 1, ?7, ?7) RETURNING id",
    )
    .bind(&data.project_code)
    .bind(&data.name)
    .bind(data.customer_id)
    .bind(&data.description)
    .bind(&data.start_date)
    .bind(&data.end_date)
    .bind(&now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create project".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &ProjectUpdate) -> RepoResult<Project> {
    let now = shared::util::now_rfc3339();
    let rows = sqlx::query(
        "UPDATE projects SET name = COALESCE(?, name), description = COALESCE(?, description), start_date = COALESCE(?, start_date), end_date = COALESCE(?, end_date), is_active = COALESCE(?, is_active), updated_at = ? WHERE id = ?",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.start_date)
    .bind(&data.end_date)
    .bind(data.is_active)
    .bind(&now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Project {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Project {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Project {id} not found")));
    }
    Ok(())
}

async fn customer_names(pool: &SqlitePool) -> RepoResult<HashMap<i64, String>> {
    let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM customers")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().collect())
}
