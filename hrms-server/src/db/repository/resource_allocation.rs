//! Resource Allocation Repository

use super::{RepoError, RepoResult};
use shared::models::{ResourceAllocation, ResourceAllocationCreate, ResourceAllocationUpdate};
use sqlx::SqlitePool;
use std::collections::HashMap;

const COLUMNS: &str = "id, project_id, customer_id, employee_id, allocation_role, start_date, end_date, is_active, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ResourceAllocation>> {
    let allocation = sqlx::query_as::<_, ResourceAllocation>(&format!(
        "SELECT {COLUMNS} FROM resource_allocations WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(allocation)
}

/// List allocations with display names populated
pub async fn find_all(
    pool: &SqlitePool,
    limit: i32,
    offset: i32,
) -> RepoResult<Vec<ResourceAllocation>> {
    let mut allocations = sqlx::query_as::<_, ResourceAllocation>(&format!(
        "SELECT {COLUMNS} FROM resource_allocations ORDER BY id DESC LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    populate_names(pool, &mut allocations).await?;
    Ok(allocations)
}

pub async fn find_by_employee(
    pool: &SqlitePool,
    employee_id: i64,
) -> RepoResult<Vec<ResourceAllocation>> {
    let mut allocations = sqlx::query_as::<_, ResourceAllocation>(&format!(
        "SELECT {COLUMNS} FROM resource_allocations WHERE employee_id = ? ORDER BY id DESC"
    ))
    .bind(employee_id)
    .fetch_all(pool)
    .await?;

    populate_names(pool, &mut allocations).await?;
    Ok(allocations)
}

pub async fn find_by_project(
    pool: &SqlitePool,
    project_id: i64,
) -> RepoResult<Vec<ResourceAllocation>> {
    let mut allocations = sqlx::query_as::<_, ResourceAllocation>(&format!(
        "SELECT {COLUMNS} FROM resource_allocations WHERE project_id = ? ORDER BY id DESC"
    ))
    .bind(project_id)
    .fetch_all(pool)
    .await?;

    populate_names(pool, &mut allocations).await?;
    Ok(allocations)
}

/// Insert a new allocation; `customer_id` is the owning customer of the
/// project, resolved by the caller. The UNIQUE triple turns a duplicate
/// assignment into `RepoError::Duplicate`.
pub async fn create(
    pool: &SqlitePool,
    data: &ResourceAllocationCreate,
    customer_id: i64,
) -> RepoResult<ResourceAllocation> {
    let now = shared::util::now_rfc3339();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO resource_allocations (project_id, customer_id, employee_id, allocation_role, start_date, end_date, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, 1, ?7, ?7) RETURNING id",
    )
    .bind(data.project_id)
    .bind(customer_id)
    .bind(data.employee_id)
    .bind(&data.allocation_role)
    .bind(&data.start_date)
    .bind(&data.end_date)
    .bind(&now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create allocation".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &ResourceAllocationUpdate,
) -> RepoResult<ResourceAllocation> {
    let now = shared::util::now_rfc3339();
    let rows = sqlx::query(
        "UPDATE resource_allocations SET allocation_role = COALESCE(?, allocation_role), start_date = COALESCE(?, start_date), end_date = COALESCE(?, end_date), is_active = COALESCE(?, is_active), updated_at = ? WHERE id = ?",
    )
    .bind(&data.allocation_role)
    .bind(&data.start_date)
    .bind(&data.end_date)
    .bind(data.is_active)
    .bind(&now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Allocation {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Allocation {id} not found")))
}

/// Allocations are deactivated, never deleted
pub async fn deactivate(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let now = shared::util::now_rfc3339();
    let rows =
        sqlx::query("UPDATE resource_allocations SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(id)
            .execute(pool)
            .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Allocation {id} not found")));
    }
    Ok(())
}

pub async fn count_active_by_employee(pool: &SqlitePool, employee_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM resource_allocations WHERE employee_id = ? AND is_active = 1",
    )
    .bind(employee_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn count_active_by_project(pool: &SqlitePool, project_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM resource_allocations WHERE project_id = ? AND is_active = 1",
    )
    .bind(project_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn count_active_by_customer(pool: &SqlitePool, customer_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM resource_allocations WHERE customer_id = ? AND is_active = 1",
    )
    .bind(customer_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

async fn populate_names(
    pool: &SqlitePool,
    allocations: &mut [ResourceAllocation],
) -> RepoResult<()> {
    if allocations.is_empty() {
        return Ok(());
    }
    let projects: HashMap<i64, String> = sqlx::query_as("SELECT id, name FROM projects")
        .fetch_all(pool)
        .await?
        .into_iter()
        .collect();
    let customers: HashMap<i64, String> = sqlx::query_as("SELECT id, name FROM customers")
        .fetch_all(pool)
        .await?
        .into_iter()
        .collect();
    let employees: HashMap<i64, String> =
        sqlx::query_as("SELECT id, first_name || ' ' || last_name FROM employees")
            .fetch_all(pool)
            .await?
            .into_iter()
            .collect();

    for a in allocations {
        a.project_name = projects.get(&a.project_id).cloned();
        a.customer_name = customers.get(&a.customer_id).cloned();
        a.employee_name = employees.get(&a.employee_id).cloned();
    }
    Ok(())
}
