//! Customer Repository

use super::{RepoError, RepoResult};
use shared::models::{Customer, CustomerCreate, CustomerUpdate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, contact_person, contact_email, contact_phone, address, is_active, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Customer>> {
    let customer =
        sqlx::query_as::<_, Customer>(&format!("SELECT {COLUMNS} FROM customers WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(customer)
}

pub async fn find_all(pool: &SqlitePool, limit: i32, offset: i32) -> RepoResult<Vec<Customer>> {
    let customers = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {COLUMNS} FROM customers ORDER BY name LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(customers)
}

pub async fn create(pool: &SqlitePool, data: &CustomerCreate) -> RepoResult<Customer> {
    let now = shared::util::now_rfc3339();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO customers (name, contact_person, contact_email, contact_phone, address, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, 1, ?6, ?6) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.contact_person)
    .bind(&data.contact_email)
    .bind(&data.contact_phone)
    .bind(&data.address)
    .bind(&now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create customer".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &CustomerUpdate) -> RepoResult<Customer> {
    let now = shared::util::now_rfc3339();
    let rows = sqlx::query(
        "UPDATE customers SET name = COALESCE(?, name), contact_person = COALESCE(?, contact_person), contact_email = COALESCE(?, contact_email), contact_phone = COALESCE(?, contact_phone), address = COALESCE(?, address), is_active = COALESCE(?, is_active), updated_at = ? WHERE id = ?",
    )
    .bind(&data.name)
    .bind(&data.contact_person)
    .bind(&data.contact_email)
    .bind(&data.contact_phone)
    .bind(&data.address)
    .bind(data.is_active)
    .bind(&now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Customer {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM customers WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Customer {id} not found")));
    }
    Ok(())
}
