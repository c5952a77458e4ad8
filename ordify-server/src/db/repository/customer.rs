//! Customer Repository
//!
//! `name` is the business key: create() upserts by name.

use super::{RepoError, RepoResult};
use shared::models::{Customer, CustomerCreate, CustomerUpdate};
use sqlx::SqlitePool;

const CUSTOMER_SELECT: &str = "SELECT id, name, street, city, state, zip, phone, contact_person, created_at, updated_at FROM customer";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Customer>> {
    let sql = format!("{CUSTOMER_SELECT} ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Customer>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Customer>> {
    let sql = format!("{CUSTOMER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Customer>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Customer>> {
    let sql = format!("{CUSTOMER_SELECT} WHERE name = ? LIMIT 1");
    let row = sqlx::query_as::<_, Customer>(&sql)
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Create a customer. An existing customer with the same name is updated
/// in place instead (last write wins for the provided fields).
pub async fn create(pool: &SqlitePool, data: CustomerCreate) -> RepoResult<Customer> {
    if let Some(existing) = find_by_name(pool, &data.name).await? {
        let patch = CustomerUpdate {
            name: None,
            street: data.street,
            city: data.city,
            state: data.state,
            zip: data.zip,
            phone: data.phone,
            contact_person: data.contact_person,
        };
        return update(pool, existing.id, patch).await;
    }

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO customer (id, name, street, city, state, zip, phone, contact_person, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.street)
    .bind(&data.city)
    .bind(&data.state)
    .bind(data.zip)
    .bind(&data.phone)
    .bind(&data.contact_person)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create customer".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CustomerUpdate) -> RepoResult<Customer> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE customer SET name = COALESCE(?1, name), street = COALESCE(?2, street), city = COALESCE(?3, city), state = COALESCE(?4, state), zip = COALESCE(?5, zip), phone = COALESCE(?6, phone), contact_person = COALESCE(?7, contact_person), updated_at = ?8 WHERE id = ?9",
    )
    .bind(&data.name)
    .bind(&data.street)
    .bind(&data.city)
    .bind(&data.state)
    .bind(data.zip)
    .bind(&data.phone)
    .bind(&data.contact_person)
    .bind(now)
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

/// Delete a customer and return the removed row. Orders and agreements
/// referencing it go away through ON DELETE CASCADE.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<Customer> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer {id} not found")))?;
    sqlx::query("DELETE FROM customer WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(existing)
}
