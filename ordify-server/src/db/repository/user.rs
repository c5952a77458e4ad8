//! User Repository
//!
//! Staff accounts. Passwords arrive here already hashed (see
//! `auth::password`); the repository never sees a plaintext.

use super::{RepoError, RepoResult};
use shared::models::User;
use sqlx::SqlitePool;

const USER_SELECT: &str = "SELECT id, email, password_hash, is_activated, activation_link, created_at, updated_at FROM user";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let sql = format!("{USER_SELECT} ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE email = ? LIMIT 1");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Register a user. Emails are unique.
pub async fn create(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
    activation_link: &str,
) -> RepoResult<User> {
    if find_by_email(pool, email).await?.is_some() {
        return Err(RepoError::Duplicate("Already exists".into()));
    }

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO user (id, email, password_hash, is_activated, activation_link, created_at, updated_at) VALUES (?1, ?2, ?3, 0, ?4, ?5, ?5)",
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .bind(activation_link)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        err if err.is_duplicate() => RepoError::Duplicate("Already exists".into()),
        err => err,
    })?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Flip is_activated for the user owning this activation link.
/// Unknown links answer 400 "Incorrect activation link", not 404.
pub async fn activate(pool: &SqlitePool, activation_link: &str) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE user SET is_activated = 1, updated_at = ?1 WHERE activation_link = ?2",
    )
    .bind(now)
    .bind(activation_link)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Validation("Incorrect activation link".into()));
    }
    Ok(())
}
