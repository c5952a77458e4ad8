//! Refresh Token Repository
//!
//! One persisted refresh token per user. Refresh validates the JWT and
//! this row, so logout (which deletes the row) really revokes.

use super::RepoResult;
use sqlx::SqlitePool;

/// Store the user's refresh token, replacing any previous one.
pub async fn upsert(pool: &SqlitePool, user_id: i64, token: &str) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO refresh_token (user_id, token, updated_at) VALUES (?1, ?2, ?3) ON CONFLICT(user_id) DO UPDATE SET token = excluded.token, updated_at = excluded.updated_at",
    )
    .bind(user_id)
    .bind(token)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

/// Look up the owning user of a persisted refresh token.
pub async fn find_user_by_token(pool: &SqlitePool, token: &str) -> RepoResult<Option<i64>> {
    let user_id =
        sqlx::query_scalar::<_, i64>("SELECT user_id FROM refresh_token WHERE token = ? LIMIT 1")
            .bind(token)
            .fetch_optional(pool)
            .await?;
    Ok(user_id)
}

/// Drop a persisted refresh token. Returns whether one existed.
pub async fn delete_by_token(pool: &SqlitePool, token: &str) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM refresh_token WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
