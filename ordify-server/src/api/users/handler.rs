//! User API Handlers

use axum::{Json, extract::State};

use crate::core::ServerState;
use crate::db::repository::user;
use crate::utils::AppResult;
use shared::models::UserResponse;

/// GET /api/users - 获取所有后台用户（不含密码哈希）
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = user::find_all(&state.pool).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
