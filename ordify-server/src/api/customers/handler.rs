//! Customer API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::customer;
use crate::utils::{AppError, AppResult};
use shared::models::{Customer, CustomerCreate, CustomerUpdate};

/// GET /api/customers - 获取所有客户
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Customer>>> {
    let customers = customer::find_all(&state.pool).await?;
    Ok(Json(customers))
}

/// GET /api/customers/:id - 获取单个客户
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Customer>> {
    let customer = customer::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {id} not found")))?;
    Ok(Json(customer))
}

/// POST /api/customers - 创建客户
///
/// 同名客户已存在时按最新数据合并更新 (upsert-by-name)。
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CustomerCreate>,
) -> AppResult<Json<Customer>> {
    let customer = customer::create(&state.pool, payload).await?;
    Ok(Json(customer))
}

/// PUT /api/customers/:id - 部分更新客户
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerUpdate>,
) -> AppResult<Json<Customer>> {
    let customer = customer::update(&state.pool, id, payload).await?;
    Ok(Json(customer))
}

/// DELETE /api/customers/:id - 删除客户（订单和协议级联删除）
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Customer>> {
    let customer = customer::delete(&state.pool, id).await?;
    Ok(Json(customer))
}
