//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::product;
use crate::utils::{AppError, AppResult};
use shared::models::{
    DeliveryOptionCreate, DeliveryWay, ProductCreate, ProductDetail, ProductUpdate,
};

/// GET /api/products - 获取所有商品（含配送方式，缺货的排在最后）
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<ProductDetail>>> {
    let products = product::find_all_detailed(&state.pool).await?;
    Ok(Json(products))
}

/// GET /api/products/:id - 获取单个商品（含配送方式）
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ProductDetail>> {
    let detail = product::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id} not found")))?;
    Ok(Json(detail))
}

/// POST /api/products - 创建商品（名称严格唯一）
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<ProductDetail>> {
    let detail = product::create(&state.pool, payload).await?;
    Ok(Json(detail))
}

/// PUT /api/products/:id - 部分更新（可直接设置库存数量）
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<ProductDetail>> {
    let detail = product::update(&state.pool, id, payload).await?;
    Ok(Json(detail))
}

/// DELETE /api/products/:id - 删除商品（订单级联删除）
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ProductDetail>> {
    let detail = product::delete(&state.pool, id).await?;
    Ok(Json(detail))
}

/// POST /api/products/:id/delivery-options - 追加一种配送方式
pub async fn add_delivery_option(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DeliveryOptionCreate>,
) -> AppResult<Json<ProductDetail>> {
    let detail = product::add_option(&state.pool, id, payload).await?;
    Ok(Json(detail))
}

/// DELETE /api/products/:id/delivery-options/:type - 移除该类型的全部配送方式
pub async fn remove_delivery_options(
    State(state): State<ServerState>,
    Path((id, option_type)): Path<(i64, DeliveryWay)>,
) -> AppResult<Json<ProductDetail>> {
    let detail = product::remove_options(&state.pool, id, option_type).await?;
    Ok(Json(detail))
}
