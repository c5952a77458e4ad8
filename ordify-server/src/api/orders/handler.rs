//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::api::agreements::issue_agreement;
use crate::core::ServerState;
use crate::db::repository::{agreement, order};
use crate::utils::{AppError, AppResult};
use shared::models::{
    Agreement, DeliveryWay, LegalEntityCreate, Order, OrderCreate, OrderDetail, OrderUpdate,
};

/// Order request body. A missing `price` means "product price × quantity";
/// a supplied one is stored as-is (negotiated pricing).
#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub quantity: i64,
    pub price: Option<f64>,
    #[serde(rename = "deliveryWay")]
    pub delivery_way: Option<DeliveryWay>,
}

/// Optional agreement parameters for the combined create.
#[derive(Debug, Default, Deserialize)]
pub struct AgreementOptions {
    pub ends_at: Option<i64>,
    #[serde(rename = "legalEntity")]
    pub legal_entity: Option<LegalEntityCreate>,
}

#[derive(Debug, Deserialize)]
pub struct OrderWithAgreementRequest {
    pub quantity: i64,
    pub price: Option<f64>,
    #[serde(rename = "deliveryWay")]
    pub delivery_way: Option<DeliveryWay>,
    pub agreement: Option<AgreementOptions>,
}

/// Combined create response: the order plus the freshly issued agreement.
/// This is the only place the client token is disclosed alongside an order.
#[derive(Debug, Serialize)]
pub struct OrderWithAgreement {
    pub order: OrderDetail,
    pub agreement: Agreement,
}

/// GET /api/orders - 获取所有订单（含商品和客户）
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<OrderDetail>>> {
    let orders = order::find_all(&state.pool).await?;
    Ok(Json(orders))
}

/// GET /api/orders/:id - 获取单个订单（含商品和客户）
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let order = order::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;
    Ok(Json(order))
}

/// POST /api/orders/:customerId/:productId - 下单
///
/// 扣减库存和写入订单在同一个事务里完成。
pub async fn create(
    State(state): State<ServerState>,
    Path((customer_id, product_id)): Path<(i64, i64)>,
    Json(payload): Json<OrderRequest>,
) -> AppResult<Json<OrderDetail>> {
    let created = order::create(
        &state.pool,
        OrderCreate {
            product_id,
            customer_id,
            agreement_id: None,
            quantity: payload.quantity,
            price: payload.price,
            delivery_way: payload.delivery_way,
        },
    )
    .await?;
    Ok(Json(created))
}

/// POST /api/orders/agreement/:customerId/:productId - 下单并签订协议
///
/// 先签协议（客户已有有效协议则 400），再按协议下单。
pub async fn create_with_agreement(
    State(state): State<ServerState>,
    Path((customer_id, product_id)): Path<(i64, i64)>,
    Json(payload): Json<OrderWithAgreementRequest>,
) -> AppResult<Json<OrderWithAgreement>> {
    let opts = payload.agreement.unwrap_or_default();
    let agreement = issue_agreement(&state.pool, customer_id, opts.ends_at, opts.legal_entity).await?;

    let created = order::create(
        &state.pool,
        OrderCreate {
            product_id,
            customer_id,
            agreement_id: Some(agreement.id),
            quantity: payload.quantity,
            price: payload.price,
            delivery_way: payload.delivery_way,
        },
    )
    .await?;

    Ok(Json(OrderWithAgreement {
        order: created,
        agreement,
    }))
}

/// POST /api/orders/token/:token/:productId - 凭客户端令牌下单
///
/// 客户身份以令牌解析出的协议为准。
pub async fn create_by_token(
    State(state): State<ServerState>,
    Path((token, product_id)): Path<(String, i64)>,
    Json(payload): Json<OrderRequest>,
) -> AppResult<Json<OrderDetail>> {
    let agreement = agreement::find_valid_by_token(&state.pool, &token)
        .await?
        .ok_or_else(|| AppError::validation("Invalid or expired client token"))?;

    let created = order::create(
        &state.pool,
        OrderCreate {
            product_id,
            customer_id: agreement.customer_id,
            agreement_id: Some(agreement.id),
            quantity: payload.quantity,
            price: payload.price,
            delivery_way: payload.delivery_way,
        },
    )
    .await?;
    Ok(Json(created))
}

/// PATCH /api/orders/:id - 部分更新（状态机校验见订单仓储）
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderUpdate>,
) -> AppResult<Json<OrderDetail>> {
    let updated = order::update(&state.pool, id, payload).await?;
    Ok(Json(updated))
}

/// DELETE /api/orders/:id - 删除订单（不恢复库存）
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let removed = order::delete(&state.pool, id).await?;
    Ok(Json(removed))
}
