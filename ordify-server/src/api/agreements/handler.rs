//! Agreement API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::core::ServerState;
use crate::db::repository::agreement;
use crate::utils::{AppError, AppResult};
use shared::models::{
    Agreement, AgreementCreate, AgreementDetail, AgreementUpdate, LegalEntityCreate,
};

/// 默认协议期限：365 天
const DEFAULT_TERM_MS: i64 = 365 * 24 * 60 * 60 * 1000;

#[derive(Debug, Default, Deserialize)]
pub struct IssueRequest {
    pub ends_at: Option<i64>,
    #[serde(rename = "legalEntity")]
    pub legal_entity: Option<LegalEntityCreate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RenewRequest {
    pub ends_at: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreement: Option<Agreement>,
}

/// Mint a fresh client token: 32 random bytes, hex-encoded.
fn mint_client_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Issue an agreement: mint the token, apply the default term, run the
/// transactional check-and-insert. Shared with the combined order create.
pub(crate) async fn issue_agreement(
    pool: &SqlitePool,
    customer_id: i64,
    ends_at: Option<i64>,
    legal_entity: Option<LegalEntityCreate>,
) -> AppResult<Agreement> {
    let ends_at = ends_at.unwrap_or_else(|| shared::util::now_millis() + DEFAULT_TERM_MS);
    let agreement = agreement::issue(
        pool,
        AgreementCreate {
            customer_id,
            client_token: mint_client_token(),
            ends_at,
            legal_entity,
        },
    )
    .await?;
    tracing::info!(
        agreement_id = agreement.id,
        customer_id,
        "agreement issued"
    );
    Ok(agreement)
}

/// GET /api/agreements - 获取所有协议（含客户和法人实体）
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<AgreementDetail>>> {
    let agreements = agreement::find_all(&state.pool).await?;
    Ok(Json(agreements))
}

/// GET /api/agreements/:id - 获取单个协议
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AgreementDetail>> {
    let detail = agreement::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Agreement not found"))?;
    Ok(Json(detail))
}

/// GET /api/agreements/customer/:customerId - 客户当前生效的协议
pub async fn get_active_by_customer(
    State(state): State<ServerState>,
    Path(customer_id): Path<i64>,
) -> AppResult<Json<Agreement>> {
    let found = agreement::find_active_by_customer(&state.pool, customer_id)
        .await?
        .ok_or_else(|| AppError::not_found("No active agreement found for this customer"))?;
    Ok(Json(found))
}

/// GET /api/agreements/token/:token - 按令牌查找（不校验有效性）
pub async fn get_by_token(
    State(state): State<ServerState>,
    Path(token): Path<String>,
) -> AppResult<Json<Agreement>> {
    let found = agreement::find_by_token(&state.pool, &token)
        .await?
        .ok_or_else(|| AppError::not_found("Agreement not found"))?;
    Ok(Json(found))
}

/// GET /api/agreements/validate/:token - 校验令牌，总是 200
pub async fn validate(
    State(state): State<ServerState>,
    Path(token): Path<String>,
) -> AppResult<Json<ValidateResponse>> {
    let found = agreement::find_valid_by_token(&state.pool, &token).await?;
    Ok(Json(ValidateResponse {
        valid: found.is_some(),
        agreement: found,
    }))
}

/// POST /api/agreements/:customerId - 签订协议，返回 201
///
/// 响应里带有新生成的 clientToken，这是令牌唯一一次完整披露。
pub async fn create(
    State(state): State<ServerState>,
    Path(customer_id): Path<i64>,
    payload: Option<Json<IssueRequest>>,
) -> AppResult<(StatusCode, Json<Agreement>)> {
    let body = payload.map(|Json(b)| b).unwrap_or_default();
    let agreement =
        issue_agreement(&state.pool, customer_id, body.ends_at, body.legal_entity).await?;
    Ok((StatusCode::CREATED, Json(agreement)))
}

/// PUT /api/agreements/:id - 部分更新有效期/激活状态
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AgreementUpdate>,
) -> AppResult<Json<Agreement>> {
    let updated = agreement::update(&state.pool, id, payload).await?;
    Ok(Json(updated))
}

/// PATCH /api/agreements/:id/deactivate - 停用协议
pub async fn deactivate(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Agreement>> {
    let updated = agreement::deactivate(&state.pool, id).await?;
    Ok(Json(updated))
}

/// PATCH /api/agreements/:id/renew - 续签（重新激活 + 新有效期）
pub async fn renew(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    payload: Option<Json<RenewRequest>>,
) -> AppResult<Json<Agreement>> {
    let body = payload.map(|Json(b)| b).unwrap_or_default();
    let ends_at = body
        .ends_at
        .unwrap_or_else(|| shared::util::now_millis() + DEFAULT_TERM_MS);
    let renewed = agreement::renew(&state.pool, id, ends_at).await?;
    Ok(Json(renewed))
}

/// DELETE /api/agreements/:id - 删除协议（订单保留空引用）
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Agreement>> {
    let removed = agreement::delete(&state.pool, id).await?;
    Ok(Json(removed))
}
