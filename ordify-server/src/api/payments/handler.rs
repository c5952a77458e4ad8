//! Payment API Handlers
//!
//! 字段缺失检查放在 handler 里做，错误信息与前端约定一致
//! ("Invalid amount"、"Payment intent ID is required" 等)。

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::order;
use crate::services::{PaymentIntent, PaymentOutcome};
use crate::utils::{AppError, AppResult};
use shared::models::{Order, PaymentStatus};

#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    pub amount: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CardDetails {
    #[serde(rename = "cardNumber")]
    pub card_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    #[serde(rename = "paymentIntentId")]
    pub payment_intent_id: Option<String>,
    #[serde(rename = "cardDetails")]
    pub card_details: Option<CardDetails>,
}

#[derive(Debug, Deserialize)]
pub struct PayOrderRequest {
    #[serde(rename = "orderId")]
    pub order_id: Option<i64>,
    #[serde(rename = "cardDetails")]
    pub card_details: Option<CardDetails>,
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub success: bool,
    #[serde(rename = "paymentIntentId")]
    pub payment_intent_id: String,
    pub status: &'static str,
    #[serde(rename = "paidAt")]
    pub paid_at: i64,
}

#[derive(Debug, Serialize)]
pub struct PaymentInfo {
    #[serde(rename = "paymentIntentId")]
    pub payment_intent_id: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PayOrderResponse {
    pub success: bool,
    pub order: Order,
    pub payment: PaymentInfo,
}

#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    #[serde(rename = "orderId")]
    pub order_id: i64,
    #[serde(rename = "paymentStatus")]
    pub payment_status: PaymentStatus,
    #[serde(rename = "paymentIntentId", skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    #[serde(rename = "paidAt", skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<i64>,
}

/// POST /api/payments/create-intent - 创建支付意向
pub async fn create_intent(
    State(state): State<ServerState>,
    Json(payload): Json<CreateIntentRequest>,
) -> AppResult<Json<PaymentIntent>> {
    let amount = payload
        .amount
        .filter(|a| *a > 0.0)
        .ok_or_else(|| AppError::validation("Invalid amount"))?;
    let currency = payload.currency.unwrap_or_else(|| "usd".into());

    let intent = state
        .payment_service
        .create_payment_intent(amount, &currency)
        .await;
    Ok(Json(intent))
}

/// POST /api/payments/confirm - 确认支付（按测试卡表判定）
pub async fn confirm(
    State(state): State<ServerState>,
    Json(payload): Json<ConfirmRequest>,
) -> AppResult<Json<ConfirmResponse>> {
    let payment_intent_id = payload
        .payment_intent_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::validation("Payment intent ID is required"))?;
    let card_number = required_card_number(payload.card_details)?;

    let confirmation = state
        .payment_service
        .confirm_payment(&payment_intent_id, &card_number)
        .await;

    match confirmation.outcome {
        PaymentOutcome::Succeeded { paid_at } => Ok(Json(ConfirmResponse {
            success: true,
            payment_intent_id: confirmation.payment_intent_id,
            status: "succeeded",
            paid_at,
        })),
        PaymentOutcome::Failed { error } => {
            Err(AppError::validation(format!("Payment failed: {error}")))
        }
    }
}

/// POST /api/payments/pay-order - 一次请求完成下单金额的创建和确认
///
/// 失败时把订单标记为支付失败再返回 400，成功时落盘支付信息。
pub async fn pay_order(
    State(state): State<ServerState>,
    Json(payload): Json<PayOrderRequest>,
) -> AppResult<Json<PayOrderResponse>> {
    let order_id = payload
        .order_id
        .ok_or_else(|| AppError::validation("Order ID is required"))?;
    let card_number = required_card_number(payload.card_details)?;

    let existing = order::find_order_by_id(&state.pool, order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    let intent = state
        .payment_service
        .create_payment_intent(existing.price, "usd")
        .await;
    let confirmation = state
        .payment_service
        .confirm_payment(&intent.payment_intent_id, &card_number)
        .await;

    match confirmation.outcome {
        PaymentOutcome::Succeeded { .. } => {
            let updated =
                order::mark_paid(&state.pool, order_id, &intent.payment_intent_id).await?;
            tracing::info!(order_id, intent = %intent.payment_intent_id, "order paid");
            Ok(Json(PayOrderResponse {
                success: true,
                order: updated,
                payment: PaymentInfo {
                    payment_intent_id: intent.payment_intent_id,
                    status: "succeeded",
                },
            }))
        }
        PaymentOutcome::Failed { error } => {
            order::mark_payment_failed(&state.pool, order_id).await?;
            tracing::warn!(order_id, %error, "order payment failed");
            Err(AppError::validation(format!("Payment failed: {error}")))
        }
    }
}

/// GET /api/payments/status/:orderId - 订单的支付状态（读订单行）
pub async fn status(
    State(state): State<ServerState>,
    Path(order_id): Path<i64>,
) -> AppResult<Json<PaymentStatusResponse>> {
    let order = order::find_order_by_id(&state.pool, order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    Ok(Json(PaymentStatusResponse {
        order_id: order.id,
        payment_status: order.payment_status,
        payment_intent_id: order.payment_intent_id,
        paid_at: order.paid_at,
    }))
}

// 空字符串视为缺失，与前端的 falsy 判断一致
fn required_card_number(details: Option<CardDetails>) -> AppResult<String> {
    details
        .and_then(|c| c.card_number)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::validation("Card details are required"))
}
