//! Statistics API Handlers

use axum::{Json, extract::State};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::repository::statistics;
use crate::utils::AppResult;

/// One dashboard metric. Counts serialize as integers, money as a float
/// flagged with `isCurrencyValue` so the frontend can format it.
#[derive(Debug, Serialize)]
pub struct Metric {
    pub name: &'static str,
    pub value: MetricValue,
    #[serde(rename = "isCurrencyValue", skip_serializing_if = "Option::is_none")]
    pub is_currency_value: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(i64),
    Currency(f64),
}

/// GET /api/statistics/main - 主面板统计（实时 COUNT/SUM，固定顺序）
pub async fn main_statistics(State(state): State<ServerState>) -> AppResult<Json<Vec<Metric>>> {
    let totals = statistics::totals(&state.pool).await?;

    Ok(Json(vec![
        Metric {
            name: "Products",
            value: MetricValue::Count(totals.products),
            is_currency_value: None,
        },
        Metric {
            name: "Customers",
            value: MetricValue::Count(totals.customers),
            is_currency_value: None,
        },
        Metric {
            name: "Orders",
            value: MetricValue::Count(totals.orders),
            is_currency_value: None,
        },
        Metric {
            name: "Total orders price",
            value: MetricValue::Currency(totals.orders_price),
            is_currency_value: Some(true),
        },
    ]))
}
