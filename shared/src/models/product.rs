//! Product Model (商品)

use serde::{Deserialize, Serialize};

/// Delivery channel for a product or an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryWay {
    Courier,
    Postal,
    Pickup,
}

/// Product entity. `quantity` is the authoritative stock count and is
/// only decremented through the atomic order-creation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub images: Vec<String>,
    pub quantity: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub quantity: i64,
}

/// Update product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub images: Option<Vec<String>>,
    pub quantity: Option<i64>,
}

/// One delivery option of a product (ordered list per product).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DeliveryOption {
    pub id: i64,
    #[serde(rename = "productId")]
    pub product_id: i64,
    #[serde(rename = "type")]
    pub option_type: DeliveryWay,
    pub price: f64,
    pub period: Option<String>,
    pub sort_order: i64,
}

/// Append delivery option payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryOptionCreate {
    #[serde(rename = "type")]
    pub option_type: DeliveryWay,
    #[serde(default)]
    pub price: f64,
    pub period: Option<String>,
}

/// Product with its delivery options (for list/detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    #[serde(rename = "deliveryOptions")]
    pub delivery_options: Vec<DeliveryOption>,
}
