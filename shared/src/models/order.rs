//! Order Model (订单)

use serde::{Deserialize, Serialize};

use super::{Customer, DeliveryWay, Product};

/// Order lifecycle status.
///
/// Valid transitions: pending → processing → completed, and
/// pending|processing → cancelled. completed/cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Whether `next` is a legal transition from `self`.
    /// Repeating the current status is a no-op and always allowed.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (a, b) if a == b => true,
            (Pending, Processing) | (Processing, Completed) => true,
            (Pending, Cancelled) | (Processing, Cancelled) => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

/// Order entity. References are plain ids; detail views embed the
/// joined product/customer explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    #[serde(rename = "productId")]
    pub product_id: i64,
    #[serde(rename = "customerId")]
    pub customer_id: i64,
    #[serde(rename = "agreementId")]
    pub agreement_id: Option<i64>,
    pub quantity: i64,
    pub price: f64,
    #[serde(rename = "deliveryWay")]
    pub delivery_way: Option<DeliveryWay>,
    #[serde(rename = "paymentStatus")]
    pub payment_status: PaymentStatus,
    #[serde(rename = "paymentIntentId")]
    pub payment_intent_id: Option<String>,
    #[serde(rename = "paidAt")]
    pub paid_at: Option<i64>,
    pub status: OrderStatus,
    #[serde(rename = "completedAt")]
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create order payload (repository-facing; the HTTP body is validated
/// and resolved into this by the orders API). A `None` price means
/// "derive product.price × quantity" at insert time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub product_id: i64,
    pub customer_id: i64,
    pub agreement_id: Option<i64>,
    pub quantity: i64,
    pub price: Option<f64>,
    pub delivery_way: Option<DeliveryWay>,
}

/// Update order payload (partial status/payment fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub quantity: Option<i64>,
    pub price: Option<f64>,
    #[serde(rename = "deliveryWay")]
    pub delivery_way: Option<DeliveryWay>,
    #[serde(rename = "paymentStatus")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(rename = "paymentIntentId")]
    pub payment_intent_id: Option<String>,
    #[serde(rename = "paidAt")]
    pub paid_at: Option<i64>,
    pub status: Option<OrderStatus>,
}

/// Order with product and customer embedded (for list/detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub product: Product,
    pub customer: Customer,
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::*;

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Cancelled));
    }

    #[test]
    fn repeating_the_current_status_is_a_noop() {
        assert!(Pending.can_transition_to(Pending));
        assert!(Completed.can_transition_to(Completed));
    }

    #[test]
    fn backward_and_terminal_transitions_are_rejected() {
        assert!(!Processing.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Processing));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Completed));
    }
}
