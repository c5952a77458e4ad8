//! Agreement Model
//!
//! A time-bounded authorization binding a customer to a reusable
//! order-creation token. At most one agreement per customer may be
//! active (is_active AND ends_at in the future) at any time.

use serde::{Deserialize, Serialize};

use super::{Customer, LegalEntity, LegalEntityCreate};

/// Agreement entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Agreement {
    pub id: i64,
    #[serde(rename = "customerId")]
    pub customer_id: i64,
    #[serde(rename = "legalEntityId")]
    pub legal_entity_id: Option<i64>,
    #[serde(rename = "clientToken")]
    pub client_token: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub created_at: i64,
    pub ends_at: i64,
}

/// Create agreement payload (repository-facing; the client token is
/// minted by the agreements API before this is built). An inline legal
/// entity is inserted in the same transaction and referenced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgreementCreate {
    pub customer_id: i64,
    pub client_token: String,
    pub ends_at: i64,
    pub legal_entity: Option<LegalEntityCreate>,
}

/// Update agreement payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgreementUpdate {
    pub ends_at: Option<i64>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

/// Agreement with customer and legal entity embedded (for detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgreementDetail {
    #[serde(flatten)]
    pub agreement: Agreement,
    pub customer: Customer,
    #[serde(rename = "legalEntity")]
    pub legal_entity: Option<LegalEntity>,
}
