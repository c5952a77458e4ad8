//! Customer Model

use serde::{Deserialize, Serialize};

/// Customer entity. `name` is the unique business key: create is an
/// upsert-by-name (see the customer repository).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<i64>,
    pub phone: Option<String>,
    #[serde(rename = "contactPerson")]
    pub contact_person: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create customer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreate {
    pub name: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<i64>,
    pub phone: Option<String>,
    #[serde(rename = "contactPerson")]
    pub contact_person: Option<String>,
}

/// Update customer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<i64>,
    pub phone: Option<String>,
    #[serde(rename = "contactPerson")]
    pub contact_person: Option<String>,
}
