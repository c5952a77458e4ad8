//! Legal Entity Model
//!
//! Optional billing/contracting identity attached to an agreement.

use serde::{Deserialize, Serialize};

/// Legal entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LegalEntity {
    pub id: i64,
    pub name: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    #[serde(rename = "registrationNumber")]
    pub registration_number: Option<String>,
    #[serde(rename = "directorName")]
    pub director_name: Option<String>,
    #[serde(rename = "bankName")]
    pub bank_name: Option<String>,
    #[serde(rename = "bankIban")]
    pub bank_iban: Option<String>,
    pub created_at: i64,
}

/// Create legal entity payload (inline in agreement creation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalEntityCreate {
    pub name: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    #[serde(rename = "registrationNumber")]
    pub registration_number: Option<String>,
    #[serde(rename = "directorName")]
    pub director_name: Option<String>,
    #[serde(rename = "bankName")]
    pub bank_name: Option<String>,
    #[serde(rename = "bankIban")]
    pub bank_iban: Option<String>,
}
