//! User Model (staff authentication principal)

use serde::{Deserialize, Serialize};

/// Staff user row. Never serialized to clients directly; responses go
/// through [`UserResponse`] so the hash stays server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub is_activated: bool,
    pub activation_link: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Client-facing view of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    #[serde(rename = "isActivated")]
    pub is_activated: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_activated: user.is_activated,
        }
    }
}
