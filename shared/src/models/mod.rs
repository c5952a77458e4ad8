//! Data models
//!
//! Shared between ordify-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), all timestamps are
//! Unix milliseconds. Wire names follow the existing API: camelCase for
//! compound fields, `created_at` / `ends_at` kept as-is.

pub mod agreement;
pub mod customer;
pub mod legal_entity;
pub mod order;
pub mod product;
pub mod user;

// Re-exports
pub use agreement::*;
pub use customer::*;
pub use legal_entity::*;
pub use order::*;
pub use product::*;
pub use user::*;
