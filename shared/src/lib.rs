//! Shared types for the Ordify back office
//!
//! Entity models exchanged between ordify-server and its clients,
//! plus id/time utilities. Database derives are feature-gated so the
//! models stay usable without pulling in sqlx.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
