//! Authentication
//!
//! JWT token pairs (access + refresh), argon2 password hashing, the
//! auth middleware, and refresh-cookie plumbing.

pub mod cookie;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService, TokenPair};
pub use middleware::require_auth;
