//! Authentication Middleware
//!
//! Axum middleware for JWT authentication. Layered onto staff route
//! groups; public routes never pass through here.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::utils::AppError;

/// Require authentication middleware
///
/// Extracts and validates the JWT access token from the Authorization
/// header. If valid, the CurrentUser lands in the request extensions.
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header).ok_or(AppError::InvalidToken)?,
        None => {
            tracing::warn!(uri = ?req.uri(), "missing Authorization header");
            return Err(AppError::Unauthorized);
        }
    };

    match state.jwt_service.validate_access_token(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims).map_err(|_| AppError::InvalidToken)?;
            tracing::debug!(user_id = user.id, email = %user.email, "user authenticated");
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(error = %e, uri = ?req.uri(), "access token rejected");
            match e {
                JwtError::ExpiredToken => Err(AppError::TokenExpired),
                _ => Err(AppError::InvalidToken),
            }
        }
    }
}
