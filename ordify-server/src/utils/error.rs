//! 统一错误处理
//!
//! 提供应用级错误类型和响应结构：
//! - [`AppError`] - 应用错误枚举
//! - [`ErrorBody`] - 错误响应结构
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::not_found("Order not found"))
//!
//! // 字段级验证错误 (400)
//! Err(AppError::validation_errors("Validation error", errors))
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::db::repository::RepoError;

/// 错误响应结构
///
/// ```json
/// {
///   "message": "Validation error",
///   "errors": ["password: length 4..32"]
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// 人类可读的错误信息
    pub message: String,
    /// 字段级错误列表 (可选)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ErrorBody {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: Vec::new(),
        }
    }
}

/// 应用错误枚举
///
/// # 错误分类
///
/// | 分类 | 说明 |
/// |------|------|
/// | 认证错误 | 未登录、令牌过期、无效令牌 (401) |
/// | 业务逻辑错误 | 资源不存在 (404)、验证/规则冲突 (400) |
/// | 系统错误 | 数据库错误、内部错误 (500) |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 认证错误 (401) ==========
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    // ========== 业务逻辑错误 (4xx) ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        errors: Vec<String>,
    },

    // ========== 系统错误 (5xx) ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            // Authentication errors (401)
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, ErrorBody::new("Unauthorized")),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, ErrorBody::new("Token expired")),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, ErrorBody::new("Invalid token")),

            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorBody::new(msg)),

            // Validation / business rule (400)
            AppError::Validation { message, errors } => {
                (StatusCode::BAD_REQUEST, ErrorBody { message, errors })
            }

            // Database errors (500) - detail stays in the log
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Database error"),
                )
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            errors: Vec::new(),
        }
    }

    pub fn validation_errors(msg: impl Into<String>, errors: Vec<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            errors,
        }
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            // Duplicates surface as 400 with the business message
            RepoError::Duplicate(msg) => AppError::validation(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl From<crate::auth::JwtError> for AppError {
    fn from(err: crate::auth::JwtError) -> Self {
        use crate::auth::JwtError;
        match err {
            JwtError::ExpiredToken => AppError::TokenExpired,
            JwtError::InvalidSignature | JwtError::InvalidToken(_) => AppError::InvalidToken,
            JwtError::GenerationFailed(msg) => {
                AppError::Internal(format!("Token generation failed: {msg}"))
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errs: validator::ValidationErrors) -> Self {
        let mut errors = Vec::new();
        for (field, field_errs) in errs.field_errors() {
            for err in field_errs {
                let detail = err
                    .message
                    .clone()
                    .unwrap_or_else(|| err.code.clone());
                errors.push(format!("{field}: {detail}"));
            }
        }
        AppError::validation_errors("Validation error", errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn repo_duplicate_maps_to_bad_request() {
        let err: AppError = RepoError::Duplicate("Already exists".into()).into();
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn repo_not_found_maps_to_404() {
        let err: AppError = RepoError::NotFound("Order not found".into()).into();
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn database_detail_is_not_exposed() {
        let resp = AppError::database("secret detail").into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
