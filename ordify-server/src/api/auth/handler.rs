//! Auth API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::{CurrentUser, cookie, password};
use crate::core::ServerState;
use crate::db::repository::{token, user};
use crate::utils::{AppError, AppResult};
use shared::models::UserResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 4, max = 32, message = "must be 4-32 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token pair plus the user it belongs to. The refresh token is returned
/// in the body *and* as an HTTP-only cookie; browser clients rely on the
/// cookie, non-browser clients on the body.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    pub user: UserResponse,
}

/// POST /api/auth/register - 注册新用户
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Response> {
    payload.validate()?;

    let password_hash = password::hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;
    let activation_link = uuid::Uuid::new_v4().to_string();

    let user = user::create(&state.pool, &payload.email, &password_hash, &activation_link).await?;
    tracing::info!(user_id = user.id, email = %user.email, "user registered");

    issue_tokens(&state, user.id, &user.email).await
}

/// POST /api/auth/login - 登录
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Response> {
    let user = user::find_by_email(&state.pool, &payload.email)
        .await?
        .ok_or_else(|| AppError::validation("This email is not registered"))?;

    let matches = password::verify_password(&payload.password, &user.password_hash)
        .map_err(|e| AppError::internal(format!("Failed to verify password: {e}")))?;
    if !matches {
        return Err(AppError::validation("Password does not match"));
    }

    issue_tokens(&state, user.id, &user.email).await
}

/// GET /api/auth/refresh - 用 cookie 中的刷新令牌换取新的令牌对
///
/// 刷新令牌必须同时通过 JWT 校验和持久化记录校验，任一失败都是 401。
pub async fn refresh(State(state): State<ServerState>, headers: HeaderMap) -> AppResult<Response> {
    let refresh_token = cookie::extract_refresh_token(&headers).ok_or(AppError::Unauthorized)?;

    let claims = state.jwt_service.validate_refresh_token(&refresh_token)?;
    let current = CurrentUser::try_from(claims)?;

    if token::find_user_by_token(&state.pool, &refresh_token)
        .await?
        .is_none()
    {
        return Err(AppError::Unauthorized);
    }

    let user = user::find_by_id(&state.pool, current.id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    issue_tokens(&state, user.id, &user.email).await
}

/// GET /api/auth/logout - 删除持久化的刷新令牌并清除 cookie
pub async fn logout(State(state): State<ServerState>, headers: HeaderMap) -> AppResult<Response> {
    let refresh_token = cookie::extract_refresh_token(&headers).ok_or(AppError::Unauthorized)?;

    let removed = token::delete_by_token(&state.pool, &refresh_token).await?;
    if !removed {
        return Err(AppError::Unauthorized);
    }

    let mut response = Json(true).into_response();
    set_cookie(&mut response, &cookie::build_clear_cookie())?;
    Ok(response)
}

/// GET /api/auth/activate/{link} - 激活账号并跳转到前端
pub async fn activate(
    State(state): State<ServerState>,
    Path(link): Path<String>,
) -> AppResult<Response> {
    user::activate(&state.pool, &link).await?;

    // 302 Found, same as the frontend expects from a browser redirect
    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, state.config.frontend_url.clone())],
    )
        .into_response())
}

/// Sign a fresh pair, persist the refresh token, and attach the cookie.
async fn issue_tokens(state: &ServerState, user_id: i64, email: &str) -> AppResult<Response> {
    let tokens = state.jwt_service.generate_token_pair(user_id, email)?;
    token::upsert(&state.pool, user_id, &tokens.refresh_token).await?;

    let user = user::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::internal("User vanished during token issuance"))?;

    let cookie_value = cookie::build_refresh_cookie(
        &tokens.refresh_token,
        state.config.jwt.refresh_days,
    );
    let body = AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        user: user.into(),
    };

    let mut response = Json(body).into_response();
    set_cookie(&mut response, &cookie_value)?;
    Ok(response)
}

fn set_cookie(response: &mut Response, cookie_value: &str) -> AppResult<()> {
    let value = header::HeaderValue::from_str(cookie_value)
        .map_err(|e| AppError::internal(format!("Invalid cookie header: {e}")))?;
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(())
}
