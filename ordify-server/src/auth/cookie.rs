//! Refresh-token cookie handling
//!
//! The refresh token travels in an HTTP-only cookie. SameSite=None plus
//! Secure is required for the cross-origin frontend; the CORS layer
//! allows credentials for exactly that origin.

use http::HeaderMap;

pub const REFRESH_COOKIE: &str = "refreshToken";

/// Set-Cookie value carrying the refresh token.
pub fn build_refresh_cookie(token: &str, max_age_days: i64) -> String {
    let max_age = max_age_days * 24 * 60 * 60;
    format!("{REFRESH_COOKIE}={token}; Max-Age={max_age}; Path=/; HttpOnly; Secure; SameSite=None")
}

/// Set-Cookie value that clears the refresh token.
pub fn build_clear_cookie() -> String {
    format!("{REFRESH_COOKIE}=; Max-Age=0; Path=/; HttpOnly; Secure; SameSite=None")
}

/// Pull the refresh token out of the request's Cookie header.
pub fn extract_refresh_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(http::header::COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| {
            pair.strip_prefix(REFRESH_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
