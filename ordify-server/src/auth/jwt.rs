//! JWT Token Service
//!
//! Access and refresh tokens are signed with separate secrets; both carry
//! issuer/audience and a token_type claim so one can never stand in for
//! the other.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT Configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Access-token secret (should be at least 32 bytes)
    pub access_secret: String,
    /// Refresh-token secret
    pub refresh_secret: String,
    /// Access-token expiration in minutes
    pub access_minutes: i64,
    /// Refresh-token expiration in days
    pub refresh_days: i64,
    /// Token issuer
    pub issuer: String,
    /// Token audience
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: secret_from_env("JWT_ACCESS_SECRET"),
            refresh_secret: secret_from_env("JWT_REFRESH_SECRET"),
            access_minutes: std::env::var("ACCESS_TOKEN_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(15),
            refresh_days: std::env::var("REFRESH_TOKEN_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "ordify-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "ordify-clients".to_string()),
        }
    }
}

fn secret_from_env(var: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| {
        #[cfg(debug_assertions)]
        {
            tracing::warn!(
                "⚠️  {} not set! Using insecure default key. DO NOT USE IN PRODUCTION!",
                var
            );
            format!("dev-{}-change-in-production-min-32-chars", var.to_lowercase())
        }
        #[cfg(not(debug_assertions))]
        {
            panic!("🚨 FATAL: {var} environment variable is not set!");
        }
    })
}

/// JWT Claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Email
    pub email: String,
    /// Token type: "access" | "refresh"
    pub token_type: String,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

/// JWT Errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

/// A freshly signed access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// JWT Token Service
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service with default config
    pub fn new() -> Self {
        Self::with_config(JwtConfig::default())
    }

    /// Create a new JWT service with custom config
    pub fn with_config(config: JwtConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            config,
        }
    }

    /// Sign an access/refresh pair for the user.
    pub fn generate_token_pair(&self, user_id: i64, email: &str) -> Result<TokenPair, JwtError> {
        let access_token = self.generate(
            user_id,
            email,
            "access",
            Duration::minutes(self.config.access_minutes),
            &self.access_encoding,
        )?;
        let refresh_token = self.generate(
            user_id,
            email,
            "refresh",
            Duration::days(self.config.refresh_days),
            &self.refresh_encoding,
        )?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    fn generate(
        &self,
        user_id: i64,
        email: &str,
        token_type: &str,
        ttl: Duration,
        key: &EncodingKey,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            token_type: token_type.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate and decode an access token
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate(token, "access", &self.access_decoding)
    }

    /// Validate and decode a refresh token
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate(token, "refresh", &self.refresh_decoding)
    }

    fn validate(
        &self,
        token: &str,
        token_type: &str,
        key: &DecodingKey,
    ) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        let token_data =
            decode::<Claims>(token, key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            })?;

        if token_data.claims.token_type != token_type {
            return Err(JwtError::InvalidToken(format!(
                "expected {token_type} token"
            )));
        }
        Ok(token_data.claims)
    }

    /// Extract token from Authorization header
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

/// Current user context extracted from JWT
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, JwtError> {
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| JwtError::InvalidToken("non-numeric subject".into()))?;
        Ok(Self {
            id,
            email: claims.email,
        })
    }
}
