use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::db;
use crate::errors::AppError;
use crate::models::{LoginRequest, LoginResponse, User};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated caller, taken from a `Authorization: Bearer <jwt>` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Validation(format!("Could not hash password: {}", e)))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

pub fn issue_token(
    config: &AuthConfig,
    user_id: Uuid,
    username: &str,
    now: DateTime<Utc>,
) -> Result<(String, DateTime<Utc>), AppError> {
    let expires_at = now + Duration::hours(config.token_ttl_hours);
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::External(format!("Could not sign token: {}", e)))?;

    Ok((token, expires_at))
}

pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        warn!("Rejected token: {}", e);
        AppError::Unauthorized
    })
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn login(pool: &PgPool, config: &AuthConfig, input: LoginRequest) -> Result<LoginResponse, AppError> {
    if input.username.trim().is_empty() || input.password.is_empty() {
        return Err(AppError::Validation("Username and password are required".into()));
    }

    let user = db::user_queries::fetch_by_username(pool, input.username.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&input.password, &user.password_hash) {
        warn!("Failed login for {}", user.username);
        return Err(AppError::Unauthorized);
    }

    let (token, expires_at) = issue_token(config, user.id, &user.username, Utc::now())?;
    info!("User {} logged in", user.username);

    Ok(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_at,
    })
}

/// Create the configured admin account if it does not exist yet.
pub async fn seed_admin(pool: &PgPool, config: &AuthConfig) -> Result<Option<User>, AppError> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return Ok(None);
    };

    if db::user_queries::fetch_by_username(pool, username).await?.is_some() {
        return Ok(None);
    }

    let user = db::user_queries::insert(pool, username, &hash_password(password)?).await?;
    info!("👤 Seeded admin user {}", user.username);
    Ok(Some(user))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let claims = verify_token(&state.config.auth, token)?;

        Ok(AuthUser {
            id: claims.sub,
            username: claims.username,
        })
    }
}
