use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::{self, password, Claims};
use crate::config;
use crate::database::{DatabaseManager, UserStore};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /auth/register - Create a new user account
pub async fn register(Json(payload): Json<RegisterRequest>) -> ApiResult<Value> {
    validate_registration(&payload)?;

    let password_hash = password::hash_password(&payload.password)?;

    let store = UserStore::new(DatabaseManager::service_pool().await?);
    let user = store.create_user(&payload.username, &password_hash).await?;

    tracing::info!(username = %user.username, "registered user");

    Ok(ApiResponse::created(json!({
        "id": user.id,
        "username": user.username,
    })))
}

/// POST /auth/login - Authenticate and receive a session token
///
/// Unknown usernames and wrong passwords are deliberately indistinguishable.
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<Value> {
    let store = UserStore::new(DatabaseManager::service_pool().await?);

    let user = store
        .find_by_username(&payload.username)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !password::verify_password(&payload.password, &user.password_hash)? {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let claims = Claims::new(user.id, user.username.clone());
    let token = auth::generate_jwt(&claims)?;
    let expires_in = config::config().security.jwt_expiry_hours * 3600;

    Ok(ApiResponse::success(json!({
        "token": token,
        "user": {
            "id": user.id,
            "username": user.username,
        },
        "expires_in": expires_in,
    })))
}

fn validate_registration(payload: &RegisterRequest) -> Result<(), ApiError> {
    let mut field_errors = HashMap::new();

    if let Err(msg) = validate_username_format(&payload.username) {
        field_errors.insert("username".to_string(), msg);
    }
    if payload.password.len() < MIN_PASSWORD_LENGTH {
        field_errors.insert(
            "password".to_string(),
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        );
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Invalid registration request", Some(field_errors)))
    }
}

/// Validate username format and requirements
fn validate_username_format(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }

    if username.len() < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }

    if username.len() > 50 {
        return Err("Username must be less than 50 characters".to_string());
    }

    // Allow alphanumeric, underscore, hyphen
    if !username.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err("Username can only contain letters, numbers, underscore, and hyphen".to_string());
    }

    // Must start with alphanumeric
    if !username.chars().next().is_some_and(|c| c.is_alphanumeric()) {
        return Err("Username must start with a letter or number".to_string());
    }

    Ok(())
}
