/// User endpoints
///
/// - `POST /users` - Register a new account
/// - `GET /me` - Return the account behind the bearer token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;
use warden_shared::auth::middleware::AuthContext;
use warden_shared::models::user::User;

/// Registration request
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    pub username: String,

    /// Plaintext password
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Public view of an account
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID
    pub id: i64,

    /// Username
    pub username: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /users
/// Content-Type: application/json
///
/// { "username": "alice", "password": "S3curePass!" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Username already taken
/// - `422 Unprocessable Entity`: Validation failed or unreadable body
/// - `500 Internal Server Error`: Store or hashing failure
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let Json(req) = payload?;
    req.validate()?;

    if !is_valid_username(&req.username) {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "username".to_string(),
            message: "Username may only contain letters, digits, '_', '.' and '-'".to_string(),
        }]));
    }

    // Fast path only; the store's unique constraint decides races.
    if state.store.find_by_username(&req.username).await?.is_some() {
        return Err(ApiError::BadRequest("Username already taken".to_string()));
    }

    let hasher = state.hasher.clone();
    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| ApiError::InternalError(format!("Hashing task failed: {}", e)))??;

    let user = state.store.create(&req.username, &password_hash).await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Current user
///
/// # Endpoint
///
/// ```text
/// GET /me
/// Authorization: Bearer <token>
/// ```
///
/// The identity middleware has already resolved the token; missing or bad
/// tokens never reach this handler.
pub async fn read_me(Extension(auth): Extension<AuthContext>) -> Json<UserResponse> {
    Json(UserResponse {
        id: auth.user_id,
        username: auth.username,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_charset() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("a.b-c_d9"));
        assert!(!is_valid_username("alice smith"));
        assert!(!is_valid_username("alice@example.com"));
        assert!(!is_valid_username("älice"));
    }

    #[test]
    fn test_register_request_length_rules() {
        let valid = RegisterRequest {
            username: "alice".to_string(),
            password: "S3curePass!".to_string(),
        };
        assert!(valid.validate().is_ok());

        let short = RegisterRequest {
            username: "al".to_string(),
            password: "short".to_string(),
        };
        let errors = short.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let req = RegisterRequest {
            username: "alice".to_string(),
            password: "S3curePass!".to_string(),
        };
        let debug = format!("{:?}", req);
        assert!(!debug.contains("S3curePass!"));
    }
}
