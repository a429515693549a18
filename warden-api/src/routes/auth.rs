/// Token endpoint
///
/// Exchanges a username and password for a bearer token, following the
/// OAuth2 password grant form encoding so standard clients can log in.
///
/// # Endpoint
///
/// ```text
/// POST /token
/// Content-Type: application/x-www-form-urlencoded
///
/// username=alice&password=S3curePass!
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access_token": "eyJ...",
///   "token_type": "bearer"
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{rejection::FormRejection, State},
    Form, Json,
};
use serde::{Deserialize, Serialize};

/// Login form
///
/// `grant_type` and `scope` are accepted for OAuth2 client compatibility and
/// otherwise ignored.
#[derive(Deserialize)]
pub struct LoginForm {
    /// Username
    pub username: String,

    /// Plaintext password
    pub password: String,

    /// OAuth2 grant type (ignored)
    #[serde(default)]
    pub grant_type: Option<String>,

    /// OAuth2 scope (ignored)
    #[serde(default)]
    pub scope: Option<String>,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed access token
    pub access_token: String,

    /// Always `bearer`
    pub token_type: String,
}

/// Login handler
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown user or wrong password (indistinguishable)
/// - `422 Unprocessable Entity`: Missing or unreadable form fields
/// - `500 Internal Server Error`: Store or hashing failure
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Form<LoginForm>, FormRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Form(form) = payload?;

    let user = match state
        .authenticator
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::info!(username = %form.username, "Login rejected");
            return Err(e.into());
        }
    };

    let access_token = state.codec.issue_default(&user.username)?;

    tracing::info!(user_id = user.id, username = %user.username, "Token issued");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
