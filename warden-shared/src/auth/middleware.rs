/// Authentication middleware for Axum
///
/// Extracts the bearer token from the `Authorization` header, resolves it
/// with an [`IdentityResolver`], and stores the resulting [`AuthContext`] in
/// the request extensions for handlers to pick up.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use warden_shared::auth::middleware::{identity_middleware, AuthContext};
/// use warden_shared::auth::resolver::IdentityResolver;
///
/// async fn me(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.username)
/// }
///
/// fn router(resolver: IdentityResolver) -> Router {
///     Router::new()
///         .route("/me", get(me))
///         .layer(middleware::from_fn_with_state(resolver, identity_middleware))
/// }
/// ```

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::resolver::{IdentityResolver, ResolveError};
use crate::models::user::User;

/// Identity of the caller, built fresh for each request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: i64,

    /// Authenticated username
    pub username: String,
}

impl AuthContext {
    /// Creates auth context from a resolved user
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// No usable `Authorization: Bearer` header
    MissingCredentials,

    /// Token failed verification
    InvalidToken,

    /// Token was valid but the account is gone
    UserNotFound,

    /// Store failure
    Internal(String),
}

impl From<ResolveError> for AuthError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Unauthorized(_) => AuthError::InvalidToken,
            ResolveError::UserNotFound => AuthError::UserNotFound,
            ResolveError::Store(e) => AuthError::Internal(e.to_string()),
        }
    }
}

impl AuthError {
    fn status_and_message(&self) -> (StatusCode, &'static str, &'static str) {
        match self {
            AuthError::MissingCredentials | AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Could not validate credentials",
            ),
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, "not_found", "User not found"),
            AuthError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred",
            ),
        }
    }
}

/// Renders the same `{error, message}` body the API uses for its own errors
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(msg) = &self {
            tracing::error!("Identity resolution failed: {}", msg);
        }

        let (status, error, message) = self.status_and_message();
        let body = Json(json!({ "error": error, "message": message }));

        if status == StatusCode::UNAUTHORIZED {
            let challenge = [(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))];
            (status, challenge, body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
///
/// The scheme is matched case-insensitively. Returns `None` when the header
/// is missing, not UTF-8, uses another scheme, or carries an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolves the caller's bearer token and inserts [`AuthContext`]
///
/// # Errors
///
/// - 401 if the header is missing/malformed or the token is invalid/expired
/// - 404 if the token's user no longer exists
/// - 500 on store failure
pub async fn identity_middleware(
    State(resolver): State<IdentityResolver>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers()).ok_or(AuthError::MissingCredentials)?;

    let user = resolver.resolve(token).await?;

    req.extensions_mut().insert(AuthContext::from_user(&user));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::TokenError;
    use chrono::Utc;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_auth_context_from_user() {
        let user = User {
            id: 7,
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
        };

        let context = AuthContext::from_user(&user);
        assert_eq!(context.user_id, 7);
        assert_eq!(context.username, "alice");
    }

    #[test]
    fn test_resolve_error_mapping() {
        assert!(matches!(
            AuthError::from(ResolveError::Unauthorized(TokenError::Expired)),
            AuthError::InvalidToken
        ));
        assert!(matches!(
            AuthError::from(ResolveError::UserNotFound),
            AuthError::UserNotFound
        ));
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");

        let response = AuthError::InvalidToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::UserNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AuthError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
