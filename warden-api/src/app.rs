/// Application state and router builder
///
/// [`AppState`] owns the auth collaborators, built once at startup from the
/// immutable [`Config`] and shared by every request through `Arc`s.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use warden_api::{app::{build_router, AppState}, config::Config};
/// use warden_shared::db::pool::{create_pool, DatabaseConfig};
/// use warden_shared::store::postgres::PgCredentialStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
///
/// let state = AppState::new(Arc::new(PgCredentialStore::new(pool)), config)?;
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use warden_shared::auth::{
    authenticator::Authenticator,
    middleware::identity_middleware,
    password::{PasswordError, PasswordHasher},
    resolver::IdentityResolver,
    token::TokenCodec,
};
use warden_shared::store::CredentialStore;

/// Shared application state
///
/// Cloned into each handler via Axum's `State` extractor; every field is
/// cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Credential store
    pub store: Arc<dyn CredentialStore>,

    /// Password hasher (used directly for registration)
    pub hasher: PasswordHasher,

    /// Token codec (used directly for login)
    pub codec: TokenCodec,

    /// Login check
    pub authenticator: Authenticator,

    /// Bearer token gate for protected routes
    pub resolver: IdentityResolver,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state from a store and configuration
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::InvalidParams` if the hashing cost in `config`
    /// is rejected by Argon2.
    pub fn new(store: Arc<dyn CredentialStore>, config: Config) -> Result<Self, PasswordError> {
        let hasher = PasswordHasher::new(config.hashing)?;
        let codec = TokenCodec::new(&config.jwt.secret).with_ttl(config.jwt.access_token_ttl());

        Ok(Self {
            authenticator: Authenticator::new(store.clone(), hasher.clone()),
            resolver: IdentityResolver::new(codec.clone(), store.clone()),
            store,
            hasher,
            codec,
            config: Arc::new(config),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /
/// ├── GET  /healthz     # Health check (public)
/// ├── POST /users       # Register (public)
/// ├── POST /token       # Login, OAuth2 password form (public)
/// └── GET  /me          # Current user (bearer token)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Identity resolution (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/healthz", get(routes::health::health_check))
        .route("/users", post(routes::users::register))
        .route("/token", post(routes::auth::login));

    let protected_routes = Router::new()
        .route("/me", get(routes::users::read_me))
        .layer(from_fn_with_state(
            state.resolver.clone(),
            identity_middleware,
        ));

    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(|| async { ApiError::NotFound("Route not found".to_string()) })
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, DatabaseConfig, JwtConfig};
    use warden_shared::auth::password::HashingConfig;
    use warden_shared::store::memory::MemoryCredentialStore;

    #[test]
    fn test_codec_ttl_comes_from_config() {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                production: false,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "postgresql://unused".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                access_token_expire_minutes: 5,
            },
            hashing: HashingConfig {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
        };

        let state = AppState::new(Arc::new(MemoryCredentialStore::new()), config).unwrap();
        assert_eq!(state.codec.default_ttl(), chrono::Duration::minutes(5));
    }
}
