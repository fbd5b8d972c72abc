//! HTTP layer - axum router, handlers, auth middleware and response envelope
//!
//! Handlers stay thin: they extract the caller and the request body, call into
//! [`crate::core`], and wrap the result in an [`ApiResponse`].

/// Bearer-token issuing, verification and the auth middleware
pub mod auth;
/// Liveness endpoint
pub mod health;
/// JSON response envelope and error mapping
pub mod response;
/// Subscription CRUD and statistics endpoints
pub mod subscriptions;
/// Registration, login and current-user endpoints
pub mod users;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use auth::{AuthUser, TokenService};
pub use response::ApiResponse;

/// Shared state handed to every handler.
/// Holds the database pool and the token service; cloned per request.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool for all operations
    pub database: DatabaseConnection,
    /// Signs and verifies bearer tokens
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Creates a new `AppState` from a connection and a token service.
    #[must_use]
    pub const fn new(database: DatabaseConnection, tokens: Arc<TokenService>) -> Self {
        Self { database, tokens }
    }
}

/// Builds the full application router under `/api`.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(users::register))
        .route("/auth/login", post(users::login))
        .route("/health", get(health::health));

    let protected = Router::new()
        .route("/auth/me", get(users::me))
        .nest("/subscriptions", subscriptions::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .nest("/api", public.merge(protected))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
