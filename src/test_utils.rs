//! Shared test utilities for `SubTrack`.
//!
//! This module provides common helper functions for setting up test databases,
//! creating test entities with sensible defaults, and driving the HTTP router.

use crate::{
    api::{self, AppState, auth::TokenService},
    core::{
        subscription,
        user::{self, RegisterInput},
        validation::NewSubscription,
    },
    entities,
    errors::Result,
};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Password used for every test user.
pub const TEST_PASSWORD: &str = "password123";
/// Secret used to sign test tokens.
pub const TEST_JWT_SECRET: &str = "test-secret";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Registers a test user named "Test User" with [`TEST_PASSWORD`].
pub async fn create_test_user(db: &DatabaseConnection, email: &str) -> Result<entities::user::Model> {
    user::register_user(
        db,
        RegisterInput {
            name: Some("Test User".to_string()),
            email: Some(email.to_string()),
            password: Some(TEST_PASSWORD.to_string()),
        },
    )
    .await
}

/// Creates a monthly subscription in the `other` category.
pub async fn create_test_subscription(
    db: &DatabaseConnection,
    user_id: i64,
    name: &str,
    cost: f64,
) -> Result<entities::subscription::Model> {
    subscription::create_subscription(db, user_id, NewSubscription::new(name, cost)).await
}

/// Sets up a database with one registered user.
/// Returns (db, user) for common test scenarios.
pub async fn setup_with_user() -> Result<(DatabaseConnection, entities::user::Model)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "alice@example.com").await?;
    Ok((db, user))
}

/// Builds application state over `db` with the test signing secret.
#[must_use]
pub fn test_state(db: DatabaseConnection) -> AppState {
    AppState::new(db, Arc::new(TokenService::new(TEST_JWT_SECRET, 1)))
}

/// Builds the full router and a bearer token for `user_id`.
pub fn test_app(db: DatabaseConnection, user_id: i64) -> Result<(Router, String)> {
    let state = test_state(db);
    let token = state.tokens.issue(user_id)?;
    Ok((api::router(state), token))
}

/// Sends one request through `app` and returns the status and JSON body
/// (`Value::Null` for an empty body).
#[allow(clippy::unwrap_used)]
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
