//! Account endpoints - `/api/auth/register`, `/api/auth/login` and `/api/auth/me`.

use crate::{
    api::{
        AppState, AuthUser,
        response::{ApiResponse, json_body},
    },
    core::user::{self, LoginInput, RegisterInput},
    errors::Result,
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

/// Register a new account and return a token for it.
///
/// Responds `201` with the token and the public user view. Validation failures,
/// including an email that is already taken, are `400` with field errors.
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterInput>, JsonRejection>,
) -> Result<ApiResponse> {
    let user = user::register_user(&state.database, json_body(payload)?).await?;
    let token = state.tokens.issue(user.id)?;

    Ok(ApiResponse::created()
        .message("User registered successfully")
        .token(token)
        .user(&user))
}

/// Exchange email and password for a token.
///
/// Unknown emails and wrong passwords get the same `401` body.
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginInput>, JsonRejection>,
) -> Result<ApiResponse> {
    let user = user::authenticate_user(&state.database, json_body(payload)?).await?;
    let token = state.tokens.issue(user.id)?;

    Ok(ApiResponse::ok().token(token).user(&user))
}

/// The authenticated caller, without the password hash
pub async fn me(AuthUser(user): AuthUser) -> ApiResponse {
    ApiResponse::ok().user(&user)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{api, test_utils::*};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_register_login_me_flow() -> Result<()> {
        let db = setup_test_db().await?;
        let app = api::router(test_state(db));

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"name": "Grace", "email": "grace@example.com", "password": "hopper42"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["email"], "grace@example.com");
        assert!(body["user"].get("passwordHash").is_none());
        assert!(body["token"].is_string());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "GRACE@example.com", "password": "hopper42"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["name"], "Grace");

        Ok(())
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let app = api::router(test_state(db));

        let wrong_password = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": user.email, "password": "not-it"})),
        )
        .await;
        let unknown_email = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "nobody@example.com", "password": TEST_PASSWORD})),
        )
        .await;

        assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password, unknown_email);
        Ok(())
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_bad_request() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let app = api::router(test_state(db));

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"name": "Again", "email": user.email, "password": "password"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "email");
        Ok(())
    }
}
