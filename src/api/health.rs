//! Health endpoint.

use crate::api::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use tracing::error;

/// Liveness check that also pings the database.
///
/// Returns `200` when the database answers and `503` otherwise. Needs no token.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.database.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"success": true, "status": "ok", "database": "ok"})),
        ),
        Err(e) => {
            error!("Database ping failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"success": false, "status": "degraded", "database": "unreachable"})),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{api, errors::Result, test_utils::*};
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_health_is_public() -> Result<()> {
        let db = setup_test_db().await?;
        let app = api::router(test_state(db));

        let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "ok");
        Ok(())
    }
}
