//! Subscription endpoints under `/api/subscriptions`.
//!
//! All routes require authentication and only ever see the caller's active
//! subscriptions. Unknown, foreign, deleted and malformed ids share one `404`.

use crate::{
    api::{
        AppState, AuthUser,
        response::{ApiResponse, json_body},
    },
    core::{
        stats, subscription,
        validation::{self, SubscriptionInput},
    },
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::get,
};

/// Subscription routes, mounted at `/api/subscriptions` behind the auth middleware
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_subscriptions).post(create_subscription))
        .route("/stats/overview", get(stats_overview))
        .route(
            "/{id}",
            get(get_subscription)
                .put(update_subscription)
                .delete(delete_subscription),
        )
}

/// Ids that are not integers cannot exist, so they get the ordinary not-found.
fn parse_id(raw: &str) -> Result<i64> {
    raw.parse().map_err(|_| Error::SubscriptionNotFound {
        id: raw.to_string(),
    })
}

/// List the caller's active subscriptions with their totals.
///
/// The body carries `count`, the subscriptions newest first, and the monthly
/// and yearly totals over exactly the listed rows.
pub async fn list_subscriptions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<ApiResponse> {
    let subscriptions = subscription::list_active_subscriptions(&state.database, user.id).await?;
    let totals = stats::calculate_totals(&subscriptions);

    Ok(ApiResponse::ok()
        .subscriptions(&subscriptions)
        .totals(totals))
}

/// Fetch one of the caller's subscriptions
pub async fn get_subscription(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse> {
    let model = subscription::get_subscription(&state.database, user.id, parse_id(&id)?).await?;
    Ok(ApiResponse::ok().subscription(&model))
}

/// Create a subscription for the caller.
///
/// Every invalid field is reported at once with `400`; nothing is stored in
/// that case.
pub async fn create_subscription(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: std::result::Result<Json<SubscriptionInput>, JsonRejection>,
) -> Result<ApiResponse> {
    let new = validation::validate_new_subscription(json_body(payload)?)?;
    let model = subscription::create_subscription(&state.database, user.id, new).await?;

    Ok(ApiResponse::created()
        .message("Subscription created successfully")
        .subscription(&model))
}

/// Partially update one of the caller's subscriptions.
///
/// Absent fields keep their stored values and `updatedAt` is always refreshed.
/// The body is validated before the lookup, so an invalid body is `400` for
/// any well-formed id.
pub async fn update_subscription(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    payload: std::result::Result<Json<SubscriptionInput>, JsonRejection>,
) -> Result<ApiResponse> {
    let id = parse_id(&id)?;
    let changes = validation::validate_subscription_changes(json_body(payload)?)?;
    let model = subscription::update_subscription(&state.database, user.id, id, changes).await?;

    Ok(ApiResponse::ok()
        .message("Subscription updated successfully")
        .subscription(&model))
}

/// Soft delete one of the caller's subscriptions.
///
/// The row stays in the table with `is_active` cleared and disappears from
/// every read endpoint.
pub async fn delete_subscription(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse> {
    subscription::delete_subscription(&state.database, user.id, parse_id(&id)?).await?;
    Ok(ApiResponse::ok().message("Subscription deleted successfully"))
}

/// Aggregated statistics over the caller's active subscriptions
pub async fn stats_overview(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<ApiResponse> {
    let stats = stats::get_stats(&state.database, user.id).await?;
    Ok(ApiResponse::ok().stats(stats))
}
