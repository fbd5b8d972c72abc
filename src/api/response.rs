//! JSON response envelope shared by every endpoint.
//!
//! Bodies look like `{"success": true, ...}` with only the relevant optional
//! members present. Errors use the same envelope with `success: false`.

use crate::{
    core::stats::{Stats, Totals},
    entities::{subscription, user},
    errors::{Error, FieldError, Result},
};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::error;

/// Subscription as returned to clients, including the derived monthly cost.
/// Field meanings follow [`subscription::Model`].
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
    pub id: i64,
    pub name: String,
    pub cost: f64,
    pub billing_cycle: subscription::BillingCycle,
    pub renewal_date: Option<NaiveDate>,
    pub category: subscription::Category,
    pub color: String,
    pub notes: String,
    pub is_active: bool,
    pub monthly_cost: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<&subscription::Model> for SubscriptionView {
    fn from(model: &subscription::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            cost: model.cost,
            billing_cycle: model.cycle(),
            renewal_date: model.renewal_date,
            category: model.category(),
            color: model.color.clone(),
            notes: model.notes.clone(),
            is_active: model.is_active,
            monthly_cost: model.monthly_cost(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Public view of a user; never includes the password hash.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: NaiveDateTime,
}

impl From<&user::Model> for UserView {
    fn from(model: &user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            email: model.email.clone(),
            created_at: model.created_at,
        }
    }
}

/// Response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    #[serde(skip)]
    status: StatusCode,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subscription: Option<SubscriptionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subscriptions: Option<Vec<SubscriptionView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    totals: Option<Totals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<Stats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<UserView>,
}

impl ApiResponse {
    fn with_status(status: StatusCode, success: bool) -> Self {
        Self {
            status,
            success,
            message: None,
            count: None,
            subscription: None,
            subscriptions: None,
            totals: None,
            stats: None,
            errors: None,
            token: None,
            user: None,
        }
    }

    /// `200 OK` with `success: true`.
    #[must_use]
    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK, true)
    }

    /// `201 Created` with `success: true`.
    #[must_use]
    pub fn created() -> Self {
        Self::with_status(StatusCode::CREATED, true)
    }

    /// An error envelope with `success: false`.
    #[must_use]
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self::with_status(status, false).message(message)
    }

    /// HTTP status this envelope is sent with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets `message`.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets `subscription`.
    #[must_use]
    pub fn subscription(mut self, model: &subscription::Model) -> Self {
        self.subscription = Some(SubscriptionView::from(model));
        self
    }

    /// Sets `subscriptions` and `count`.
    #[must_use]
    pub fn subscriptions(mut self, models: &[subscription::Model]) -> Self {
        self.count = Some(models.len());
        self.subscriptions = Some(models.iter().map(SubscriptionView::from).collect());
        self
    }

    /// Sets `totals`.
    #[must_use]
    pub const fn totals(mut self, totals: Totals) -> Self {
        self.totals = Some(totals);
        self
    }

    /// Sets `stats`.
    #[must_use]
    pub fn stats(mut self, stats: Stats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Sets the field-level `errors`.
    #[must_use]
    pub fn errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Sets the issued access `token`.
    #[must_use]
    pub fn token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    /// Sets `user`.
    #[must_use]
    pub fn user(mut self, model: &user::Model) -> Self {
        self.user = Some(UserView::from(model));
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<Error> for ApiResponse {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation { errors } => {
                Self::failure(StatusCode::BAD_REQUEST, "Validation failed").errors(errors)
            }
            Error::SubscriptionNotFound { .. } => {
                Self::failure(StatusCode::NOT_FOUND, "Subscription not found")
            }
            Error::Unauthorized { message } => Self::failure(StatusCode::UNAUTHORIZED, message),
            Error::InvalidCredentials => {
                Self::failure(StatusCode::UNAUTHORIZED, "Invalid email or password")
            }
            other => {
                error!(error = %other, "Unhandled error");
                Self::failure(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        ApiResponse::from(self).into_response()
    }
}

/// Unwraps a JSON body, turning a malformed or mistyped body into a
/// validation error on the `body` field.
///
/// # Errors
/// Returns `Error::Validation` when the body could not be parsed.
pub fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| Error::field("body", rejection.body_text()))
}
