//! Subscription business logic - Handles all subscription CRUD operations.
//!
//! Every query is scoped to the requesting user and to active rows. A row that
//! does not exist, belongs to another user, or was soft-deleted produces the same
//! `SubscriptionNotFound` error, so callers cannot probe for other users' ids.

use crate::{
    core::validation::{NewSubscription, SubscriptionChanges},
    entities::{Subscription, subscription},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Select, Set, prelude::*};
use tracing::{info, instrument};

fn owned_active(user_id: i64) -> Select<Subscription> {
    Subscription::find()
        .filter(subscription::Column::UserId.eq(user_id))
        .filter(subscription::Column::IsActive.eq(true))
}

/// Retrieves the user's active subscriptions, newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_active_subscriptions(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<subscription::Model>> {
    owned_active(user_id)
        .order_by_desc(subscription::Column::CreatedAt)
        .order_by_desc(subscription::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves one active subscription owned by `user_id`.
///
/// # Errors
/// Returns `Error::SubscriptionNotFound` if the id is unknown, owned by another
/// user, or inactive; a database error if the query fails.
pub async fn get_subscription(
    db: &DatabaseConnection,
    user_id: i64,
    subscription_id: i64,
) -> Result<subscription::Model> {
    owned_active(user_id)
        .filter(subscription::Column::Id.eq(subscription_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::SubscriptionNotFound {
            id: subscription_id.to_string(),
        })
}

/// Creates a subscription for `user_id` from already validated fields.
///
/// # Errors
/// Returns an error if the database insert fails.
#[instrument(skip(db, new), fields(name = %new.name))]
pub async fn create_subscription(
    db: &DatabaseConnection,
    user_id: i64,
    new: NewSubscription,
) -> Result<subscription::Model> {
    let now = chrono::Utc::now().naive_utc();

    let model = subscription::ActiveModel {
        user_id: Set(user_id),
        name: Set(new.name),
        cost: Set(new.cost),
        billing_cycle: Set(new.billing_cycle.to_string()),
        renewal_date: Set(new.renewal_date),
        category: Set(new.category.to_string()),
        color: Set(new.color),
        notes: Set(new.notes),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(subscription_id = model.id, "Created subscription");
    Ok(model)
}

/// Applies a partial update to one of the user's active subscriptions.
///
/// Only the fields present in `changes` are written; `updated_at` is refreshed
/// even when `changes` is empty.
///
/// # Errors
/// Returns `Error::SubscriptionNotFound` under the same conditions as
/// [`get_subscription`], or a database error if the update fails.
#[instrument(skip(db, changes))]
pub async fn update_subscription(
    db: &DatabaseConnection,
    user_id: i64,
    subscription_id: i64,
    changes: SubscriptionChanges,
) -> Result<subscription::Model> {
    let mut active: subscription::ActiveModel =
        get_subscription(db, user_id, subscription_id).await?.into();

    if let Some(name) = changes.name {
        active.name = Set(name);
    }
    if let Some(cost) = changes.cost {
        active.cost = Set(cost);
    }
    if let Some(cycle) = changes.billing_cycle {
        active.billing_cycle = Set(cycle.to_string());
    }
    if let Some(renewal_date) = changes.renewal_date {
        active.renewal_date = Set(renewal_date);
    }
    if let Some(category) = changes.category {
        active.category = Set(category.to_string());
    }
    if let Some(color) = changes.color {
        active.color = Set(color);
    }
    if let Some(notes) = changes.notes {
        active.notes = Set(notes);
    }
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    let model = active.update(db).await?;
    info!("Updated subscription");
    Ok(model)
}

/// Soft deletes one of the user's subscriptions by clearing `is_active`.
/// The row is kept.
///
/// # Errors
/// Returns `Error::SubscriptionNotFound` under the same conditions as
/// [`get_subscription`], or a database error if the update fails.
#[instrument(skip(db))]
pub async fn delete_subscription(
    db: &DatabaseConnection,
    user_id: i64,
    subscription_id: i64,
) -> Result<subscription::Model> {
    let mut active: subscription::ActiveModel =
        get_subscription(db, user_id, subscription_id).await?.into();

    active.is_active = Set(false);
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    let model = active.update(db).await?;
    info!("Deactivated subscription");
    Ok(model)
}
