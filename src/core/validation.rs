//! Request validation - the explicit pre-save step for subscriptions.
//!
//! Request bodies arrive loosely typed ([`SubscriptionInput`]) so that a wrong
//! enum value or a negative cost becomes a field-level error instead of a
//! deserialization failure. Every field is checked and all failures are reported
//! together.

use crate::{
    entities::subscription::{BillingCycle, Category, DEFAULT_COLOR},
    errors::{Error, FieldError, Result},
};
use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

/// Longest accepted subscription name, in characters.
pub const MAX_NAME_LEN: usize = 100;
/// Longest accepted notes text, in characters.
pub const MAX_NOTES_LEN: usize = 500;
/// Largest accepted cost. Keeps every total comfortably inside `f64` range.
pub const MAX_COST: f64 = 1_000_000_000.0;

#[allow(clippy::expect_used)]
static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("color pattern is valid"));

/// Subscription fields as sent by a client. All optional; which ones are
/// required depends on whether this is a create or an update.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInput {
    /// Display name
    pub name: Option<String>,
    /// Number, or a numeric string
    pub cost: Option<Value>,
    /// `monthly` or `yearly`
    pub billing_cycle: Option<String>,
    /// `YYYY-MM-DD` or RFC 3339; an empty string means "no date"
    pub renewal_date: Option<String>,
    /// One of the category names
    pub category: Option<String>,
    /// `#RRGGBB`
    pub color: Option<String>,
    /// Free-form text
    pub notes: Option<String>,
}

/// A validated subscription ready to insert, defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    /// Trimmed, non-empty name
    pub name: String,
    /// Non-negative cost per cycle
    pub cost: f64,
    /// Billing cycle, monthly by default
    pub billing_cycle: BillingCycle,
    /// Optional renewal date
    pub renewal_date: Option<NaiveDate>,
    /// Category, other by default
    pub category: Category,
    /// Display color
    pub color: String,
    /// Notes, empty by default
    pub notes: String,
}

impl NewSubscription {
    /// A monthly subscription in the `other` category with default color and no notes.
    #[must_use]
    pub fn new(name: impl Into<String>, cost: f64) -> Self {
        Self {
            name: name.into(),
            cost,
            billing_cycle: BillingCycle::default(),
            renewal_date: None,
            category: Category::default(),
            color: DEFAULT_COLOR.to_string(),
            notes: String::new(),
        }
    }
}

/// A validated partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionChanges {
    /// New name
    pub name: Option<String>,
    /// New cost
    pub cost: Option<f64>,
    /// New billing cycle
    pub billing_cycle: Option<BillingCycle>,
    /// `Some(None)` clears the renewal date
    pub renewal_date: Option<Option<NaiveDate>>,
    /// New category
    pub category: Option<Category>,
    /// New color
    pub color: Option<String>,
    /// New notes
    pub notes: Option<String>,
}

/// Validates a create request. `name` and `cost` are required.
///
/// # Errors
/// Returns `Error::Validation` listing every invalid or missing field.
pub fn validate_new_subscription(input: SubscriptionInput) -> Result<NewSubscription> {
    let mut errors = Vec::new();
    let missing_name = input.name.is_none();
    let missing_cost = input.cost.is_none();
    let changes = check_fields(input, &mut errors);

    if missing_name {
        errors.insert(0, FieldError::new("name", "Name is required"));
    }
    if missing_cost {
        errors.push(FieldError::new("cost", "Cost is required"));
    }

    match (changes.name, changes.cost) {
        (Some(name), Some(cost)) if errors.is_empty() => Ok(NewSubscription {
            name,
            cost,
            billing_cycle: changes.billing_cycle.unwrap_or_default(),
            renewal_date: changes.renewal_date.flatten(),
            category: changes.category.unwrap_or_default(),
            color: changes.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            notes: changes.notes.unwrap_or_default(),
        }),
        _ => Err(Error::Validation { errors }),
    }
}

/// Validates an update request. Every field is optional but each one present
/// must satisfy the same rules as on create.
///
/// # Errors
/// Returns `Error::Validation` listing every invalid field.
pub fn validate_subscription_changes(input: SubscriptionInput) -> Result<SubscriptionChanges> {
    let mut errors = Vec::new();
    let changes = check_fields(input, &mut errors);
    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(Error::Validation { errors })
    }
}

fn check_fields(input: SubscriptionInput, errors: &mut Vec<FieldError>) -> SubscriptionChanges {
    let mut changes = SubscriptionChanges::default();

    if let Some(name) = input.name {
        let name = name.trim();
        if name.is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        } else if name.chars().count() > MAX_NAME_LEN {
            errors.push(FieldError::new(
                "name",
                format!("Name must be at most {MAX_NAME_LEN} characters"),
            ));
        } else {
            changes.name = Some(name.to_string());
        }
    }

    if let Some(cost) = input.cost {
        match parse_cost(&cost) {
            Some(cost) => changes.cost = Some(cost),
            None => errors.push(FieldError::new(
                "cost",
                format!("Cost must be a non-negative number no greater than {MAX_COST}"),
            )),
        }
    }

    if let Some(cycle) = input.billing_cycle {
        match cycle.parse::<BillingCycle>() {
            Ok(cycle) => changes.billing_cycle = Some(cycle),
            Err(_) => errors.push(FieldError::new(
                "billingCycle",
                "Billing cycle must be monthly or yearly",
            )),
        }
    }

    if let Some(date) = input.renewal_date {
        if date.trim().is_empty() {
            changes.renewal_date = Some(None);
        } else {
            match parse_date(date.trim()) {
                Some(date) => changes.renewal_date = Some(Some(date)),
                None => errors.push(FieldError::new(
                    "renewalDate",
                    "Renewal date must be a valid date",
                )),
            }
        }
    }

    if let Some(category) = input.category {
        match category.parse::<Category>() {
            Ok(category) => changes.category = Some(category),
            Err(_) => errors.push(FieldError::new("category", "Invalid category")),
        }
    }

    if let Some(color) = input.color {
        if COLOR_RE.is_match(&color) {
            changes.color = Some(color);
        } else {
            errors.push(FieldError::new(
                "color",
                "Color must be a hex value like #6366f1",
            ));
        }
    }

    if let Some(notes) = input.notes {
        if notes.chars().count() > MAX_NOTES_LEN {
            errors.push(FieldError::new(
                "notes",
                format!("Notes must be at most {MAX_NOTES_LEN} characters"),
            ));
        } else {
            changes.notes = Some(notes);
        }
    }

    changes
}

/// Accepts JSON numbers and numeric strings between zero and [`MAX_COST`].
fn parse_cost(value: &Value) -> Option<f64> {
    let cost = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (cost.is_finite() && (0.0..=MAX_COST).contains(&cost)).then_some(cost)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}
