//! Subscription statistics - cost normalization and summary aggregation.
//!
//! All amounts are normalized to a monthly cost first (`cost / 12` for yearly
//! subscriptions). Sums are kept at full precision and rounded to cents only when
//! building the output, so `yearly` is always derived from the unrounded monthly sum.

use crate::{
    entities::subscription::{self, BillingCycle, Category},
    errors::Result,
};
use chrono::{Days, NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::BTreeMap;

/// How far ahead a renewal counts as upcoming.
pub const RENEWAL_WINDOW_DAYS: u64 = 30;
/// Maximum number of upcoming renewals reported.
pub const UPCOMING_RENEWALS_LIMIT: usize = 5;

/// Monthly and yearly cost totals, rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    /// Sum of monthly costs
    pub monthly: f64,
    /// Twelve times the unrounded monthly sum
    pub yearly: f64,
}

/// A renewal falling inside the upcoming window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingRenewal {
    /// Subscription id
    pub id: i64,
    /// Subscription name
    pub name: String,
    /// Date of the renewal
    pub renewal_date: NaiveDate,
    /// Cost charged at renewal
    pub cost: f64,
    /// Cycle the cost applies to
    pub billing_cycle: BillingCycle,
}

/// Summary statistics over a user's active subscriptions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Cost totals
    pub totals: Totals,
    /// Monthly cost per category; categories without subscriptions are absent
    pub category_breakdown: BTreeMap<Category, f64>,
    /// Soonest renewals, ascending by date
    pub upcoming_renewals: Vec<UpcomingRenewal>,
    /// Number of subscriptions aggregated
    pub subscription_count: usize,
}

/// Rounds to two decimal places. Values too large to scale by 100 are
/// returned as is.
#[must_use]
pub fn round_cents(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        value
    }
}

/// Computes the monthly and yearly totals of `subscriptions`.
#[must_use]
pub fn calculate_totals(subscriptions: &[subscription::Model]) -> Totals {
    let monthly: f64 = subscriptions.iter().map(subscription::Model::monthly_cost).sum();
    Totals {
        monthly: round_cents(monthly),
        yearly: round_cents(monthly * 12.0),
    }
}

/// Sums the monthly cost of `subscriptions` per category.
#[must_use]
pub fn category_breakdown(subscriptions: &[subscription::Model]) -> BTreeMap<Category, f64> {
    subscriptions
        .iter()
        .fold(BTreeMap::new(), |mut breakdown, sub| {
            *breakdown.entry(sub.category()).or_insert(0.0) += sub.monthly_cost();
            breakdown
        })
}

/// Selects subscriptions renewing on or before `today + RENEWAL_WINDOW_DAYS`,
/// soonest first, at most [`UPCOMING_RENEWALS_LIMIT`] of them.
///
/// Subscriptions without a renewal date are skipped. Past-due dates are kept.
#[must_use]
pub fn upcoming_renewals(
    subscriptions: &[subscription::Model],
    today: NaiveDate,
) -> Vec<UpcomingRenewal> {
    let horizon = today
        .checked_add_days(Days::new(RENEWAL_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MAX);

    let mut renewals: Vec<UpcomingRenewal> = subscriptions
        .iter()
        .filter_map(|sub| {
            let renewal_date = sub.renewal_date.filter(|date| *date <= horizon)?;
            Some(UpcomingRenewal {
                id: sub.id,
                name: sub.name.clone(),
                renewal_date,
                cost: sub.cost,
                billing_cycle: sub.cycle(),
            })
        })
        .collect();

    renewals.sort_by_key(|r| r.renewal_date);
    renewals.truncate(UPCOMING_RENEWALS_LIMIT);
    renewals
}

/// Builds the full statistics for `subscriptions` as of `today`.
#[must_use]
pub fn calculate_stats(subscriptions: &[subscription::Model], today: NaiveDate) -> Stats {
    Stats {
        totals: calculate_totals(subscriptions),
        category_breakdown: category_breakdown(subscriptions),
        upcoming_renewals: upcoming_renewals(subscriptions, today),
        subscription_count: subscriptions.len(),
    }
}

/// Loads the user's active subscriptions and aggregates them as of today (UTC).
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_stats(db: &DatabaseConnection, user_id: i64) -> Result<Stats> {
    let subscriptions =
        crate::core::subscription::list_active_subscriptions(db, user_id).await?;
    Ok(calculate_stats(&subscriptions, Utc::now().date_naive()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    fn sub(id: i64, cost: f64, cycle: BillingCycle, category: Category) -> subscription::Model {
        let now = Utc::now().naive_utc();
        subscription::Model {
            id,
            user_id: 1,
            name: format!("Sub {id}"),
            cost,
            billing_cycle: cycle.to_string(),
            renewal_date: None,
            category: category.to_string(),
            color: subscription::DEFAULT_COLOR.to_string(),
            notes: String::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn renewing(id: i64, date: NaiveDate) -> subscription::Model {
        subscription::Model {
            renewal_date: Some(date),
            ..sub(id, 10.0, BillingCycle::Monthly, Category::Other)
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_totals_mixed_cycles() {
        let subs = vec![
            sub(1, 12.0, BillingCycle::Monthly, Category::Music),
            sub(2, 120.0, BillingCycle::Yearly, Category::Cloud),
        ];
        let totals = calculate_totals(&subs);
        assert_eq!(totals.monthly, 22.0);
        assert_eq!(totals.yearly, 264.0);
    }

    #[test]
    fn test_yearly_derives_from_unrounded_monthly() {
        // 10/12 = 0.8333.. per month; rounding first would give 0.83 * 12 = 9.96
        let subs = vec![sub(1, 10.0, BillingCycle::Yearly, Category::News)];
        let totals = calculate_totals(&subs);
        assert_eq!(totals.monthly, 0.83);
        assert_eq!(totals.yearly, 10.0);
    }

    #[test]
    fn test_round_cents_keeps_huge_values_finite() {
        assert_eq!(round_cents(22.0 / 3.0), 7.33);
        assert_eq!(round_cents(1.7e308), 1.7e308);
        assert!(round_cents(f64::MAX).is_finite());
    }

    #[test]
    fn test_empty_set() {
        let stats = calculate_stats(&[], date(2026, 10, 16));
        assert_eq!(stats.totals, Totals { monthly: 0.0, yearly: 0.0 });
        assert!(stats.category_breakdown.is_empty());
        assert!(stats.upcoming_renewals.is_empty());
        assert_eq!(stats.subscription_count, 0);
    }

    #[test]
    fn test_category_breakdown_omits_empty_categories() {
        let subs = vec![
            sub(1, 10.0, BillingCycle::Monthly, Category::Entertainment),
            sub(2, 5.0, BillingCycle::Monthly, Category::Entertainment),
            sub(3, 60.0, BillingCycle::Yearly, Category::Fitness),
        ];
        let breakdown = category_breakdown(&subs);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[&Category::Entertainment], 15.0);
        assert_eq!(breakdown[&Category::Fitness], 5.0);
        assert!(!breakdown.contains_key(&Category::Other));
    }

    #[test]
    fn test_upcoming_renewals_window_order_and_limit() {
        let today = date(2026, 10, 16);
        let subs = vec![
            renewing(1, date(2026, 11, 10)),
            renewing(2, date(2026, 10, 20)),
            renewing(3, date(2026, 11, 15)), // exactly today + 30
            renewing(4, date(2026, 11, 16)), // outside the window
            renewing(5, date(2026, 10, 17)),
            renewing(6, date(2026, 10, 30)),
            renewing(7, date(2026, 10, 25)),
            sub(8, 10.0, BillingCycle::Monthly, Category::Other),
        ];

        let renewals = upcoming_renewals(&subs, today);
        let ids: Vec<i64> = renewals.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 2, 7, 6, 1]);
        assert!(renewals.windows(2).all(|w| w[0].renewal_date <= w[1].renewal_date));
        assert!(renewals.iter().all(|r| r.renewal_date <= date(2026, 11, 15)));
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let today = date(2026, 10, 16);
        let renewals = upcoming_renewals(&[renewing(3, date(2026, 11, 15))], today);
        assert_eq!(renewals.len(), 1);
        assert_eq!(renewals[0].name, "Sub 3");
        assert_eq!(renewals[0].billing_cycle, BillingCycle::Monthly);
    }

    #[test]
    fn test_missing_renewal_date_still_counted_in_totals() {
        let subs = vec![
            sub(1, 9.0, BillingCycle::Monthly, Category::Other),
            renewing(2, date(2026, 10, 20)),
        ];
        let stats = calculate_stats(&subs, date(2026, 10, 16));
        assert_eq!(stats.totals.monthly, 19.0);
        assert_eq!(stats.upcoming_renewals.len(), 1);
        assert_eq!(stats.subscription_count, 2);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = calculate_stats(
            &[renewing(1, date(2026, 10, 20))],
            date(2026, 10, 16),
        );
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totals"]["monthly"], 10.0);
        assert_eq!(json["categoryBreakdown"]["other"], 10.0);
        assert_eq!(json["upcomingRenewals"][0]["renewalDate"], "2026-10-20");
        assert_eq!(json["upcomingRenewals"][0]["billingCycle"], "monthly");
        assert_eq!(json["subscriptionCount"], 1);
    }
}
