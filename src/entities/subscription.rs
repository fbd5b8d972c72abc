//! Subscription entity - Represents a recurring subscription tracked by a user.
//!
//! Each subscription has a name, cost, billing cycle, optional renewal date,
//! category, display color and notes. Subscriptions are never physically removed;
//! deleting one clears `is_active` so the record is kept but hidden.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Color assigned to a subscription when none is given.
pub const DEFAULT_COLOR: &str = "#6366f1";

/// Subscription database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    /// Unique identifier for the subscription
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning user
    pub user_id: i64,
    /// Display name (e.g., "Netflix", "iCloud+")
    pub name: String,
    /// Amount charged per billing cycle
    pub cost: f64,
    /// `monthly` or `yearly`, see [`BillingCycle`]
    pub billing_cycle: String,
    /// Next renewal date, if the user tracks it
    pub renewal_date: Option<Date>,
    /// One of the [`Category`] values
    pub category: String,
    /// Hex display color, `#RRGGBB`
    pub color: String,
    /// Free-form notes, at most 500 characters
    pub notes: String,
    /// Soft delete flag - if false, the subscription is hidden but data is preserved
    pub is_active: bool,
    /// When the subscription was created
    pub created_at: DateTime,
    /// When the subscription was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Subscription and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each subscription belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parsed billing cycle. Rows are only ever written through [`BillingCycle`],
    /// so an unknown value is treated as monthly.
    #[must_use]
    pub fn cycle(&self) -> BillingCycle {
        self.billing_cycle.parse().unwrap_or_default()
    }

    /// Parsed category, `other` for unknown values.
    #[must_use]
    pub fn category(&self) -> Category {
        self.category.parse().unwrap_or_default()
    }

    /// Cost normalized to one month.
    #[must_use]
    pub fn monthly_cost(&self) -> f64 {
        self.cycle().monthly_cost(self.cost)
    }
}

/// How often a subscription's cost is charged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    /// Charged every month
    #[default]
    Monthly,
    /// Charged once a year
    Yearly,
}

impl BillingCycle {
    /// Stored and serialized spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Normalizes `cost` charged once per cycle to a per-month amount.
    #[must_use]
    pub fn monthly_cost(self, cost: f64) -> f64 {
        match self {
            Self::Monthly => cost,
            Self::Yearly => cost / 12.0,
        }
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingCycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(format!("unknown billing cycle '{other}'")),
        }
    }
}

/// Subscription category used for the breakdown statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Streaming video, games
    Entertainment,
    /// Office suites, note taking
    Productivity,
    /// Gyms, workout apps
    Fitness,
    /// Courses, language learning
    Education,
    /// Music streaming
    Music,
    /// Newspapers, magazines
    News,
    /// Storage and hosting
    Cloud,
    /// Anything else
    #[default]
    Other,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Entertainment,
        Self::Productivity,
        Self::Fitness,
        Self::Education,
        Self::Music,
        Self::News,
        Self::Cloud,
        Self::Other,
    ];

    /// Stored and serialized spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entertainment => "entertainment",
            Self::Productivity => "productivity",
            Self::Fitness => "fitness",
            Self::Education => "education",
            Self::Music => "music",
            Self::News => "news",
            Self::Cloud => "cloud",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}
