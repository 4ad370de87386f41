//! Plan and plan type models.

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::FromRow;

use super::UnknownValue;

/// The plan types the gym offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanType {
    Monthly,
    MonthlyPremium,
    Annual,
}

impl PlanType {
    pub const ALL: [PlanType; 3] = [PlanType::Monthly, PlanType::MonthlyPremium, PlanType::Annual];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Monthly => "Monthly",
            PlanType::MonthlyPremium => "Monthly Premium",
            PlanType::Annual => "Annual",
        }
    }

    /// Price used by the default plan setup.
    pub fn default_price(&self) -> Decimal {
        match self {
            PlanType::Monthly => Decimal::new(2999, 2),
            PlanType::MonthlyPremium => Decimal::new(4999, 2),
            PlanType::Annual => Decimal::new(29999, 2),
        }
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlanType {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Monthly" => Ok(PlanType::Monthly),
            "Monthly Premium" => Ok(PlanType::MonthlyPremium),
            "Annual" => Ok(PlanType::Annual),
            other => Err(UnknownValue::new("plan type", other)),
        }
    }
}

/// Price list entry, keyed by plan type.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PlanTypeInfo {
    /// Kept as text; workflows decode it into [`PlanType`] when they need
    /// to compute a term.
    pub plan_type: String,

    pub price: Decimal,
}

/// A purchasable plan: plan row joined with its price.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PlanOffer {
    pub plan_id: i32,
    pub plan_type: String,
    pub price: Decimal,
}
