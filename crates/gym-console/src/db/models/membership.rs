//! Membership model.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::FromRow;

use super::UnknownValue;

/// Membership status values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipStatus {
    Active,
    Paused,
    Cancelled,
}

impl MembershipStatus {
    pub const ALL: [MembershipStatus; 3] = [
        MembershipStatus::Active,
        MembershipStatus::Paused,
        MembershipStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "Active",
            MembershipStatus::Paused => "Paused",
            MembershipStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MembershipStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(MembershipStatus::Active),
            "Paused" => Ok(MembershipStatus::Paused),
            "Cancelled" => Ok(MembershipStatus::Cancelled),
            other => Err(UnknownValue::new("membership status", other)),
        }
    }
}

impl TryFrom<String> for MembershipStatus {
    type Error = UnknownValue;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Membership row.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Membership {
    pub membership_id: i32,

    pub member_id: i32,

    pub plan_id: i32,

    pub start_date: NaiveDate,

    /// Derived from the plan type at purchase or transfer time
    pub end_date: NaiveDate,

    #[sqlx(try_from = "String")]
    pub status: MembershipStatus,
}

/// Fields for a new membership. The status is always `Active` on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMembership {
    pub member_id: i32,
    pub plan_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Membership joined with its member and plan, for reporting.
#[derive(Debug, Clone, FromRow)]
pub struct MembershipRow {
    pub membership_id: i32,
    pub member_id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub status: String,
    pub plan_type: Option<String>,
    pub price: Option<Decimal>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        for status in MembershipStatus::ALL {
            assert_eq!(status.as_str().parse::<MembershipStatus>(), Ok(status));
        }
        let err = "active".parse::<MembershipStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown membership status 'active'");
    }
}
