//! Payment model.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::FromRow;

use super::UnknownValue;

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentType {
    Cash,
    Card,
    Online,
}

impl PaymentType {
    pub const ALL: [PaymentType; 3] = [PaymentType::Cash, PaymentType::Card, PaymentType::Online];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "CASH",
            PaymentType::Card => "CARD",
            PaymentType::Online => "ONLINE",
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = UnknownValue;

    /// Case-insensitive, so operators can type `card`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CASH" => Ok(PaymentType::Cash),
            "CARD" => Ok(PaymentType::Card),
            "ONLINE" => Ok(PaymentType::Online),
            _ => Err(UnknownValue::new("payment type", s)),
        }
    }
}

impl TryFrom<String> for PaymentType {
    type Error = UnknownValue;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Payment status values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Success,
    Pending,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Success,
        PaymentStatus::Pending,
        PaymentStatus::Failed,
        PaymentStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Success => "Success",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Refunded => "Refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Success" => Ok(PaymentStatus::Success),
            "Pending" => Ok(PaymentStatus::Pending),
            "Failed" => Ok(PaymentStatus::Failed),
            "Refunded" => Ok(PaymentStatus::Refunded),
            other => Err(UnknownValue::new("payment status", other)),
        }
    }
}

impl TryFrom<String> for PaymentStatus {
    type Error = UnknownValue;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Payment row.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Payment {
    pub payment_id: i32,

    /// Desk staff member who processed the payment
    pub staff_id: i32,

    pub member_id: i32,

    pub amount: Decimal,

    #[sqlx(try_from = "String")]
    pub payment_type: PaymentType,

    /// Assigned by the store on insert
    pub date_of_payment: NaiveDate,

    #[sqlx(try_from = "String")]
    pub status: PaymentStatus,
}

/// Fields for a new payment. The status is always `Success` on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub staff_id: i32,
    pub member_id: i32,
    pub amount: Decimal,
    pub payment_type: PaymentType,
}

/// Row returned by `gym.member_payment_history(member_id)`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PaymentHistoryRow {
    pub payment_id: i32,
    pub date_of_payment: NaiveDate,
    pub amount: Decimal,
    pub payment_type: String,
    pub status: String,
    pub staff_id: i32,
}
