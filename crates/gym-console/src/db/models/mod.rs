//! Row types for the `gym` schema.
//!
//! Enumerated columns are stored as TEXT and decoded with
//! `#[sqlx(try_from = "String")]`, so a value outside the CHECK constraint
//! surfaces as a column decode error instead of a silent default.

pub mod activity;
pub mod member;
pub mod membership;
pub mod payment;
pub mod plan;
pub mod staff;

pub use activity::*;
pub use member::*;
pub use membership::*;
pub use payment::*;
pub use plan::*;
pub use staff::*;

use thiserror::Error;

/// A TEXT column held a value that is not one of the enum's literals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownValue {
    pub(crate) fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
