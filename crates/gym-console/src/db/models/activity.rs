//! Read-only activity rows: check-ins, guests and trainer assignments.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CheckIn {
    pub check_in_id: i32,
    pub membership_id: i32,
    /// Staff member who checked the member in
    pub staff_id: Option<i32>,
    pub ts: NaiveDateTime,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Guest {
    pub guest_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

/// Guest visit joined with the guest's name.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct GuestVisit {
    pub visit_id: i32,
    pub guest_id: i32,
    pub guest_first_name: String,
    pub guest_last_name: String,
    /// Member who brought the guest
    pub member_id: Option<i32>,
    pub visit_date: NaiveDate,
}

/// Trainer-to-member assignment with both names resolved.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TrainerAssignment {
    pub trainer_id: i32,
    pub trainer_first_name: String,
    pub trainer_last_name: String,
    pub member_id: i32,
    pub member_first_name: String,
    pub member_last_name: String,
}
