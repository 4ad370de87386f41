//! Gym member model.

use chrono::NaiveDate;
use sqlx::FromRow;

/// A registered gym member.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct GymMember {
    /// Primary key
    pub member_id: i32,

    pub first_name: String,

    pub last_name: String,

    pub birthday: NaiveDate,

    /// Ten digits, unique across members
    pub phone_number: Option<String>,

    /// Unique across members
    pub email: Option<String>,

    /// Assigned by the store on insert
    pub date_joined: NaiveDate,
}

/// Validated fields for a new member. `date_joined` is never supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGymMember {
    pub first_name: String,
    pub last_name: String,
    pub birthday: NaiveDate,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

/// A single-field change to an existing member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberChange {
    FirstName(String),
    LastName(String),
    /// `None` clears the phone number
    PhoneNumber(Option<String>),
    /// `None` clears the email
    Email(Option<String>),
}

impl MemberChange {
    /// Human-readable name of the field being changed.
    pub fn label(&self) -> &'static str {
        match self {
            MemberChange::FirstName(_) => "First name",
            MemberChange::LastName(_) => "Last name",
            MemberChange::PhoneNumber(_) => "Phone number",
            MemberChange::Email(_) => "Email",
        }
    }

    /// Whether applying this change to `member` would leave it unchanged.
    pub fn is_noop_for(&self, member: &GymMember) -> bool {
        match self {
            MemberChange::FirstName(v) => *v == member.first_name,
            MemberChange::LastName(v) => *v == member.last_name,
            MemberChange::PhoneNumber(v) => *v == member.phone_number,
            MemberChange::Email(v) => *v == member.email,
        }
    }

    /// Apply the change to an in-memory copy.
    pub fn apply_to(&self, member: &mut GymMember) {
        match self {
            MemberChange::FirstName(v) => member.first_name = v.clone(),
            MemberChange::LastName(v) => member.last_name = v.clone(),
            MemberChange::PhoneNumber(v) => member.phone_number = v.clone(),
            MemberChange::Email(v) => member.email = v.clone(),
        }
    }
}
