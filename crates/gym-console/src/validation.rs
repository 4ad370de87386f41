//! Input validation for operator-entered fields.
//!
//! The predicates at the top of this module are total: they never fail on
//! malformed input, they answer `bool` or return a normalized value. The
//! `require_*` / `optional_*` helpers below them turn raw input into typed
//! values and report the first problem as [`AppError::Validation`].

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, Months, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;

use crate::db::models::PaymentType;
use crate::error::{AppError, AppResult};

/// Minimum age, in whole years, to be registered or to buy a membership.
pub const MINIMUM_MEMBER_AGE: i32 = 16;

/// Exclusive upper bound for money columns, which are `NUMERIC(10, 2)`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// Digits a stored phone number must have.
pub const PHONE_DIGITS: usize = 10;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+$").expect("email pattern compiles"));

static DATE_FORMAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern compiles"));

const DAY: &str = "(Mon|Tue|Wed|Thu|Fri|Sat|Sun)";
const HOURS: &str = r"[0-9]{1,2}(AM|PM)-[0-9]{1,2}(AM|PM)";

static SINGLE_DAY_SCHEDULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{DAY}-[ \t]+{HOURS}$")).expect("schedule pattern compiles")
});

static DAY_RANGE_SCHEDULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{DAY}-{DAY}[ \t]+{HOURS}$")).expect("schedule pattern compiles")
});

/// Why a date string was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateError {
    /// Not shaped like `YYYY-MM-DD`.
    Format,
    /// Shaped correctly but not a calendar date (e.g. `2023-02-30`).
    Invalid,
}

/// A name is non-empty and contains no digit.
pub fn is_valid_name(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(|c| c.is_ascii_digit())
}

/// Strip everything except ASCII digits.
pub fn normalize_phone(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// A phone number is valid when exactly ten digits remain after normalization.
pub fn is_valid_phone(s: &str) -> bool {
    normalize_phone(s).len() == PHONE_DIGITS
}

/// Empty is valid (the field is optional); otherwise `local@domain.tld`.
pub fn is_valid_email(s: &str) -> bool {
    s.is_empty() || EMAIL_RE.is_match(s)
}

/// Strict `YYYY-MM-DD` shape check. Says nothing about calendar validity.
pub fn is_valid_date_format(s: &str) -> bool {
    DATE_FORMAT_RE.is_match(s)
}

/// Parse a `YYYY-MM-DD` date, separating shape errors from calendar errors.
pub fn parse_date(s: &str) -> Result<NaiveDate, DateError> {
    if !is_valid_date_format(s) {
        return Err(DateError::Format);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| DateError::Invalid)
}

/// Age in whole years on `today`.
///
/// Decrements when today's day-of-year is before the birthday's day-of-year.
/// Around Feb 29 in leap years this can be off by one; kept as is because the
/// age restriction boundary depends on it.
pub fn calculate_age(birthdate: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birthdate.year();
    if today.ordinal() < birthdate.ordinal() {
        age -= 1;
    }
    age
}

/// `Mon- 9AM-5PM` (single day) or `Mon-Fri 9AM-5PM` (day range).
///
/// Both shapes need whitespace before the hours, so `Mon-9AM-5PM` is rejected.
pub fn is_valid_schedule_format(s: &str) -> bool {
    !s.is_empty() && (SINGLE_DAY_SCHEDULE_RE.is_match(s) || DAY_RANGE_SCHEDULE_RE.is_match(s))
}

/// End of a membership term starting on `start` for the given plan type.
///
/// Monthly plans add one calendar month, annual plans one calendar year
/// (both clamp to the last day of a shorter month). Any other plan type
/// leaves the date unchanged.
pub fn calculate_end_date(start: NaiveDate, plan_type: &str) -> NaiveDate {
    let months = match plan_type {
        "Monthly" | "Monthly Premium" => 1,
        "Annual" => 12,
        _ => return start,
    };
    start.checked_add_months(Months::new(months)).unwrap_or(start)
}

/// Required person name: trimmed, non-empty, no digits.
pub fn require_name(label: &str, input: &str) -> AppResult<String> {
    let value = input.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} is required.", label)));
    }
    if !is_valid_name(value) {
        return Err(AppError::Validation(format!(
            "{} cannot contain numbers.",
            label
        )));
    }
    Ok(value.to_string())
}

/// Required free text.
pub fn require_text(label: &str, input: &str) -> AppResult<String> {
    let value = input.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} is required.", label)));
    }
    Ok(value.to_string())
}

/// Optional free text; empty becomes `None`.
pub fn optional_text(input: &str) -> Option<String> {
    let value = input.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Optional phone number, normalized to ten digits.
pub fn optional_phone(input: &str) -> AppResult<Option<String>> {
    let value = input.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let digits = normalize_phone(value);
    if digits.is_empty() {
        return Err(AppError::Validation(
            "Phone number must contain 10 digits.".to_string(),
        ));
    }
    if digits.len() != PHONE_DIGITS {
        return Err(AppError::Validation(
            "Phone number must be exactly 10 digits.".to_string(),
        ));
    }
    Ok(Some(digits))
}

/// Optional email address.
pub fn optional_email(input: &str) -> AppResult<Option<String>> {
    let value = input.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if !is_valid_email(value) {
        return Err(AppError::Validation(
            "Invalid email format. Email must contain @ symbol and a domain (e.g., .com)."
                .to_string(),
        ));
    }
    Ok(Some(value.to_string()))
}

/// Required `YYYY-MM-DD` date.
pub fn require_date(label: &str, input: &str) -> AppResult<NaiveDate> {
    let value = input.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} is required.", label)));
    }
    date_or_error(value)
}

/// Optional `YYYY-MM-DD` date; empty falls back to `default`.
pub fn date_or_default(input: Option<&str>, default: NaiveDate) -> AppResult<NaiveDate> {
    match input.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => date_or_error(value),
    }
}

fn date_or_error(value: &str) -> AppResult<NaiveDate> {
    parse_date(value).map_err(|e| match e {
        DateError::Format => AppError::Validation(
            "Invalid date format. Please use YYYY-MM-DD format.".to_string(),
        ),
        DateError::Invalid => AppError::Validation("Invalid date.".to_string()),
    })
}

/// Birthday for a new member: a past date giving an age of at least 16.
pub fn require_birthday(input: &str, today: NaiveDate) -> AppResult<NaiveDate> {
    let birthday = require_date("Birthday", input)?;
    if birthday > today {
        return Err(AppError::Validation(
            "Birthday cannot be in the future.".to_string(),
        ));
    }
    let age = calculate_age(birthday, today);
    if age < MINIMUM_MEMBER_AGE {
        return Err(AppError::AgeRestriction { age });
    }
    Ok(birthday)
}

/// Required schedule in one of the two accepted shapes.
pub fn require_schedule(input: &str) -> AppResult<String> {
    let value = require_text("Schedule", input)?;
    if !is_valid_schedule_format(&value) {
        return Err(AppError::Validation(
            "Invalid schedule format. Use 'Mon- 9AM-5PM' for single day or 'Mon-Fri 9AM-5PM' for multiple days."
                .to_string(),
        ));
    }
    Ok(value)
}

/// Required monetary amount that must be `>= 0` (salaries).
pub fn require_salary(input: &str) -> AppResult<Decimal> {
    let amount = require_amount("Salary", input)?;
    if amount < Decimal::ZERO {
        return Err(AppError::Validation("Salary must be >= 0.".to_string()));
    }
    Ok(amount)
}

/// Required monetary amount that must be `> 0` (plan prices).
pub fn require_price(input: &str) -> AppResult<Decimal> {
    let amount = require_amount("Price", input)?;
    if amount <= Decimal::ZERO {
        return Err(AppError::Validation(
            "Price must be greater than 0.".to_string(),
        ));
    }
    Ok(amount)
}

fn require_amount(label: &str, input: &str) -> AppResult<Decimal> {
    let value = input.trim().trim_start_matches('$');
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} is required.", label)));
    }
    let amount = Decimal::from_str(value)
        .map(|d| d.round_dp(2))
        .map_err(|_| AppError::Validation(format!("Invalid {} format.", label.to_lowercase())))?;
    if amount >= MAX_AMOUNT {
        return Err(AppError::Validation(format!(
            "{} must be less than {}.",
            label, MAX_AMOUNT
        )));
    }
    Ok(amount)
}

/// Required years of experience, `>= 0`.
pub fn require_experience(input: &str) -> AppResult<i32> {
    let value = input.trim();
    if value.is_empty() {
        return Err(AppError::Validation("Experience is required.".to_string()));
    }
    experience_or_error(value)
}

/// Optional years of experience, `>= 0`.
pub fn optional_experience(input: &str) -> AppResult<Option<i32>> {
    let value = input.trim();
    if value.is_empty() {
        return Ok(None);
    }
    experience_or_error(value).map(Some)
}

fn experience_or_error(value: &str) -> AppResult<i32> {
    let years: i32 = value
        .parse()
        .map_err(|_| AppError::Validation("Invalid experience format.".to_string()))?;
    if years < 0 {
        return Err(AppError::Validation("Experience must be >= 0.".to_string()));
    }
    Ok(years)
}

/// CASH, CARD or ONLINE, in any case.
pub fn require_payment_type(input: &str) -> AppResult<PaymentType> {
    PaymentType::from_str(input).map_err(|_| {
        AppError::Validation("Invalid payment type. Must be CASH, CARD, or ONLINE.".to_string())
    })
}

/// Row ids entered by the operator must be positive.
pub fn require_id(label: &str, id: i32) -> AppResult<i32> {
    if id <= 0 {
        return Err(AppError::Validation(format!("Invalid {}.", label)));
    }
    Ok(id)
}
