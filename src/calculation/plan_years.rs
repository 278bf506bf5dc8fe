//! Plan-year credit evaluation.
//!
//! This module computes how many years a participant has been in the plan,
//! including the newly-eligible increment applied when a participant's
//! first contribution for the year being evaluated has not been posted yet.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::config::EligibilityConfig;

/// Computes whole years in the plan as of a date.
///
/// The count is the floor of whole years elapsed since the first qualifying
/// contribution, using the same anniversary arithmetic as
/// [`age_at`](super::age_at).
///
/// # Example
///
/// ```
/// use vesting_engine::calculation::years_in_plan;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2019, 12, 31).unwrap();
/// let year_end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
/// assert_eq!(years_in_plan(start, year_end), 5);
/// ```
pub fn years_in_plan(enrollment_start: NaiveDate, as_of: NaiveDate) -> i32 {
    let mut years = as_of.year() - enrollment_start.year();
    if (as_of.month(), as_of.day()) < (enrollment_start.month(), enrollment_start.day()) {
        years -= 1;
    }
    years.max(0)
}

/// Decides whether the newly-eligible plan-year increment applies.
///
/// The mainframe counts a plan year only once the year's contribution is
/// posted. This engine credits the year one posting cycle earlier: the
/// count is incremented by one relative to the legacy figure if and only if
/// no contribution exists yet for the year being evaluated, the participant
/// worked at least the qualifying hours, and the participant has reached
/// the minimum entry age. This is a documented, intentional divergence and
/// must be reproduced exactly.
///
/// # Arguments
///
/// * `has_current_year_contribution` - True if a contribution is already
///   posted for the profit year being evaluated
/// * `hours` - Hours worked during the profit year
/// * `age` - The participant's age at year end
/// * `eligibility` - The configured hour and age thresholds
pub fn newly_eligible_increment(
    has_current_year_contribution: bool,
    hours: Decimal,
    age: i32,
    eligibility: &EligibilityConfig,
) -> bool {
    !has_current_year_contribution
        && hours >= Decimal::from(eligibility.qualifying_hours)
        && age >= eligibility.minimum_entry_age
}

/// Computes the credited plan years for a profit year.
///
/// The base count comes from [`years_in_plan`] when a first qualifying
/// contribution exists, zero otherwise; the newly-eligible increment is
/// then added when [`newly_eligible_increment`] applies.
///
/// # Arguments
///
/// * `enrollment_start` - Date of the first qualifying contribution, if any
/// * `as_of` - The year-end date of the profit year being evaluated
/// * `has_current_year_contribution` - True if a contribution is already
///   posted for the profit year
/// * `hours` - Hours worked during the profit year
/// * `age` - Age at year end
/// * `eligibility` - The configured thresholds
pub fn credited_plan_years(
    enrollment_start: Option<NaiveDate>,
    as_of: NaiveDate,
    has_current_year_contribution: bool,
    hours: Decimal,
    age: i32,
    eligibility: &EligibilityConfig,
) -> i32 {
    let base = enrollment_start
        .map(|start| years_in_plan(start, as_of))
        .unwrap_or(0);

    if newly_eligible_increment(has_current_year_contribution, hours, age, eligibility) {
        base + 1
    } else {
        base
    }
}
