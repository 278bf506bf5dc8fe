//! Age evaluation.
//!
//! This module provides the age-at-date rule used by eligibility checks,
//! the zero-contribution gate, and the military contribution validator.

use chrono::{Datelike, NaiveDate};

/// Computes a participant's age in whole years as of a date.
///
/// The result is the floor of whole years elapsed: one is subtracted when
/// the as-of date precedes the birthday in the as-of year. A February 29
/// birth date is treated as not yet reached on February 28 of a non-leap
/// year and reached on March 1.
///
/// # Arguments
///
/// * `date_of_birth` - The participant's date of birth
/// * `as_of` - The date to evaluate the age at
///
/// # Example
///
/// ```
/// use vesting_engine::calculation::age_at;
/// use chrono::NaiveDate;
///
/// let dob = NaiveDate::from_ymd_opt(1961, 4, 2).unwrap();
///
/// // Day before the birthday
/// let eve = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
/// assert_eq!(age_at(dob, eve), 62);
///
/// // On the birthday
/// let birthday = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
/// assert_eq!(age_at(dob, birthday), 63);
/// ```
pub fn age_at(date_of_birth: NaiveDate, as_of: NaiveDate) -> i32 {
    let mut age = as_of.year() - date_of_birth.year();
    if (as_of.month(), as_of.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}
