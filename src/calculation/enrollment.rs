//! Enrollment classification.
//!
//! This module derives the enrollment category from a participant's vesting
//! schedule and forfeiture history, and carries the legacy rule that skips
//! the classification refresh when the year's vesting percent is zero.

use rust_decimal::Decimal;

use crate::models::{EnrollmentCategory, VestingScheduleId};

/// Classifies a participant's enrollment for a profit year.
///
/// A pure, total lookup: every input pair maps to exactly one category and
/// the function never fails. The same inputs must classify identically
/// across the whole system and across the legacy system for reconciliation
/// to succeed.
///
/// Participants without an assigned schedule are disambiguated by plan
/// history: a participant with history but no schedule lost the schedule
/// during data import.
///
/// # Arguments
///
/// * `schedule` - The governing vesting schedule, if one is assigned
/// * `has_forfeited` - True if forfeiture records exist
/// * `has_plan_history` - True if any contribution or forfeiture history exists
///
/// # Example
///
/// ```
/// use vesting_engine::calculation::classify_enrollment;
/// use vesting_engine::models::{EnrollmentCategory, VestingScheduleId};
///
/// let category = classify_enrollment(Some(VestingScheduleId::OldPlan), true, true);
/// assert_eq!(category, EnrollmentCategory::OldPlanWithForfeitureRecords);
///
/// let category = classify_enrollment(None, false, false);
/// assert_eq!(category, EnrollmentCategory::NotEnrolled);
/// ```
pub fn classify_enrollment(
    schedule: Option<VestingScheduleId>,
    has_forfeited: bool,
    has_plan_history: bool,
) -> EnrollmentCategory {
    match (schedule, has_forfeited) {
        (Some(VestingScheduleId::OldPlan), false) => EnrollmentCategory::OldPlanWithContributions,
        (Some(VestingScheduleId::NewPlan), false) => EnrollmentCategory::NewPlanWithContributions,
        (Some(VestingScheduleId::OldPlan), true) => {
            EnrollmentCategory::OldPlanWithForfeitureRecords
        }
        (Some(VestingScheduleId::NewPlan), true) => {
            EnrollmentCategory::NewPlanWithForfeitureRecords
        }
        (None, _) => {
            if has_plan_history {
                EnrollmentCategory::ImportStatusUnknown
            } else {
                EnrollmentCategory::NotEnrolled
            }
        }
    }
}

/// Decides whether the year's classification refresh is applied.
///
/// The legacy system updates the enrollment classification lazily and skips
/// the update entirely when the computed vesting percent for the year is
/// zero. The snapshot then carries the prior year's category forward.
/// Skipping this skip produces a population-wide classification drift, so
/// the rule lives here as a named policy.
///
/// # Example
///
/// ```
/// use vesting_engine::calculation::should_update_enrollment;
/// use rust_decimal::Decimal;
///
/// assert!(!should_update_enrollment(Decimal::ZERO));
/// assert!(should_update_enrollment(Decimal::from(20)));
/// ```
pub fn should_update_enrollment(vesting_percent: Decimal) -> bool {
    vesting_percent > Decimal::ZERO
}
