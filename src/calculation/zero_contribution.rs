//! Zero-contribution gating.
//!
//! This module decides why a participant receives no contribution posting
//! for the year. The reasons gate whether a contribution is posted and are
//! carried on the snapshot for audit and report purposes; they never alter
//! the vesting formula.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::EligibilityConfig;
use crate::models::{Participant, ZeroContributionReason};

use super::{age_at, years_in_plan};

/// Determines the zero-contribution reason for a participant, if any.
///
/// Evaluated in plan-document order:
/// 1. Normal retirement age reached with the first contribution at least
///    the configured service years prior: 100% vesting, no posting.
/// 2. Under 21 at year end despite a qualifying-hours year: no posting yet.
/// 3. Terminated during the year with qualifying hours: the year still
///    counts for vesting, but nothing is posted.
///
/// Returns `None` when a normal contribution posting applies.
///
/// # Arguments
///
/// * `participant` - The participant being evaluated
/// * `year_end` - December 31 of the profit year
/// * `eligibility` - The configured thresholds
pub fn determine_zero_contribution_reason(
    participant: &Participant,
    year_end: NaiveDate,
    eligibility: &EligibilityConfig,
) -> Option<ZeroContributionReason> {
    let age = age_at(participant.date_of_birth, year_end);
    let qualifying_hours = participant.hours >= Decimal::from(eligibility.qualifying_hours);

    if age >= eligibility.normal_retirement_age {
        let service_years = participant
            .enrollment_start
            .map(|start| years_in_plan(start, year_end))
            .unwrap_or(0);
        if service_years >= eligibility.retirement_service_years {
            return Some(ZeroContributionReason::RetirementFullVesting);
        }
    }

    if age < eligibility.military_minimum_age && qualifying_hours {
        return Some(ZeroContributionReason::UnderAge21WithHours);
    }

    if participant.terminated_by(year_end) && qualifying_hours {
        return Some(ZeroContributionReason::TerminatedWithHours);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmploymentStatus, VestingScheduleId};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn eligibility() -> EligibilityConfig {
        EligibilityConfig {
            qualifying_hours: 1000,
            minimum_entry_age: 18,
            military_minimum_age: 21,
            normal_retirement_age: 65,
            lookback_window_years: 5,
            military_floor_year: 2020,
            retirement_service_years: 5,
        }
    }

    fn participant(date_of_birth: NaiveDate) -> Participant {
        Participant {
            badge: 703917,
            ssn: "123456789".to_string(),
            date_of_birth,
            hire_date: date(2015, 6, 12),
            rehire_date: None,
            termination_date: None,
            employment_status: EmploymentStatus::Active,
            store: 44,
            department: 3,
            vesting_schedule: Some(VestingScheduleId::NewPlan),
            has_forfeited: false,
            enrollment_start: Some(date(2016, 12, 31)),
            prior_enrollment: None,
            hours: dec("2080"),
            wages: dec("54210.55"),
            current_balance: dec("88340.12"),
            beneficiary_allocations: vec![],
        }
    }

    #[test]
    fn test_normal_posting_has_no_reason() {
        let p = participant(date(1980, 5, 20));
        assert_eq!(
            determine_zero_contribution_reason(&p, date(2024, 12, 31), &eligibility()),
            None
        );
    }

    #[test]
    fn test_under_21_with_qualifying_hours() {
        let p = participant(date(2005, 3, 10));
        assert_eq!(
            determine_zero_contribution_reason(&p, date(2024, 12, 31), &eligibility()),
            Some(ZeroContributionReason::UnderAge21WithHours)
        );
    }

    #[test]
    fn test_under_21_without_qualifying_hours() {
        let mut p = participant(date(2005, 3, 10));
        p.hours = dec("600");
        assert_eq!(
            determine_zero_contribution_reason(&p, date(2024, 12, 31), &eligibility()),
            None
        );
    }

    #[test]
    fn test_terminated_with_qualifying_hours() {
        let mut p = participant(date(1980, 5, 20));
        p.termination_date = Some(date(2024, 9, 1));
        p.employment_status = EmploymentStatus::Terminated;
        assert_eq!(
            determine_zero_contribution_reason(&p, date(2024, 12, 31), &eligibility()),
            Some(ZeroContributionReason::TerminatedWithHours)
        );
    }

    #[test]
    fn test_retirement_with_five_years_of_service() {
        let mut p = participant(date(1958, 2, 1));
        p.enrollment_start = Some(date(2017, 12, 31));
        assert_eq!(
            determine_zero_contribution_reason(&p, date(2024, 12, 31), &eligibility()),
            Some(ZeroContributionReason::RetirementFullVesting)
        );
    }

    #[test]
    fn test_retirement_age_without_service_falls_through() {
        // 65+ but first contribution only three years ago: the retirement
        // rule does not apply and the active participant posts normally.
        let mut p = participant(date(1958, 2, 1));
        p.enrollment_start = Some(date(2021, 12, 31));
        assert_eq!(
            determine_zero_contribution_reason(&p, date(2024, 12, 31), &eligibility()),
            None
        );
    }

    #[test]
    fn test_retirement_takes_precedence_over_termination() {
        let mut p = participant(date(1955, 7, 4));
        p.enrollment_start = Some(date(2010, 12, 31));
        p.termination_date = Some(date(2024, 8, 15));
        p.employment_status = EmploymentStatus::Retired;
        assert_eq!(
            determine_zero_contribution_reason(&p, date(2024, 12, 31), &eligibility()),
            Some(ZeroContributionReason::RetirementFullVesting)
        );
    }
}
