//! Military/special contribution validation.
//!
//! A sequential rule chain enforcing eligibility for out-of-cycle
//! contributions. The chain evaluates every rule whose preconditions hold
//! and collects all violations; rules that depend on a resolvable badge
//! are skipped, not fabricated, when badge resolution fails.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tracing::debug;

use crate::calculation::{age_at, is_within_lookback_window};
use crate::config::EligibilityConfig;
use crate::lookup::{ContributionLedger, EmployeeDirectory};
use crate::metrics::MetricsSink;
use crate::models::MilitaryContribution;

use super::rule::{RuleOutcome, ValidationReport};

/// Validates military and special contributions against the plan rules.
///
/// The external demographic and history lookups are fetched once per badge
/// per request, so the chained rules do not repeat round trips. Every rule
/// failure increments a named counter through the injected metrics sink.
///
/// # Example
///
/// ```no_run
/// use vesting_engine::config::ConfigLoader;
/// use vesting_engine::lookup::{InMemoryDirectory, InMemoryLedger};
/// use vesting_engine::metrics::NullMetrics;
/// use vesting_engine::validation::MilitaryContributionValidator;
///
/// let loader = ConfigLoader::load("./config/plan").unwrap();
/// let directory = InMemoryDirectory::default();
/// let ledger = InMemoryLedger::default();
/// let metrics = NullMetrics;
///
/// let validator = MilitaryContributionValidator::new(
///     &directory,
///     &ledger,
///     loader.eligibility(),
///     &metrics,
/// );
/// ```
pub struct MilitaryContributionValidator<'a, D, L> {
    directory: &'a D,
    ledger: &'a L,
    eligibility: &'a EligibilityConfig,
    metrics: &'a dyn MetricsSink,
}

impl<'a, D, L> MilitaryContributionValidator<'a, D, L>
where
    D: EmployeeDirectory,
    L: ContributionLedger,
{
    /// Creates a validator over the given lookups and thresholds.
    pub fn new(
        directory: &'a D,
        ledger: &'a L,
        eligibility: &'a EligibilityConfig,
        metrics: &'a dyn MetricsSink,
    ) -> Self {
        Self {
            directory,
            ledger,
            eligibility,
            metrics,
        }
    }

    /// Runs the full rule chain for one contribution request.
    ///
    /// # Arguments
    ///
    /// * `request` - The contribution being validated
    /// * `as_of` - The date the validation is running; supplies the current
    ///   year and the future-date check
    ///
    /// # Returns
    ///
    /// A [`ValidationReport`] listing every violation found. The chain
    /// never fails as an error; missing lookup data becomes a named rule
    /// failure so one bad record cannot abort a batch.
    pub async fn validate(
        &self,
        request: &MilitaryContribution,
        as_of: NaiveDate,
    ) -> ValidationReport {
        let current_year = as_of.year();
        let mut report = ValidationReport::default();

        self.apply(&mut report, "amount_positive", check_amount(request));
        self.apply(
            &mut report,
            "posting_year_range",
            check_posting_year(request, current_year, self.eligibility),
        );
        self.apply(
            &mut report,
            "lookback_window",
            check_lookback(request, current_year, self.eligibility),
        );
        self.apply(&mut report, "date_not_future", check_not_future(request, as_of));
        self.apply(
            &mut report,
            "supplemental_required",
            check_cross_year_supplemental(request),
        );

        // Rules 4 and onward need a resolvable badge; the dependent rules
        // are skipped rather than reported against a nonexistent employee.
        if self.directory.badge_exists(request.badge).await {
            self.validate_employee_rules(request, &mut report).await;
        } else {
            self.apply(
                &mut report,
                "badge_exists",
                RuleOutcome::fail(format!(
                    "Badge {} does not resolve to an employee",
                    request.badge
                )),
            );
            for rule in ["hire_year", "minimum_age", "duplicate_regular"] {
                report.push_skipped(rule);
            }
        }

        if report.is_valid() {
            self.metrics.increment("validation.passed");
        }
        debug!(
            badge = request.badge,
            failures = report.failures.len(),
            skipped = report.skipped.len(),
            "Military contribution validated"
        );

        report
    }

    /// Evaluates the rules that need the employee profile, fetching each
    /// lookup once.
    async fn validate_employee_rules(
        &self,
        request: &MilitaryContribution,
        report: &mut ValidationReport,
    ) {
        let contribution_year = request.contribution_date.year();

        match self.directory.earliest_hire_date(request.badge).await {
            Some(hire_date) => {
                self.apply(
                    report,
                    "hire_year",
                    check_hire_year(request, hire_date),
                );
            }
            None => {
                self.apply(
                    report,
                    "hire_date_missing",
                    RuleOutcome::fail(format!(
                        "No hire date on file for badge {}",
                        request.badge
                    )),
                );
                report.push_skipped("hire_year");
            }
        }

        match self.directory.date_of_birth(request.badge).await {
            Some(date_of_birth) => {
                self.apply(
                    report,
                    "minimum_age",
                    check_minimum_age(request, date_of_birth, self.eligibility),
                );
            }
            None => {
                self.apply(
                    report,
                    "date_of_birth_missing",
                    RuleOutcome::fail(format!(
                        "No date of birth on file for badge {}",
                        request.badge
                    )),
                );
                report.push_skipped("minimum_age");
            }
        }

        // Duplicate suppression queries by the contribution-date year, the
        // authoritative statement of the service year being paid for.
        if !request.is_supplemental {
            let existing = self
                .ledger
                .contributions_for_year(request.badge, contribution_year)
                .await;
            let has_regular = existing.iter().any(|c| !c.is_supplemental);
            if has_regular {
                self.apply(
                    report,
                    "duplicate_regular",
                    RuleOutcome::fail(format!(
                        "A regular contribution already exists for badge {} in {}",
                        request.badge, contribution_year
                    )),
                );
            }
        }
    }

    /// Records a rule outcome, incrementing the failure counter.
    fn apply(&self, report: &mut ValidationReport, rule: &str, outcome: RuleOutcome) {
        if let RuleOutcome::Fail(message) = outcome {
            self.metrics.increment(&format!("validation.{}", rule));
            report.push_failure(rule, message);
        }
    }
}

/// Rule 1: the contribution amount must be positive.
fn check_amount(request: &MilitaryContribution) -> RuleOutcome {
    if request.amount > Decimal::ZERO {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail("Contribution amount must be greater than zero")
    }
}

/// Rule 2: the posting year must fall within the accepted range.
fn check_posting_year(
    request: &MilitaryContribution,
    current_year: i32,
    eligibility: &EligibilityConfig,
) -> RuleOutcome {
    if request.profit_year >= eligibility.military_floor_year
        && request.profit_year <= current_year
    {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail(format!(
            "Profit year {} is outside the accepted range {}..={}",
            request.profit_year, eligibility.military_floor_year, current_year
        ))
    }
}

/// Rule 3: the contribution-date year must be within the lookback window.
fn check_lookback(
    request: &MilitaryContribution,
    current_year: i32,
    eligibility: &EligibilityConfig,
) -> RuleOutcome {
    let contribution_year = request.contribution_date.year();
    if is_within_lookback_window(
        contribution_year,
        current_year,
        eligibility.lookback_window_years,
    ) {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail(format!(
            "Contribution year {} is outside the {}-year lookback window",
            contribution_year, eligibility.lookback_window_years
        ))
    }
}

/// Rule 5: the contribution date cannot be in the future.
fn check_not_future(request: &MilitaryContribution, as_of: NaiveDate) -> RuleOutcome {
    if request.contribution_date <= as_of {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail(format!(
            "Contribution date {} is in the future",
            request.contribution_date
        ))
    }
}

/// Rule 6: the contribution cannot predate the employee's earliest hire year.
fn check_hire_year(request: &MilitaryContribution, hire_date: NaiveDate) -> RuleOutcome {
    if request.contribution_date.year() >= hire_date.year() {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail(format!(
            "Contribution year {} precedes hire year {}",
            request.contribution_date.year(),
            hire_date.year()
        ))
    }
}

/// Rule 7: the employee must have reached the minimum age at the
/// contribution date.
fn check_minimum_age(
    request: &MilitaryContribution,
    date_of_birth: NaiveDate,
    eligibility: &EligibilityConfig,
) -> RuleOutcome {
    let age = age_at(date_of_birth, request.contribution_date);
    if age >= eligibility.military_minimum_age {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail(format!(
            "Employee is {} at the contribution date; must be at least {}",
            age, eligibility.military_minimum_age
        ))
    }
}

/// Rule 9: a posting for a year other than the contribution-date year must
/// be marked supplemental. Cross-year postings carry no service credit.
fn check_cross_year_supplemental(request: &MilitaryContribution) -> RuleOutcome {
    if request.profit_year == request.contribution_date.year() || request.is_supplemental {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail("Cross-year posting must be marked Supplemental")
    }
}
