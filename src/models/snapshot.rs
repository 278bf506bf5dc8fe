//! Year-end snapshot models.
//!
//! This module contains the [`ParticipantSnapshot`] type and its associated
//! structures that capture all outputs from a year-end computation,
//! including the enrollment category, vesting results, and audit traces.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EmploymentStatus, VestingScheduleId};

/// The derived enrollment classification for a participant and profit year.
///
/// Combines the governing vesting schedule with forfeiture history. It is a
/// pure function of those two inputs and is never stored as a source of
/// truth; the same pair must classify identically everywhere for
/// reconciliation against the legacy system to succeed.
///
/// # Example
///
/// ```
/// use vesting_engine::models::EnrollmentCategory;
///
/// let category = EnrollmentCategory::NewPlanWithContributions;
/// assert_eq!(format!("{:?}", category), "NewPlanWithContributions");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentCategory {
    /// No schedule assigned and no plan history.
    NotEnrolled,
    /// Old-plan participant with contribution history.
    OldPlanWithContributions,
    /// New-plan participant with contribution history.
    NewPlanWithContributions,
    /// Old-plan participant with forfeiture records.
    OldPlanWithForfeitureRecords,
    /// New-plan participant with forfeiture records.
    NewPlanWithForfeitureRecords,
    /// Plan history exists but the schedule was lost during data import.
    ImportStatusUnknown,
}

impl std::fmt::Display for EnrollmentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EnrollmentCategory::NotEnrolled => "not enrolled",
            EnrollmentCategory::OldPlanWithContributions => "old plan, contributions",
            EnrollmentCategory::NewPlanWithContributions => "new plan, contributions",
            EnrollmentCategory::OldPlanWithForfeitureRecords => "old plan, forfeitures",
            EnrollmentCategory::NewPlanWithForfeitureRecords => "new plan, forfeitures",
            EnrollmentCategory::ImportStatusUnknown => "import status unknown",
        };
        write!(f, "{}", label)
    }
}

impl EnrollmentCategory {
    /// Returns the single-digit code the legacy system prints for this
    /// category in report text.
    pub fn legacy_code(&self) -> u8 {
        match self {
            EnrollmentCategory::NotEnrolled => 0,
            EnrollmentCategory::OldPlanWithContributions => 1,
            EnrollmentCategory::NewPlanWithContributions => 2,
            EnrollmentCategory::OldPlanWithForfeitureRecords => 3,
            EnrollmentCategory::NewPlanWithForfeitureRecords => 4,
            EnrollmentCategory::ImportStatusUnknown => 9,
        }
    }

    /// Decodes a legacy report enrollment code.
    pub fn from_legacy_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(EnrollmentCategory::NotEnrolled),
            1 => Some(EnrollmentCategory::OldPlanWithContributions),
            2 => Some(EnrollmentCategory::NewPlanWithContributions),
            3 => Some(EnrollmentCategory::OldPlanWithForfeitureRecords),
            4 => Some(EnrollmentCategory::NewPlanWithForfeitureRecords),
            9 => Some(EnrollmentCategory::ImportStatusUnknown),
            _ => None,
        }
    }
}

/// The reason a participant receives no contribution posting for the year.
///
/// These reasons gate whether a contribution is posted; they never alter
/// the vesting formula. They are carried on the snapshot for audit and
/// report purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroContributionReason {
    /// Under 21 at year end despite a qualifying-hours year.
    UnderAge21WithHours,
    /// Terminated during the year with qualifying hours; the year still
    /// counts for vesting.
    TerminatedWithHours,
    /// Normal retirement age reached with first contribution five or more
    /// years prior; vesting is forced to 100%.
    RetirementFullVesting,
}

/// A beneficiary's percentage share of a participant's balance.
///
/// The sum of active allocations for one participant must not exceed 100%.
/// That invariant is enforced at write time by the administrative layer and
/// assumed upheld here as a precondition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeneficiaryAllocation {
    /// Identifier of the beneficiary contact.
    pub beneficiary_id: u32,
    /// The 4-digit suffix appended to the badge on legacy reports.
    pub suffix: u16,
    /// Percentage share of the balance (0-100).
    pub percent: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the plan document section for this rule.
    pub policy_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during computation.
///
/// Warnings indicate potential issues that don't prevent computation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for one participant's year-end computation.
///
/// Records every decision made during the computation for transparency;
/// multi-year parity debugging depends on attributing a divergence to a
/// specific rule without re-deriving it from raw data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of computation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during computation.
    pub warnings: Vec<AuditWarning>,
}

/// The complete year-end state computed for one participant.
///
/// A snapshot is immutable once computed for a given input; when source
/// data changes the pipeline reruns and the snapshot is superseded, never
/// mutated.
///
/// # Example
///
/// ```
/// use vesting_engine::models::{
///     AuditTrace, EmploymentStatus, EnrollmentCategory, ParticipantSnapshot, VestingScheduleId,
/// };
/// use chrono::{NaiveDate, Utc};
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let snapshot = ParticipantSnapshot {
///     snapshot_id: Uuid::new_v4(),
///     computed_at: Utc::now(),
///     engine_version: "0.1.0".to_string(),
///     profit_year: 2024,
///     badge: 703917,
///     ssn: "123456789".to_string(),
///     date_of_birth: NaiveDate::from_ymd_opt(1961, 4, 2).unwrap(),
///     hire_date: NaiveDate::from_ymd_opt(1995, 6, 12).unwrap(),
///     termination_date: None,
///     employment_status: EmploymentStatus::Active,
///     store: 44,
///     department: 3,
///     vesting_schedule: Some(VestingScheduleId::NewPlan),
///     has_forfeited: false,
///     years_in_plan: 27,
///     vesting_percent: Decimal::from(100),
///     current_balance: Decimal::ZERO,
///     vested_balance: Decimal::ZERO,
///     enrollment: EnrollmentCategory::NewPlanWithContributions,
///     zero_contribution_reason: None,
///     beneficiary_allocations: vec![],
///     hours: Decimal::ZERO,
///     wages: Decimal::ZERO,
///     audit_trace: AuditTrace { steps: vec![], warnings: vec![] },
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantSnapshot {
    /// Unique identifier for this snapshot.
    pub snapshot_id: Uuid,
    /// When the snapshot was computed.
    pub computed_at: DateTime<Utc>,
    /// The engine version that produced this snapshot.
    pub engine_version: String,
    /// The profit year this snapshot was computed for.
    pub profit_year: i32,
    /// Badge number identifying the participant.
    pub badge: u32,
    /// Social security number, digits only.
    pub ssn: String,
    /// The participant's date of birth.
    pub date_of_birth: NaiveDate,
    /// The participant's hire date.
    pub hire_date: NaiveDate,
    /// Termination date, if terminated.
    pub termination_date: Option<NaiveDate>,
    /// Employment status at year end.
    pub employment_status: EmploymentStatus,
    /// Store number.
    pub store: u32,
    /// Department number.
    pub department: u32,
    /// The governing vesting schedule, if enrolled.
    pub vesting_schedule: Option<VestingScheduleId>,
    /// True if forfeiture records exist.
    pub has_forfeited: bool,
    /// Credited years in the plan, including the newly-eligible increment
    /// when it applies.
    pub years_in_plan: i32,
    /// The computed vesting percent (0-100).
    pub vesting_percent: Decimal,
    /// Account balance entering year end.
    pub current_balance: Decimal,
    /// The vested portion of the balance, rounded to cents.
    pub vested_balance: Decimal,
    /// The derived enrollment category.
    pub enrollment: EnrollmentCategory,
    /// Why no contribution was posted this year, when applicable.
    pub zero_contribution_reason: Option<ZeroContributionReason>,
    /// Beneficiary allocations on file.
    pub beneficiary_allocations: Vec<BeneficiaryAllocation>,
    /// Hours worked during the profit year.
    pub hours: Decimal,
    /// Wages earned during the profit year.
    pub wages: Decimal,
    /// The complete audit trace for this computation.
    pub audit_trace: AuditTrace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrollment_category_serialization() {
        assert_eq!(
            serde_json::to_string(&EnrollmentCategory::OldPlanWithContributions).unwrap(),
            "\"old_plan_with_contributions\""
        );
        assert_eq!(
            serde_json::to_string(&EnrollmentCategory::ImportStatusUnknown).unwrap(),
            "\"import_status_unknown\""
        );
    }

    #[test]
    fn test_enrollment_category_display() {
        assert_eq!(
            EnrollmentCategory::NewPlanWithForfeitureRecords.to_string(),
            "new plan, forfeitures"
        );
        assert_eq!(EnrollmentCategory::NotEnrolled.to_string(), "not enrolled");
    }

    #[test]
    fn test_legacy_code_round_trip() {
        let categories = [
            EnrollmentCategory::NotEnrolled,
            EnrollmentCategory::OldPlanWithContributions,
            EnrollmentCategory::NewPlanWithContributions,
            EnrollmentCategory::OldPlanWithForfeitureRecords,
            EnrollmentCategory::NewPlanWithForfeitureRecords,
            EnrollmentCategory::ImportStatusUnknown,
        ];

        for category in categories {
            assert_eq!(
                EnrollmentCategory::from_legacy_code(category.legacy_code()),
                Some(category)
            );
        }
    }

    #[test]
    fn test_unknown_legacy_code_is_none() {
        assert_eq!(EnrollmentCategory::from_legacy_code(7), None);
    }

    #[test]
    fn test_zero_contribution_reason_serialization() {
        assert_eq!(
            serde_json::to_string(&ZeroContributionReason::UnderAge21WithHours).unwrap(),
            "\"under_age21_with_hours\""
        );
        assert_eq!(
            serde_json::to_string(&ZeroContributionReason::RetirementFullVesting).unwrap(),
            "\"retirement_full_vesting\""
        );
    }

    #[test]
    fn test_beneficiary_allocation_round_trip() {
        let allocation = BeneficiaryAllocation {
            beneficiary_id: 12,
            suffix: 1000,
            percent: Decimal::from(50),
        };

        let json = serde_json::to_string(&allocation).unwrap();
        let deserialized: BeneficiaryAllocation = serde_json::from_str(&json).unwrap();
        assert_eq!(allocation, deserialized);
    }
}
