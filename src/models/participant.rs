//! Participant model and related types.
//!
//! This module defines the Participant struct together with the
//! EmploymentStatus and VestingScheduleId enums used throughout the
//! year-end computation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::BeneficiaryAllocation;

/// Identifies which of the two vesting schedules governs a participant.
///
/// Participants enrolled before the plan restatement vest on the seven-year
/// old-plan table; later enrollees vest on the six-year new-plan table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VestingScheduleId {
    /// Pre-restatement schedule, seven years to full vesting.
    OldPlan,
    /// Post-restatement schedule, six years to full vesting.
    NewPlan,
}

impl VestingScheduleId {
    /// Returns the key under which this schedule is stored in configuration.
    pub fn config_key(&self) -> &'static str {
        match self {
            VestingScheduleId::OldPlan => "old_plan",
            VestingScheduleId::NewPlan => "new_plan",
        }
    }
}

/// Represents a participant's employment status at year end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    /// Actively employed.
    Active,
    /// Terminated during or before the profit year.
    Terminated,
    /// Retired under the plan's normal retirement provisions.
    Retired,
    /// Deceased; balance passes to beneficiaries.
    Deceased,
}

/// Represents an employee or beneficiary tracked by the plan.
///
/// This is the demographic and balance input to the year-end pipeline.
/// One `Participant` is read per badge per profit year; the pipeline never
/// mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Badge number identifying the employee.
    pub badge: u32,
    /// Social security number, stored as digits only.
    pub ssn: String,
    /// The participant's date of birth.
    pub date_of_birth: NaiveDate,
    /// The participant's original hire date.
    pub hire_date: NaiveDate,
    /// The most recent rehire date, when the participant left and returned.
    pub rehire_date: Option<NaiveDate>,
    /// Termination date, when no longer employed.
    pub termination_date: Option<NaiveDate>,
    /// Employment status at the end of the profit year.
    pub employment_status: EmploymentStatus,
    /// Store number the participant is assigned to.
    pub store: u32,
    /// Department number within the store.
    pub department: u32,
    /// The governing vesting schedule, if the participant has been enrolled.
    pub vesting_schedule: Option<VestingScheduleId>,
    /// True if the participant has forfeiture records on file.
    pub has_forfeited: bool,
    /// Date of the first qualifying contribution, when one exists.
    pub enrollment_start: Option<NaiveDate>,
    /// The enrollment category computed in the prior year, carried for the
    /// skip-on-zero-percent classification rule.
    pub prior_enrollment: Option<super::EnrollmentCategory>,
    /// Hours worked during the profit year.
    pub hours: Decimal,
    /// Wages earned during the profit year.
    pub wages: Decimal,
    /// Profit-sharing account balance entering year end.
    pub current_balance: Decimal,
    /// Beneficiary allocations on file for this participant.
    #[serde(default)]
    pub beneficiary_allocations: Vec<BeneficiaryAllocation>,
}

impl Participant {
    /// Returns true if the participant was terminated on or before the
    /// given date.
    pub fn terminated_by(&self, date: NaiveDate) -> bool {
        self.termination_date.is_some_and(|term| term <= date)
    }

    /// Returns true if any plan history exists for this participant.
    ///
    /// Plan history means a first qualifying contribution date or a
    /// forfeiture record. Used to disambiguate never-enrolled participants
    /// from records whose schedule was lost during import.
    pub fn has_plan_history(&self) -> bool {
        self.enrollment_start.is_some() || self.has_forfeited
    }
}
