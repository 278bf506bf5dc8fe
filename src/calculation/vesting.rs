//! Vesting percent and vested balance calculation.
//!
//! This module looks up the vesting percent from a schedule step table,
//! applies full-vesting overrides, and computes the vested balance with the
//! legacy system's rounding convention.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::ScheduleConfig;
use crate::models::AuditStep;

/// Events that force a participant to 100% vesting regardless of years in
/// the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullVestingOverride {
    /// The participant is deceased.
    Death,
    /// Normal retirement age reached with the required service.
    NormalRetirement,
    /// A deemed-distribution event occurred.
    DeemedDistribution,
}

impl std::fmt::Display for FullVestingOverride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FullVestingOverride::Death => write!(f, "death"),
            FullVestingOverride::NormalRetirement => write!(f, "normal retirement"),
            FullVestingOverride::DeemedDistribution => write!(f, "deemed distribution"),
        }
    }
}

/// Rounds a currency amount to cents the way the mainframe's fixed-point
/// arithmetic does: half away from zero.
///
/// Using half-to-even here produces systematic off-by-cent mismatches
/// during reconciliation.
///
/// # Example
///
/// ```
/// use vesting_engine::calculation::round_currency;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let amount = Decimal::from_str("10.125").unwrap();
/// assert_eq!(round_currency(amount), Decimal::from_str("10.13").unwrap());
///
/// let negative = Decimal::from_str("-10.125").unwrap();
/// assert_eq!(round_currency(negative), Decimal::from_str("-10.13").unwrap());
/// ```
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// The result of a vesting calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct VestingResult {
    /// The vesting percent (0-100).
    pub percent: Decimal,
    /// The vested portion of the balance, rounded to cents.
    pub vested_balance: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the vesting percent and vested balance for a participant.
///
/// The percent comes from the schedule's step table unless a full-vesting
/// override applies, in which case it is 100%. The vested balance is the
/// current balance multiplied by the percent and rounded to cents with
/// [`round_currency`].
///
/// # Arguments
///
/// * `credited_years` - Credited years in the plan
/// * `schedule` - The governing schedule's step table
/// * `full_vesting_override` - A 100%-vesting event, when one applies
/// * `current_balance` - The balance entering year end
/// * `step_number` - Sequential audit step number
///
/// # Example
///
/// ```no_run
/// use vesting_engine::calculation::calculate_vesting;
/// use vesting_engine::config::ConfigLoader;
/// use vesting_engine::models::VestingScheduleId;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// # fn main() -> Result<(), vesting_engine::error::EngineError> {
/// let loader = ConfigLoader::load("./config/plan")?;
/// let schedule = loader.schedule(VestingScheduleId::NewPlan)?;
///
/// let result = calculate_vesting(
///     4,
///     schedule,
///     None,
///     Decimal::from_str("10000.00").unwrap(),
///     1,
/// );
/// assert_eq!(result.percent, Decimal::from(60));
/// assert_eq!(result.vested_balance, Decimal::from_str("6000.00").unwrap());
/// # Ok(())
/// # }
/// ```
pub fn calculate_vesting(
    credited_years: i32,
    schedule: &ScheduleConfig,
    full_vesting_override: Option<FullVestingOverride>,
    current_balance: Decimal,
    step_number: u32,
) -> VestingResult {
    let table_percent = schedule.percent_for_years(credited_years);

    let (percent, reasoning) = match full_vesting_override {
        Some(event) => (
            Decimal::from(100),
            format!(
                "Vesting forced to 100% by {} override ({}% by table at {} years)",
                event, table_percent, credited_years
            ),
        ),
        None => (
            table_percent,
            format!(
                "Schedule '{}' grants {}% at {} credited years",
                schedule.id, table_percent, credited_years
            ),
        ),
    };

    let vested_balance = round_currency(current_balance * percent / Decimal::from(100));

    let audit_step = AuditStep {
        step_number,
        rule_id: "vesting_lookup".to_string(),
        rule_name: "Vesting Schedule Lookup".to_string(),
        policy_ref: "6.03".to_string(),
        input: serde_json::json!({
            "schedule": schedule.id,
            "credited_years": credited_years,
            "current_balance": current_balance.to_string(),
            "override": full_vesting_override.map(|e| e.to_string()),
        }),
        output: serde_json::json!({
            "percent": percent.to_string(),
            "vested_balance": vested_balance.to_string(),
        }),
        reasoning,
    };

    VestingResult {
        percent,
        vested_balance,
        audit_step,
    }
}
