//! Configuration types for plan rule evaluation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// Metadata about the plan.
///
/// Contains identifying information about the profit-sharing plan this
/// configuration describes.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanMetadata {
    /// The internal plan code (e.g., "qps").
    pub code: String,
    /// The human-readable name of the plan.
    pub name: String,
    /// The version or restatement date of the plan document.
    pub version: String,
}

/// Eligibility and timing thresholds used across the engine.
///
/// These values encode plan-document rules that have accreted over decades;
/// they are configuration rather than constants so that amendments do not
/// require a code change.
#[derive(Debug, Clone, Deserialize)]
pub struct EligibilityConfig {
    /// Hours of service required for a year to count toward eligibility.
    pub qualifying_hours: u32,
    /// Minimum age for plan entry.
    pub minimum_entry_age: i32,
    /// Minimum age at the contribution date for military contributions.
    pub military_minimum_age: i32,
    /// Normal retirement age under the plan.
    pub normal_retirement_age: i32,
    /// Number of prior years a late contribution may still be posted against.
    pub lookback_window_years: i32,
    /// Earliest posting year accepted for military contributions.
    pub military_floor_year: i32,
    /// Years since first contribution required for the retirement-age
    /// full-vesting rule.
    pub retirement_service_years: i32,
}

/// A single step in a vesting schedule's years-to-percent table.
#[derive(Debug, Clone, Deserialize)]
pub struct VestingStep {
    /// Completed years in the plan at which this step applies.
    pub years: i32,
    /// Vesting percent granted at this step (0-100).
    pub percent: Decimal,
}

/// A vesting schedule step table loaded from a schedule file.
///
/// Steps are sorted ascending by years. Below the first step the vesting
/// percent is zero; at and beyond the final step it is 100%.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// The schedule identifier (e.g., "old_plan").
    pub id: String,
    /// The human-readable name of the schedule.
    pub name: String,
    /// Years in the plan required for full vesting.
    pub full_vesting_years: i32,
    /// The step table, ascending by years.
    pub steps: Vec<VestingStep>,
}

impl ScheduleConfig {
    /// Returns the vesting percent for a number of completed plan years.
    ///
    /// The table is a step function: the most recent step whose `years` is
    /// less than or equal to `years_in_plan` applies. Below the first step
    /// the percent is zero; the function saturates at the final step.
    ///
    /// # Example
    ///
    /// ```
    /// use vesting_engine::config::ConfigLoader;
    /// use rust_decimal::Decimal;
    ///
    /// # fn main() -> Result<(), vesting_engine::error::EngineError> {
    /// let loader = ConfigLoader::load("./config/plan")?;
    /// let schedule = loader.schedule_by_id("new_plan")?;
    /// assert_eq!(schedule.percent_for_years(1), Decimal::ZERO);
    /// assert_eq!(schedule.percent_for_years(6), Decimal::from(100));
    /// assert_eq!(schedule.percent_for_years(40), Decimal::from(100));
    /// # Ok(())
    /// # }
    /// ```
    pub fn percent_for_years(&self, years_in_plan: i32) -> Decimal {
        self.steps
            .iter()
            .rev()
            .find(|step| step.years <= years_in_plan)
            .map(|step| step.percent)
            .unwrap_or(Decimal::ZERO)
    }
}

/// The complete plan configuration loaded from YAML files.
///
/// This struct aggregates all configuration loaded from the various
/// YAML files in a plan configuration directory.
#[derive(Debug, Clone)]
pub struct PlanConfig {
    /// Plan metadata.
    metadata: PlanMetadata,
    /// Eligibility and timing thresholds.
    eligibility: EligibilityConfig,
    /// Vesting schedules keyed by schedule id.
    schedules: HashMap<String, ScheduleConfig>,
}

impl PlanConfig {
    /// Creates a new PlanConfig from its component parts.
    ///
    /// Each schedule's step table is sorted ascending by years.
    pub fn new(
        metadata: PlanMetadata,
        eligibility: EligibilityConfig,
        schedules: Vec<ScheduleConfig>,
    ) -> Self {
        let mut by_id = HashMap::new();
        for mut schedule in schedules {
            schedule.steps.sort_by_key(|step| step.years);
            by_id.insert(schedule.id.clone(), schedule);
        }
        Self {
            metadata,
            eligibility,
            schedules: by_id,
        }
    }

    /// Returns the plan metadata.
    pub fn plan(&self) -> &PlanMetadata {
        &self.metadata
    }

    /// Returns the eligibility thresholds.
    pub fn eligibility(&self) -> &EligibilityConfig {
        &self.eligibility
    }

    /// Returns all vesting schedules keyed by id.
    pub fn schedules(&self) -> &HashMap<String, ScheduleConfig> {
        &self.schedules
    }
}
