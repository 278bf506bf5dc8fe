//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading plan rule
//! configuration from YAML files.

use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::VestingScheduleId;

use super::types::{EligibilityConfig, PlanConfig, PlanMetadata, ScheduleConfig};

/// Loads and provides access to plan rule configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides methods to query eligibility thresholds and vesting
/// schedule step tables.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/plan/
/// ├── plan.yaml           # Plan metadata
/// ├── eligibility.yaml    # Hours/age thresholds, lookback window
/// └── schedules/
///     ├── old_plan.yaml   # 7-year step table
///     └── new_plan.yaml   # 6-year step table
/// ```
///
/// # Example
///
/// ```no_run
/// use vesting_engine::config::ConfigLoader;
/// use vesting_engine::models::VestingScheduleId;
///
/// let loader = ConfigLoader::load("./config/plan").unwrap();
///
/// let schedule = loader.schedule(VestingScheduleId::NewPlan).unwrap();
/// println!("Schedule: {}", schedule.name);
/// println!("Lookback window: {} years", loader.eligibility().lookback_window_years);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PlanConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/plan")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - Any schedule step table is non-monotonic or does not end at 100%
    ///
    /// # Example
    ///
    /// ```no_run
    /// use vesting_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/plan")?;
    /// # Ok::<(), vesting_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        // Load plan.yaml
        let plan_path = path.join("plan.yaml");
        let metadata = Self::load_yaml::<PlanMetadata>(&plan_path)?;

        // Load eligibility.yaml
        let eligibility_path = path.join("eligibility.yaml");
        let eligibility = Self::load_yaml::<EligibilityConfig>(&eligibility_path)?;

        // Load all schedule files from the schedules directory
        let schedules_dir = path.join("schedules");
        let schedules = Self::load_schedules(&schedules_dir)?;

        let config = PlanConfig::new(metadata, eligibility, schedules);

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all schedule files from the schedules directory.
    fn load_schedules(schedules_dir: &Path) -> EngineResult<Vec<ScheduleConfig>> {
        let schedules_dir_str = schedules_dir.display().to_string();

        if !schedules_dir.exists() {
            return Err(EngineError::ConfigNotFound {
                path: schedules_dir_str,
            });
        }

        let entries = fs::read_dir(schedules_dir).map_err(|_| EngineError::ConfigNotFound {
            path: schedules_dir_str.clone(),
        })?;

        let mut schedules = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: schedules_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let schedule = Self::load_yaml::<ScheduleConfig>(&path)?;
                Self::validate_schedule(&schedule, &path.display().to_string())?;
                schedules.push(schedule);
            }
        }

        if schedules.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no schedule files found)", schedules_dir_str),
            });
        }

        Ok(schedules)
    }

    /// Validates that a step table is monotonically non-decreasing and
    /// terminates at exactly 100%.
    fn validate_schedule(schedule: &ScheduleConfig, path: &str) -> EngineResult<()> {
        let mut sorted = schedule.steps.clone();
        sorted.sort_by_key(|step| step.years);

        let mut previous = Decimal::ZERO;
        for step in &sorted {
            if step.percent < previous {
                return Err(EngineError::ConfigParseError {
                    path: path.to_string(),
                    message: format!(
                        "schedule '{}' step table decreases at {} years",
                        schedule.id, step.years
                    ),
                });
            }
            previous = step.percent;
        }

        match sorted.last() {
            Some(last) if last.percent == Decimal::from(100) => Ok(()),
            Some(last) => Err(EngineError::ConfigParseError {
                path: path.to_string(),
                message: format!(
                    "schedule '{}' step table ends at {}% instead of 100%",
                    schedule.id, last.percent
                ),
            }),
            None => Err(EngineError::ConfigParseError {
                path: path.to_string(),
                message: format!("schedule '{}' has an empty step table", schedule.id),
            }),
        }
    }

    /// Returns the underlying plan configuration.
    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// Returns the plan metadata.
    pub fn plan(&self) -> &PlanMetadata {
        self.config.plan()
    }

    /// Returns the eligibility thresholds.
    pub fn eligibility(&self) -> &EligibilityConfig {
        self.config.eligibility()
    }

    /// Gets a vesting schedule by its typed identifier.
    ///
    /// # Arguments
    ///
    /// * `id` - The schedule identifier
    ///
    /// # Returns
    ///
    /// Returns the schedule if found, or a `ScheduleNotFound` error.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use vesting_engine::config::ConfigLoader;
    /// use vesting_engine::models::VestingScheduleId;
    ///
    /// let loader = ConfigLoader::load("./config/plan")?;
    /// let schedule = loader.schedule(VestingScheduleId::OldPlan)?;
    /// assert_eq!(schedule.full_vesting_years, 7);
    /// # Ok::<(), vesting_engine::error::EngineError>(())
    /// ```
    pub fn schedule(&self, id: VestingScheduleId) -> EngineResult<&ScheduleConfig> {
        self.schedule_by_id(id.config_key())
    }

    /// Gets a vesting schedule by its configuration key.
    ///
    /// # Arguments
    ///
    /// * `id` - The schedule key as it appears in the schedule file (e.g., "old_plan")
    pub fn schedule_by_id(&self, id: &str) -> EngineResult<&ScheduleConfig> {
        self.config
            .schedules()
            .get(id)
            .ok_or_else(|| EngineError::ScheduleNotFound { id: id.to_string() })
    }
}
