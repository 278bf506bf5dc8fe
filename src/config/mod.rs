//! Configuration loading and management for the year-end computation engine.
//!
//! This module provides functionality to load plan rule configuration from
//! YAML files, including plan metadata, eligibility thresholds, and the
//! vesting schedule step tables.
//!
//! # Example
//!
//! ```no_run
//! use vesting_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/plan").unwrap();
//! println!("Loaded plan: {}", config.plan().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{EligibilityConfig, PlanConfig, PlanMetadata, ScheduleConfig, VestingStep};
