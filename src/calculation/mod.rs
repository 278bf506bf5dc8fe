//! Calculation logic for the year-end computation engine.
//!
//! This module contains all the calculation functions for determining
//! year-end state, including age and plan-year evaluation, the lookback
//! window rule, enrollment classification, vesting percent and vested
//! balance calculation, zero-contribution gating, and the snapshot builder
//! that composes them for one participant.

mod age;
mod enrollment;
mod lookback;
mod plan_years;
mod vesting;
mod year_end;
mod zero_contribution;

pub use age::age_at;
pub use enrollment::{classify_enrollment, should_update_enrollment};
pub use lookback::{DEFAULT_LOOKBACK_WINDOW_YEARS, is_within_lookback_window};
pub use plan_years::{credited_plan_years, newly_eligible_increment, years_in_plan};
pub use vesting::{FullVestingOverride, VestingResult, calculate_vesting, round_currency};
pub use year_end::build_snapshot;
pub use zero_contribution::determine_zero_contribution_reason;
