//! Year-end snapshot builder.
//!
//! This module composes the temporal evaluators, the zero-contribution
//! gate, the vesting calculator, and the enrollment classifier into the
//! immutable [`ParticipantSnapshot`] for one participant and profit year.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::PlanConfig;
use crate::error::{EngineError, EngineResult};
use crate::metrics::MetricsSink;
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, ContributionRecord, EmploymentStatus, EnrollmentCategory,
    Participant, ParticipantSnapshot, ZeroContributionReason,
};

use super::{
    FullVestingOverride, age_at, calculate_vesting, classify_enrollment, credited_plan_years,
    newly_eligible_increment, should_update_enrollment,
};

/// Builds the year-end snapshot for one participant.
///
/// The computation is pure over its inputs: the same participant,
/// contribution history, and configuration always produce the same
/// snapshot fields (identifiers and timestamps aside). Classification and
/// gating decisions increment named counters through the injected metrics
/// sink and are recorded as audit steps.
///
/// # Arguments
///
/// * `participant` - The participant's demographic and balance record
/// * `profit_year` - The profit year being computed
/// * `contributions` - The participant's posted contributions, any years
/// * `config` - The loaded plan configuration
/// * `metrics` - Counter sink for classification decision points
///
/// # Errors
///
/// Returns `ScheduleNotFound` if the participant references a schedule
/// missing from configuration, or `CalculationError` for an invalid profit
/// year.
pub fn build_snapshot(
    participant: &Participant,
    profit_year: i32,
    contributions: &[ContributionRecord],
    config: &PlanConfig,
    metrics: &dyn MetricsSink,
) -> EngineResult<ParticipantSnapshot> {
    let year_end = NaiveDate::from_ymd_opt(profit_year, 12, 31).ok_or_else(|| {
        EngineError::CalculationError {
            message: format!("invalid profit year {}", profit_year),
        }
    })?;

    let mut steps = Vec::new();
    let mut warnings = Vec::new();
    let mut step_number = 1;

    let age = age_at(participant.date_of_birth, year_end);
    let has_current_year_contribution = contributions
        .iter()
        .any(|c| c.badge == participant.badge && c.profit_year == profit_year);

    // Step 1: plan-year credit
    let eligibility = config.eligibility();
    let increment_applies = newly_eligible_increment(
        has_current_year_contribution,
        participant.hours,
        age,
        eligibility,
    );
    let credited_years = credited_plan_years(
        participant.enrollment_start,
        year_end,
        has_current_year_contribution,
        participant.hours,
        age,
        eligibility,
    );
    if increment_applies {
        metrics.increment("plan_years.newly_eligible_increment");
    }
    steps.push(AuditStep {
        step_number,
        rule_id: "plan_year_credit".to_string(),
        rule_name: "Plan Year Credit".to_string(),
        policy_ref: "3.02".to_string(),
        input: serde_json::json!({
            "enrollment_start": participant.enrollment_start.map(|d| d.to_string()),
            "has_current_year_contribution": has_current_year_contribution,
            "hours": participant.hours.to_string(),
            "age": age,
        }),
        output: serde_json::json!({
            "credited_years": credited_years,
            "newly_eligible_increment": increment_applies,
        }),
        reasoning: if increment_applies {
            format!(
                "Credited {} plan years including one for the year about to be posted",
                credited_years
            )
        } else {
            format!("Credited {} plan years", credited_years)
        },
    });
    step_number += 1;

    // Step 2: zero-contribution gate
    let zero_reason =
        super::determine_zero_contribution_reason(participant, year_end, eligibility);
    if let Some(reason) = zero_reason {
        let counter = match reason {
            ZeroContributionReason::UnderAge21WithHours => "zero_contribution.under_age21",
            ZeroContributionReason::TerminatedWithHours => "zero_contribution.terminated",
            ZeroContributionReason::RetirementFullVesting => "zero_contribution.retirement",
        };
        metrics.increment(counter);
    }
    steps.push(AuditStep {
        step_number,
        rule_id: "zero_contribution_gate".to_string(),
        rule_name: "Zero Contribution Gate".to_string(),
        policy_ref: "5.02".to_string(),
        input: serde_json::json!({
            "age": age,
            "hours": participant.hours.to_string(),
            "terminated": participant.terminated_by(year_end),
        }),
        output: serde_json::json!({
            "reason": zero_reason.map(|r| serde_json::to_value(r).unwrap_or_default()),
        }),
        reasoning: match zero_reason {
            Some(reason) => format!("No contribution posted this year: {:?}", reason),
            None => "Normal contribution posting applies".to_string(),
        },
    });
    step_number += 1;

    // Step 3: vesting
    let full_vesting_override = match (participant.employment_status, zero_reason) {
        (EmploymentStatus::Deceased, _) => Some(FullVestingOverride::Death),
        (_, Some(ZeroContributionReason::RetirementFullVesting)) => {
            Some(FullVestingOverride::NormalRetirement)
        }
        _ => None,
    };

    let (vesting_percent, vested_balance) = match participant.vesting_schedule {
        Some(schedule_id) => {
            let schedule = config
                .schedules()
                .get(schedule_id.config_key())
                .ok_or_else(|| EngineError::ScheduleNotFound {
                    id: schedule_id.config_key().to_string(),
                })?;
            let result = calculate_vesting(
                credited_years,
                schedule,
                full_vesting_override,
                participant.current_balance,
                step_number,
            );
            steps.push(result.audit_step);
            (result.percent, result.vested_balance)
        }
        None => {
            steps.push(AuditStep {
                step_number,
                rule_id: "vesting_lookup".to_string(),
                rule_name: "Vesting Schedule Lookup".to_string(),
                policy_ref: "6.03".to_string(),
                input: serde_json::json!({
                    "schedule": serde_json::Value::Null,
                    "credited_years": credited_years,
                }),
                output: serde_json::json!({
                    "percent": "0",
                    "vested_balance": "0.00",
                }),
                reasoning: "No vesting schedule assigned; vesting is 0%".to_string(),
            });
            if participant.has_plan_history() {
                warnings.push(AuditWarning {
                    code: "schedule_missing".to_string(),
                    message: format!(
                        "Badge {} has plan history but no vesting schedule",
                        participant.badge
                    ),
                    severity: "medium".to_string(),
                });
            }
            (Decimal::ZERO, Decimal::ZERO)
        }
    };
    step_number += 1;

    // Step 4: enrollment classification, with the zero-percent skip
    let computed_category = classify_enrollment(
        participant.vesting_schedule,
        participant.has_forfeited,
        participant.has_plan_history(),
    );
    let enrollment = if should_update_enrollment(vesting_percent) {
        metrics.increment("classification.updated");
        computed_category
    } else {
        metrics.increment("classification.skip_zero_percent");
        participant
            .prior_enrollment
            .unwrap_or(EnrollmentCategory::NotEnrolled)
    };
    steps.push(AuditStep {
        step_number,
        rule_id: "enrollment_classification".to_string(),
        rule_name: "Enrollment Classification".to_string(),
        policy_ref: "4.01".to_string(),
        input: serde_json::json!({
            "schedule": participant.vesting_schedule.map(|s| s.config_key()),
            "has_forfeited": participant.has_forfeited,
            "has_plan_history": participant.has_plan_history(),
            "vesting_percent": vesting_percent.to_string(),
        }),
        output: serde_json::json!({
            "category": serde_json::to_value(enrollment).unwrap_or_default(),
            "update_skipped": !should_update_enrollment(vesting_percent),
        }),
        reasoning: if should_update_enrollment(vesting_percent) {
            format!("Classified as {}", enrollment)
        } else {
            format!(
                "Vesting is 0% so the classification refresh is skipped; carrying {}",
                enrollment
            )
        },
    });

    Ok(ParticipantSnapshot {
        snapshot_id: Uuid::new_v4(),
        computed_at: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        profit_year,
        badge: participant.badge,
        ssn: participant.ssn.clone(),
        date_of_birth: participant.date_of_birth,
        hire_date: participant.hire_date,
        termination_date: participant.termination_date,
        employment_status: participant.employment_status,
        store: participant.store,
        department: participant.department,
        vesting_schedule: participant.vesting_schedule,
        has_forfeited: participant.has_forfeited,
        years_in_plan: credited_years,
        vesting_percent,
        current_balance: participant.current_balance,
        vested_balance,
        enrollment,
        zero_contribution_reason: zero_reason,
        beneficiary_allocations: participant.beneficiary_allocations.clone(),
        hours: participant.hours,
        wages: participant.wages,
        audit_trace: AuditTrace { steps, warnings },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EligibilityConfig, PlanMetadata, ScheduleConfig, VestingStep};
    use crate::metrics::InMemoryMetrics;
    use crate::models::VestingScheduleId;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plan_config() -> PlanConfig {
        let metadata = PlanMetadata {
            code: "qps".to_string(),
            name: "Qualified Profit-Sharing Retirement Plan".to_string(),
            version: "2024-12-31".to_string(),
        };
        let eligibility = EligibilityConfig {
            qualifying_hours: 1000,
            minimum_entry_age: 18,
            military_minimum_age: 21,
            normal_retirement_age: 65,
            lookback_window_years: 5,
            military_floor_year: 2020,
            retirement_service_years: 5,
        };
        let schedules = vec![
            ScheduleConfig {
                id: "old_plan".to_string(),
                name: "Old Plan".to_string(),
                full_vesting_years: 7,
                steps: vec![
                    VestingStep {
                        years: 3,
                        percent: dec("20"),
                    },
                    VestingStep {
                        years: 4,
                        percent: dec("40"),
                    },
                    VestingStep {
                        years: 5,
                        percent: dec("60"),
                    },
                    VestingStep {
                        years: 6,
                        percent: dec("80"),
                    },
                    VestingStep {
                        years: 7,
                        percent: dec("100"),
                    },
                ],
            },
            ScheduleConfig {
                id: "new_plan".to_string(),
                name: "New Plan".to_string(),
                full_vesting_years: 6,
                steps: vec![
                    VestingStep {
                        years: 2,
                        percent: dec("20"),
                    },
                    VestingStep {
                        years: 3,
                        percent: dec("40"),
                    },
                    VestingStep {
                        years: 4,
                        percent: dec("60"),
                    },
                    VestingStep {
                        years: 5,
                        percent: dec("80"),
                    },
                    VestingStep {
                        years: 6,
                        percent: dec("100"),
                    },
                ],
            },
        ];
        PlanConfig::new(metadata, eligibility, schedules)
    }

    fn participant() -> Participant {
        Participant {
            badge: 703917,
            ssn: "123456789".to_string(),
            date_of_birth: date(1975, 4, 2),
            hire_date: date(2015, 6, 12),
            rehire_date: None,
            termination_date: None,
            employment_status: EmploymentStatus::Active,
            store: 44,
            department: 3,
            vesting_schedule: Some(VestingScheduleId::NewPlan),
            has_forfeited: false,
            enrollment_start: Some(date(2016, 12, 31)),
            prior_enrollment: Some(EnrollmentCategory::NewPlanWithContributions),
            hours: dec("2080"),
            wages: dec("54210.55"),
            current_balance: dec("88340.12"),
            beneficiary_allocations: vec![],
        }
    }

    fn contribution(badge: u32, profit_year: i32) -> ContributionRecord {
        ContributionRecord {
            badge,
            profit_year,
            contribution_date: date(profit_year, 12, 31),
            amount: dec("1850.00"),
            is_supplemental: false,
        }
    }

    #[test]
    fn test_fully_vested_long_tenure_participant() {
        let metrics = InMemoryMetrics::default();
        let snapshot = build_snapshot(
            &participant(),
            2024,
            &[contribution(703917, 2024)],
            &plan_config(),
            &metrics,
        )
        .unwrap();

        assert_eq!(snapshot.years_in_plan, 8);
        assert_eq!(snapshot.vesting_percent, dec("100"));
        assert_eq!(snapshot.vested_balance, dec("88340.12"));
        assert_eq!(
            snapshot.enrollment,
            EnrollmentCategory::NewPlanWithContributions
        );
        assert_eq!(metrics.count("classification.updated"), 1);
    }

    #[test]
    fn test_newly_eligible_increment_flows_to_snapshot() {
        let mut p = participant();
        p.enrollment_start = None;
        p.prior_enrollment = None;
        p.vesting_schedule = Some(VestingScheduleId::NewPlan);

        let metrics = InMemoryMetrics::default();
        let snapshot = build_snapshot(&p, 2024, &[], &plan_config(), &metrics).unwrap();

        assert_eq!(snapshot.years_in_plan, 1);
        assert_eq!(metrics.count("plan_years.newly_eligible_increment"), 1);
    }

    #[test]
    fn test_zero_percent_skips_classification_refresh() {
        let mut p = participant();
        // One credited year on the new plan: 0% vested
        p.enrollment_start = Some(date(2023, 12, 31));
        p.prior_enrollment = Some(EnrollmentCategory::ImportStatusUnknown);

        let metrics = InMemoryMetrics::default();
        let snapshot = build_snapshot(
            &p,
            2024,
            &[contribution(703917, 2024)],
            &plan_config(),
            &metrics,
        )
        .unwrap();

        assert_eq!(snapshot.vesting_percent, Decimal::ZERO);
        // The computed category would be NewPlanWithContributions, but the
        // zero-percent skip carries the prior category forward.
        assert_eq!(snapshot.enrollment, EnrollmentCategory::ImportStatusUnknown);
        assert_eq!(metrics.count("classification.skip_zero_percent"), 1);
        assert_eq!(metrics.count("classification.updated"), 0);
    }

    #[test]
    fn test_deceased_participant_fully_vests() {
        let mut p = participant();
        p.employment_status = EmploymentStatus::Deceased;
        p.enrollment_start = Some(date(2023, 12, 31));

        let metrics = InMemoryMetrics::default();
        let snapshot = build_snapshot(
            &p,
            2024,
            &[contribution(703917, 2024)],
            &plan_config(),
            &metrics,
        )
        .unwrap();

        assert_eq!(snapshot.vesting_percent, dec("100"));
        assert_eq!(snapshot.vested_balance, dec("88340.12"));
    }

    #[test]
    fn test_retirement_rule_forces_full_vesting() {
        let mut p = participant();
        p.date_of_birth = date(1957, 3, 15);
        p.enrollment_start = Some(date(2015, 12, 31));

        let metrics = InMemoryMetrics::default();
        let snapshot = build_snapshot(&p, 2024, &[], &plan_config(), &metrics).unwrap();

        assert_eq!(
            snapshot.zero_contribution_reason,
            Some(ZeroContributionReason::RetirementFullVesting)
        );
        assert_eq!(snapshot.vesting_percent, dec("100"));
        assert_eq!(metrics.count("zero_contribution.retirement"), 1);
    }

    #[test]
    fn test_no_schedule_with_history_warns() {
        let mut p = participant();
        p.vesting_schedule = None;
        p.prior_enrollment = None;

        let metrics = InMemoryMetrics::default();
        let snapshot = build_snapshot(&p, 2024, &[], &plan_config(), &metrics).unwrap();

        assert_eq!(snapshot.vesting_percent, Decimal::ZERO);
        assert_eq!(snapshot.enrollment, EnrollmentCategory::NotEnrolled);
        assert_eq!(snapshot.audit_trace.warnings.len(), 1);
        assert_eq!(snapshot.audit_trace.warnings[0].code, "schedule_missing");
    }

    #[test]
    fn test_audit_steps_are_sequential() {
        let metrics = InMemoryMetrics::default();
        let snapshot = build_snapshot(
            &participant(),
            2024,
            &[contribution(703917, 2024)],
            &plan_config(),
            &metrics,
        )
        .unwrap();

        assert_eq!(snapshot.audit_trace.steps.len(), 4);
        for (i, step) in snapshot.audit_trace.steps.iter().enumerate() {
            assert_eq!(step.step_number, (i + 1) as u32);
        }
        assert_eq!(snapshot.audit_trace.steps[0].rule_id, "plan_year_credit");
        assert_eq!(
            snapshot.audit_trace.steps[3].rule_id,
            "enrollment_classification"
        );
    }
}
