//! Batch year-end computation.
//!
//! The per-participant computation has no cross-participant dependency, so
//! the pipeline runs it as a bounded-concurrency parallel map. The bound
//! reflects the external contribution-history lookup's connection limits,
//! not CPU; the computation itself is cheap.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::build_snapshot;
use crate::config::PlanConfig;
use crate::error::{EngineError, EngineResult};
use crate::lookup::ContributionLedger;
use crate::metrics::MetricsSink;
use crate::models::{Participant, ParticipantSnapshot};

/// The default lookup concurrency bound.
const DEFAULT_CONCURRENCY: usize = 16;

/// Computes year-end snapshots for a profit year's population.
///
/// Inputs are immutable; each run produces a fresh snapshot collection and
/// never mutates prior results.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use vesting_engine::config::ConfigLoader;
/// use vesting_engine::lookup::InMemoryLedger;
/// use vesting_engine::metrics::NullMetrics;
/// use vesting_engine::pipeline::YearEndPipeline;
///
/// # async fn run() -> Result<(), vesting_engine::error::EngineError> {
/// let loader = ConfigLoader::load("./config/plan")?;
/// let pipeline = YearEndPipeline::new(loader.config().clone(), Arc::new(NullMetrics));
/// let ledger = Arc::new(InMemoryLedger::default());
///
/// let snapshots = pipeline.run(vec![], 2024, ledger).await?;
/// assert!(snapshots.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct YearEndPipeline {
    config: Arc<PlanConfig>,
    metrics: Arc<dyn MetricsSink>,
    concurrency: usize,
}

impl YearEndPipeline {
    /// Creates a pipeline over the given configuration and metrics sink.
    pub fn new(config: PlanConfig, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            config: Arc::new(config),
            metrics,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Overrides the lookup concurrency bound.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Computes snapshots for every participant, in badge order.
    ///
    /// Contribution history is fetched per badge through the ledger; the
    /// fetch is the suspension point the concurrency bound protects.
    ///
    /// # Arguments
    ///
    /// * `participants` - The profit year's population
    /// * `profit_year` - The profit year to compute
    /// * `ledger` - The contribution-history lookup
    pub async fn run<L>(
        &self,
        participants: Vec<Participant>,
        profit_year: i32,
        ledger: Arc<L>,
    ) -> EngineResult<Vec<ParticipantSnapshot>>
    where
        L: ContributionLedger + 'static,
    {
        let run_id = Uuid::new_v4();
        let population = participants.len();
        info!(%run_id, profit_year, population, "Year-end computation starting");

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<EngineResult<ParticipantSnapshot>> = JoinSet::new();

        for participant in participants {
            let config = Arc::clone(&self.config);
            let metrics = Arc::clone(&self.metrics);
            let ledger = Arc::clone(&ledger);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit =
                    semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| EngineError::CalculationError {
                            message: "lookup semaphore closed".to_string(),
                        })?;
                let contributions = ledger
                    .contributions_for_year(participant.badge, profit_year)
                    .await;
                build_snapshot(
                    &participant,
                    profit_year,
                    &contributions,
                    &config,
                    &*metrics,
                )
            });
        }

        let mut snapshots = Vec::with_capacity(population);
        while let Some(joined) = tasks.join_next().await {
            let snapshot = joined.map_err(|e| {
                warn!(%run_id, error = %e, "Snapshot task failed to join");
                EngineError::CalculationError {
                    message: format!("snapshot task panicked or was cancelled: {}", e),
                }
            })??;
            snapshots.push(snapshot);
        }

        snapshots.sort_by_key(|s| s.badge);
        info!(%run_id, computed = snapshots.len(), "Year-end computation complete");
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EligibilityConfig, PlanMetadata, ScheduleConfig, VestingStep};
    use crate::lookup::InMemoryLedger;
    use crate::metrics::InMemoryMetrics;
    use crate::models::{ContributionRecord, EmploymentStatus, VestingScheduleId};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plan_config() -> PlanConfig {
        PlanConfig::new(
            PlanMetadata {
                code: "qps".to_string(),
                name: "Qualified Profit-Sharing Retirement Plan".to_string(),
                version: "2024-12-31".to_string(),
            },
            EligibilityConfig {
                qualifying_hours: 1000,
                minimum_entry_age: 18,
                military_minimum_age: 21,
                normal_retirement_age: 65,
                lookback_window_years: 5,
                military_floor_year: 2020,
                retirement_service_years: 5,
            },
            vec![ScheduleConfig {
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
            }],
        )
    }

    fn participant(badge: u32, enrollment_year: i32) -> Participant {
        Participant {
            badge,
            ssn: format!("{:09}", badge),
            date_of_birth: date(1975, 4, 2),
            hire_date: date(enrollment_year - 1, 6, 12),
            rehire_date: None,
            termination_date: None,
            employment_status: EmploymentStatus::Active,
            store: 44,
            department: 3,
            vesting_schedule: Some(VestingScheduleId::NewPlan),
            has_forfeited: false,
            enrollment_start: Some(date(enrollment_year, 12, 31)),
            prior_enrollment: None,
            hours: dec("2080"),
            wages: dec("54210.55"),
            current_balance: dec("10000.00"),
            beneficiary_allocations: vec![],
        }
    }

    #[tokio::test]
    async fn test_batch_computes_every_participant_in_badge_order() {
        let pipeline =
            YearEndPipeline::new(plan_config(), Arc::new(InMemoryMetrics::default()));
        let ledger = Arc::new(InMemoryLedger::new(vec![ContributionRecord {
            badge: 700002,
            profit_year: 2024,
            contribution_date: date(2024, 12, 31),
            amount: dec("1850.00"),
            is_supplemental: false,
        }]));

        let participants = vec![
            participant(700003, 2019),
            participant(700001, 2020),
            participant(700002, 2018),
        ];
        let snapshots = pipeline.run(participants, 2024, ledger).await.unwrap();

        assert_eq!(snapshots.len(), 3);
        let badges: Vec<u32> = snapshots.iter().map(|s| s.badge).collect();
        assert_eq!(badges, vec![700001, 700002, 700003]);
    }

    #[tokio::test]
    async fn test_contribution_history_gates_the_increment() {
        let pipeline =
            YearEndPipeline::new(plan_config(), Arc::new(InMemoryMetrics::default()));
        let ledger = Arc::new(InMemoryLedger::new(vec![ContributionRecord {
            badge: 700002,
            profit_year: 2024,
            contribution_date: date(2024, 12, 31),
            amount: dec("1850.00"),
            is_supplemental: false,
        }]));

        let snapshots = pipeline
            .run(
                vec![participant(700001, 2020), participant(700002, 2020)],
                2024,
                ledger,
            )
            .await
            .unwrap();

        // Same enrollment date: the badge without a posted contribution
        // gets the newly-eligible extra year.
        assert_eq!(snapshots[0].badge, 700001);
        assert_eq!(snapshots[0].years_in_plan, 5);
        assert_eq!(snapshots[1].badge, 700002);
        assert_eq!(snapshots[1].years_in_plan, 4);
    }

    #[tokio::test]
    async fn test_empty_population() {
        let pipeline =
            YearEndPipeline::new(plan_config(), Arc::new(InMemoryMetrics::default()));
        let ledger = Arc::new(InMemoryLedger::default());

        let snapshots = pipeline.run(vec![], 2024, ledger).await.unwrap();
        assert!(snapshots.is_empty());
    }

    #[tokio::test]
    async fn test_concurrency_bound_is_honored() {
        let pipeline = YearEndPipeline::new(plan_config(), Arc::new(InMemoryMetrics::default()))
            .with_concurrency(2);
        let ledger = Arc::new(InMemoryLedger::default());

        let participants: Vec<Participant> =
            (700001..700041).map(|b| participant(b, 2019)).collect();
        let snapshots = pipeline.run(participants, 2024, ledger).await.unwrap();

        assert_eq!(snapshots.len(), 40);
    }
}
