//! Read-only collaborator interfaces.
//!
//! The engine performs no storage I/O of its own; demographic and
//! contribution-history lookups go through these traits. Implementations
//! must be side-effect-free from the engine's perspective. In-memory
//! implementations are provided for tests, benchmarks, and embedding
//! callers.

use std::collections::HashMap;
use std::future::Future;

use chrono::NaiveDate;

use crate::models::ContributionRecord;

/// Employee demographic lookups by badge number.
pub trait EmployeeDirectory: Send + Sync {
    /// Returns true if the badge resolves to an existing employee.
    fn badge_exists(&self, badge: u32) -> impl Future<Output = bool> + Send;

    /// Returns the employee's earliest known hire date.
    fn earliest_hire_date(&self, badge: u32) -> impl Future<Output = Option<NaiveDate>> + Send;

    /// Returns the employee's date of birth.
    fn date_of_birth(&self, badge: u32) -> impl Future<Output = Option<NaiveDate>> + Send;
}

/// Posted-contribution history lookups by badge and year.
pub trait ContributionLedger: Send + Sync {
    /// Returns the contributions posted for a badge whose contribution
    /// date falls in the given year.
    fn contributions_for_year(
        &self,
        badge: u32,
        contribution_year: i32,
    ) -> impl Future<Output = Vec<ContributionRecord>> + Send;
}

/// A demographic profile held by the in-memory directory.
#[derive(Debug, Clone)]
pub struct EmployeeProfile {
    /// The employee's earliest hire date, when known.
    pub hire_date: Option<NaiveDate>,
    /// The employee's date of birth, when known.
    pub date_of_birth: Option<NaiveDate>,
}

/// An in-memory [`EmployeeDirectory`].
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    profiles: HashMap<u32, EmployeeProfile>,
}

impl InMemoryDirectory {
    /// Adds or replaces a profile for a badge.
    pub fn insert(&mut self, badge: u32, profile: EmployeeProfile) {
        self.profiles.insert(badge, profile);
    }
}

impl EmployeeDirectory for InMemoryDirectory {
    async fn badge_exists(&self, badge: u32) -> bool {
        self.profiles.contains_key(&badge)
    }

    async fn earliest_hire_date(&self, badge: u32) -> Option<NaiveDate> {
        self.profiles.get(&badge).and_then(|p| p.hire_date)
    }

    async fn date_of_birth(&self, badge: u32) -> Option<NaiveDate> {
        self.profiles.get(&badge).and_then(|p| p.date_of_birth)
    }
}

/// An in-memory [`ContributionLedger`].
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    records: Vec<ContributionRecord>,
}

impl InMemoryLedger {
    /// Creates a ledger holding the given records.
    pub fn new(records: Vec<ContributionRecord>) -> Self {
        Self { records }
    }

    /// Appends a record to the ledger.
    pub fn push(&mut self, record: ContributionRecord) {
        self.records.push(record);
    }
}

impl ContributionLedger for InMemoryLedger {
    async fn contributions_for_year(
        &self,
        badge: u32,
        contribution_year: i32,
    ) -> Vec<ContributionRecord> {
        use chrono::Datelike;
        self.records
            .iter()
            .filter(|r| r.badge == badge && r.contribution_date.year() == contribution_year)
            .cloned()
            .collect()
    }
}
