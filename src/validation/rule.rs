//! The rule outcome model.
//!
//! Each business rule is a pure check producing a [`RuleOutcome`]; a
//! validator is an ordered list of such checks. Failures are data, not
//! errors: the caller decides how to present them.

use serde::{Deserialize, Serialize};

/// The outcome of evaluating one business rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The rule is satisfied.
    Pass,
    /// The rule is violated, with a human-readable message.
    Fail(String),
}

impl RuleOutcome {
    /// Builds a failing outcome from anything displayable.
    pub fn fail(message: impl Into<String>) -> Self {
        RuleOutcome::Fail(message.into())
    }

    /// Returns true for a passing outcome.
    pub fn is_pass(&self) -> bool {
        matches!(self, RuleOutcome::Pass)
    }
}

/// One recorded rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFailure {
    /// The stable identifier of the violated rule.
    pub rule: String,
    /// A human-readable description of the violation.
    pub message: String,
}

/// The result of running a full validation chain.
///
/// Contains every violation found, plus the rules that were skipped
/// because a precondition (such as badge resolution) was itself unmet.
///
/// # Example
///
/// ```
/// use vesting_engine::validation::ValidationReport;
///
/// let report = ValidationReport::default();
/// assert!(report.is_valid());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// All rule violations, in chain order.
    pub failures: Vec<RuleFailure>,
    /// Rules not evaluated because their preconditions failed.
    pub skipped: Vec<String>,
}

impl ValidationReport {
    /// Returns true when no rule was violated.
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Records a violation.
    pub fn push_failure(&mut self, rule: &str, message: impl Into<String>) {
        self.failures.push(RuleFailure {
            rule: rule.to_string(),
            message: message.into(),
        });
    }

    /// Records a rule whose precondition was unmet.
    pub fn push_skipped(&mut self, rule: &str) {
        self.skipped.push(rule.to_string());
    }

    /// Returns true if the named rule is among the violations.
    pub fn failed(&self, rule: &str) -> bool {
        self.failures.iter().any(|f| f.rule == rule)
    }
}
