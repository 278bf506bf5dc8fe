//! Field comparison and accepted-difference policy.
//!
//! Matched records are compared field by field. Amount fields compare
//! after rounding to the policy's precision; an accepted-difference
//! predicate may reclassify a failing field when a secondary authoritative
//! source confirms the current system's value. The raw difference is
//! always surfaced alongside the acceptance, never dropped.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// The join key for reconciliation records: badge plus beneficiary suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    /// Badge number.
    pub badge: u32,
    /// Beneficiary suffix; 0 for the participant's own record.
    pub suffix: u16,
}

impl RecordKey {
    /// Creates a key from badge and suffix.
    pub fn new(badge: u32, suffix: u16) -> Self {
        Self { badge, suffix }
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.badge, self.suffix)
    }
}

/// A typed field value carried by a comparable record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    /// A currency or decimal amount.
    Amount(Decimal),
    /// A calendar date (century-pivoted at parse time for legacy input).
    Date(NaiveDate),
    /// An integer quantity (hours, age, codes).
    Int(i64),
    /// Free text.
    Text(String),
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Amount(amount) => write!(f, "{}", amount),
            FieldValue::Date(date) => write!(f, "{}", date),
            FieldValue::Int(value) => write!(f, "{}", value),
            FieldValue::Text(text) => write!(f, "{}", text),
        }
    }
}

/// A keyed, flat record prepared for reconciliation.
///
/// Both sides of the diff are converted into this shape; the field map is
/// ordered so comparison output is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparableRecord {
    /// The join key.
    pub key: RecordKey,
    /// Field name to value, ordered by name.
    pub fields: BTreeMap<String, FieldValue>,
}

impl ComparableRecord {
    /// Creates an empty record for a key.
    pub fn new(key: RecordKey) -> Self {
        Self {
            key,
            fields: BTreeMap::new(),
        }
    }

    /// Adds a field, returning self for chaining.
    pub fn with_field(mut self, name: &str, value: FieldValue) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }
}

/// An accepted-difference predicate.
///
/// When a field difference survives rounding, each rule is consulted; the
/// first rule that applies reclassifies the difference as accepted with
/// its reason. Rules typically encode "an independent authoritative source
/// agrees with the current system for this field/key".
pub struct AcceptRule {
    /// The reason recorded on accepted differences.
    pub reason: String,
    /// Decides whether this rule accepts the difference.
    pub applies: Box<dyn Fn(&RecordKey, &str, &FieldValue, &FieldValue) -> bool + Send + Sync>,
}

impl AcceptRule {
    /// Creates a rule from a reason and predicate.
    pub fn new(
        reason: impl Into<String>,
        applies: impl Fn(&RecordKey, &str, &FieldValue, &FieldValue) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            reason: reason.into(),
            applies: Box::new(applies),
        }
    }
}

/// The per-field comparison policy for one reconciliation run.
pub struct ComparisonPolicy {
    /// Decimal places amounts are rounded to before comparison.
    pub amount_precision: u32,
    accepted: Vec<AcceptRule>,
}

impl Default for ComparisonPolicy {
    fn default() -> Self {
        Self {
            amount_precision: 2,
            accepted: Vec::new(),
        }
    }
}

impl ComparisonPolicy {
    /// Adds an accepted-difference rule, returning self for chaining.
    pub fn with_accept_rule(mut self, rule: AcceptRule) -> Self {
        self.accepted.push(rule);
        self
    }

    /// Compares two field values under this policy.
    ///
    /// Amounts compare after rounding to the configured precision using
    /// the legacy half-away-from-zero convention; other variants compare
    /// exactly. Mixed variants never compare equal.
    pub fn values_equal(&self, current: &FieldValue, legacy: &FieldValue) -> bool {
        match (current, legacy) {
            (FieldValue::Amount(a), FieldValue::Amount(b)) => {
                let round = |v: &Decimal| {
                    v.round_dp_with_strategy(
                        self.amount_precision,
                        RoundingStrategy::MidpointAwayFromZero,
                    )
                };
                round(a) == round(b)
            }
            (FieldValue::Date(a), FieldValue::Date(b)) => a == b,
            (FieldValue::Int(a), FieldValue::Int(b)) => a == b,
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            _ => false,
        }
    }

    /// Returns the first accepting rule's reason for a surviving
    /// difference, if any rule applies.
    pub fn accepted_reason(
        &self,
        key: &RecordKey,
        field: &str,
        current: &FieldValue,
        legacy: &FieldValue,
    ) -> Option<String> {
        self.accepted
            .iter()
            .find(|rule| (rule.applies)(key, field, current, legacy))
            .map(|rule| rule.reason.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_amounts_compare_after_rounding() {
        let policy = ComparisonPolicy::default();

        // The legacy view carries extra precision; both round to 100.13
        assert!(policy.values_equal(
            &FieldValue::Amount(dec("100.13")),
            &FieldValue::Amount(dec("100.125")),
        ));
        assert!(!policy.values_equal(
            &FieldValue::Amount(dec("100.13")),
            &FieldValue::Amount(dec("100.12")),
        ));
    }

    #[test]
    fn test_mixed_variants_never_equal() {
        let policy = ComparisonPolicy::default();
        assert!(!policy.values_equal(
            &FieldValue::Int(100),
            &FieldValue::Amount(dec("100")),
        ));
        assert!(!policy.values_equal(
            &FieldValue::Text("-".to_string()),
            &FieldValue::Date(NaiveDate::from_ymd_opt(2024, 9, 15).unwrap()),
        ));
    }

    #[test]
    fn test_accept_rule_matches_by_field() {
        let policy = ComparisonPolicy::default().with_accept_rule(AcceptRule::new(
            "vesting view confirms current value",
            |_key, field, _current, _legacy| field == "vested",
        ));

        let a = FieldValue::Amount(dec("10.00"));
        let b = FieldValue::Amount(dec("10.01"));
        let key = RecordKey::new(703917, 0);

        assert_eq!(
            policy.accepted_reason(&key, "vested", &a, &b),
            Some("vesting view confirms current value".to_string())
        );
        assert_eq!(policy.accepted_reason(&key, "profit_sharing", &a, &b), None);
    }

    #[test]
    fn test_record_key_display() {
        assert_eq!(RecordKey::new(703917, 1000).to_string(), "703917-1000");
    }
}
