//! The join-and-compare diff engine.
//!
//! A single-pass full outer join over two keyed, immutable collections:
//! the computed current-system records and the parsed legacy records.
//! Matched keys are compared field by field under the comparison policy;
//! one-side-only records are reported without field comparison.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::policy::{ComparableRecord, ComparisonPolicy, RecordKey};

/// One field-level difference between the two sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDiff {
    /// The field name.
    pub field: String,
    /// The current system's value, rendered.
    pub current: String,
    /// The legacy report's value, rendered.
    pub legacy: String,
    /// True when an accepted-difference rule reclassified this diff.
    pub accepted: bool,
    /// The accepting rule's reason, when accepted.
    pub accept_reason: Option<String>,
}

/// All field differences for one matched key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDiff {
    /// The join key.
    pub key: RecordKey,
    /// The field differences, ordered by field name.
    pub fields: Vec<FieldDiff>,
}

/// The output of one reconciliation run.
///
/// Mismatches are the engine's designed output, not errors. The result is
/// deterministic for the same immutable inputs (the run id aside).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// Number of records on the current-system side.
    pub total_current: usize,
    /// Number of records on the legacy side.
    pub total_legacy: usize,
    /// Matched keys whose tracked fields all compared equal.
    pub exact_matches: usize,
    /// Matched keys whose differences were all accepted.
    pub accepted_differences: usize,
    /// Keys present only in the current-system collection.
    pub only_in_current: Vec<RecordKey>,
    /// Keys present only in the legacy collection.
    pub only_in_legacy: Vec<RecordKey>,
    /// Matched keys with accepted differences only, with the raw diffs.
    pub accepted: Vec<KeyDiff>,
    /// Matched keys with at least one true mismatch, with all diffs.
    pub mismatches: Vec<KeyDiff>,
}

impl ReconciliationResult {
    /// True when every record matched exactly or with accepted
    /// differences and neither side had extra records.
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
            && self.only_in_current.is_empty()
            && self.only_in_legacy.is_empty()
    }
}

/// Joins and compares the two sides.
///
/// # Arguments
///
/// * `current` - The computed current-system records
/// * `legacy` - The parsed legacy records
/// * `policy` - Field comparison and accepted-difference rules
///
/// # Errors
///
/// Returns `DuplicateKey` if the same key appears twice within one side;
/// that is an internal invariant violation, not a reconciliation finding.
pub fn reconcile(
    current: &[ComparableRecord],
    legacy: &[ComparableRecord],
    policy: &ComparisonPolicy,
) -> EngineResult<ReconciliationResult> {
    let current_by_key = index_side(current, "current")?;
    let legacy_by_key = index_side(legacy, "legacy")?;

    let all_keys: BTreeSet<RecordKey> = current_by_key
        .keys()
        .chain(legacy_by_key.keys())
        .copied()
        .collect();

    let mut result = ReconciliationResult {
        run_id: Uuid::new_v4(),
        total_current: current.len(),
        total_legacy: legacy.len(),
        exact_matches: 0,
        accepted_differences: 0,
        only_in_current: Vec::new(),
        only_in_legacy: Vec::new(),
        accepted: Vec::new(),
        mismatches: Vec::new(),
    };

    for key in all_keys {
        match (current_by_key.get(&key), legacy_by_key.get(&key)) {
            (Some(current_record), Some(legacy_record)) => {
                let diffs = compare_fields(key, current_record, legacy_record, policy);
                if diffs.is_empty() {
                    result.exact_matches += 1;
                } else if diffs.iter().all(|d| d.accepted) {
                    result.accepted_differences += 1;
                    result.accepted.push(KeyDiff { key, fields: diffs });
                } else {
                    result.mismatches.push(KeyDiff { key, fields: diffs });
                }
            }
            (Some(_), None) => result.only_in_current.push(key),
            (None, Some(_)) => result.only_in_legacy.push(key),
            (None, None) => unreachable!("key came from one of the sides"),
        }
    }

    info!(
        run_id = %result.run_id,
        total_current = result.total_current,
        total_legacy = result.total_legacy,
        exact = result.exact_matches,
        accepted = result.accepted_differences,
        mismatched = result.mismatches.len(),
        "Reconciliation complete"
    );

    Ok(result)
}

/// Indexes one side by key, rejecting duplicates.
fn index_side<'a>(
    records: &'a [ComparableRecord],
    side: &str,
) -> EngineResult<BTreeMap<RecordKey, &'a ComparableRecord>> {
    let mut by_key = BTreeMap::new();
    for record in records {
        if by_key.insert(record.key, record).is_some() {
            return Err(EngineError::DuplicateKey {
                key: record.key.to_string(),
                side: side.to_string(),
            });
        }
    }
    Ok(by_key)
}

/// Compares the tracked fields of one matched pair.
///
/// Tracked fields are those present on both sides; the legacy report
/// carries a subset of the snapshot's fields.
fn compare_fields(
    key: RecordKey,
    current: &ComparableRecord,
    legacy: &ComparableRecord,
    policy: &ComparisonPolicy,
) -> Vec<FieldDiff> {
    let mut diffs = Vec::new();

    for (field, current_value) in &current.fields {
        let Some(legacy_value) = legacy.fields.get(field) else {
            continue;
        };
        if policy.values_equal(current_value, legacy_value) {
            continue;
        }

        let accept_reason = policy.accepted_reason(&key, field, current_value, legacy_value);
        diffs.push(FieldDiff {
            field: field.clone(),
            current: current_value.to_string(),
            legacy: legacy_value.to_string(),
            accepted: accept_reason.is_some(),
            accept_reason,
        });
    }

    diffs
}
