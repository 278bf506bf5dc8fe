//! Legacy-parity reconciliation.
//!
//! Joins computed participant snapshots against parsed legacy report rows
//! and reports exact matches, accepted differences, and true mismatches
//! for sign-off tooling and CI gating.

mod diff;
mod policy;

pub use diff::{FieldDiff, KeyDiff, ReconciliationResult, reconcile};
pub use policy::{AcceptRule, ComparableRecord, ComparisonPolicy, FieldValue, RecordKey};

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;

use crate::calculation::age_at;
use crate::legacy::TerminationRow;
use crate::models::ParticipantSnapshot;

/// Converts a computed snapshot into a comparable record.
///
/// The tracked fields mirror what the legacy termination report prints:
/// the profit-sharing balance, the vested amount, the whole-number vesting
/// percent, hours, age at year end, the enrollment code, and the
/// termination date. A missing termination date is rendered as "-" so an
/// absent-versus-present disagreement surfaces as a field mismatch.
pub fn snapshot_record(snapshot: &ParticipantSnapshot) -> ComparableRecord {
    let year_end = NaiveDate::from_ymd_opt(snapshot.profit_year, 12, 31)
        .unwrap_or(snapshot.date_of_birth);
    let age = age_at(snapshot.date_of_birth, year_end);

    ComparableRecord::new(RecordKey::new(snapshot.badge, 0))
        .with_field("profit_sharing", FieldValue::Amount(snapshot.current_balance))
        .with_field("vested", FieldValue::Amount(snapshot.vested_balance))
        .with_field(
            "vesting_percent",
            FieldValue::Int(snapshot.vesting_percent.trunc().to_i64().unwrap_or(0)),
        )
        .with_field(
            "hours",
            FieldValue::Int(snapshot.hours.trunc().to_i64().unwrap_or(0)),
        )
        .with_field("age", FieldValue::Int(i64::from(age)))
        .with_field(
            "enrollment_code",
            FieldValue::Int(i64::from(snapshot.enrollment.legacy_code())),
        )
        .with_field("term_date", date_field(snapshot.termination_date))
}

/// Converts a parsed legacy termination row into a comparable record.
pub fn termination_record(row: &TerminationRow) -> ComparableRecord {
    ComparableRecord::new(RecordKey::new(row.badge, row.suffix))
        .with_field("profit_sharing", FieldValue::Amount(row.profit_sharing))
        .with_field("vested", FieldValue::Amount(row.vested))
        .with_field(
            "vesting_percent",
            FieldValue::Int(i64::from(row.vesting_percent)),
        )
        .with_field("hours", FieldValue::Int(i64::from(row.hours)))
        .with_field("age", FieldValue::Int(i64::from(row.age)))
        .with_field(
            "enrollment_code",
            FieldValue::Int(i64::from(row.enrollment_code)),
        )
        .with_field("term_date", date_field(row.termination_date))
}

/// Renders an optional date so both sides align on absence.
fn date_field(date: Option<NaiveDate>) -> FieldValue {
    match date {
        Some(date) => FieldValue::Date(date),
        None => FieldValue::Text("-".to_string()),
    }
}
