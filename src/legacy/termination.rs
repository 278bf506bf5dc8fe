//! The termination report format.
//!
//! Decodes the legacy year-end termination report: one detail row per
//! terminated participant (or beneficiary share) and a totals section.
//! The column layout is fixed; a new report type gets its own field table
//! and reuses the shared state machine and numeric conventions.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

use super::field_spec::FieldSpec;
use super::numeric::{parse_legacy_amount, parse_legacy_date, split_badge_identifier};
use super::parser::parse_report;

/// Badge/PSN identifier, optionally carrying a 4-digit beneficiary suffix.
const FIELD_IDENTIFIER: FieldSpec = FieldSpec::fixed("identifier", 0, 12);
/// Participant name.
const FIELD_NAME: FieldSpec = FieldSpec::fixed("name", 12, 19);
/// Six consecutive right-aligned currency columns.
const FIELD_BEGINNING_BALANCE: FieldSpec = FieldSpec::fixed("beginning_balance", 31, 13);
const FIELD_CONTRIBUTIONS: FieldSpec = FieldSpec::fixed("contributions", 44, 13);
const FIELD_EARNINGS: FieldSpec = FieldSpec::fixed("earnings", 57, 13);
const FIELD_PROFIT_SHARING: FieldSpec = FieldSpec::fixed("profit_sharing", 70, 13);
const FIELD_VESTED: FieldSpec = FieldSpec::fixed("vested", 83, 13);
const FIELD_FORFEITURE: FieldSpec = FieldSpec::fixed("forfeiture", 96, 13);
/// YYMMDD termination date; blank for beneficiary rows.
const FIELD_TERM_DATE: FieldSpec = FieldSpec::fixed("term_date", 110, 6);
/// Trailing space-delimited hours, vesting percent, age, enrollment code.
const FIELD_TOKENS: FieldSpec = FieldSpec::to_end("tokens", 117);

/// Minimum length for a termination report line to be a data row.
const MIN_DATA_ROW_LEN: usize = 100;

/// One decoded termination report detail row.
///
/// Exists only transiently during reconciliation; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminationRow {
    /// Badge number.
    pub badge: u32,
    /// Beneficiary suffix; 0 for the participant's own row.
    pub suffix: u16,
    /// Participant name as printed.
    pub name: String,
    /// Balance at the start of the profit year.
    pub beginning_balance: Decimal,
    /// Contributions posted during the year.
    pub contributions: Decimal,
    /// Earnings allocated during the year.
    pub earnings: Decimal,
    /// Amount in profit sharing at year end.
    pub profit_sharing: Decimal,
    /// Vested amount at year end.
    pub vested: Decimal,
    /// Forfeited amount (negative when forfeited out).
    pub forfeiture: Decimal,
    /// Termination date, century-pivoted; blank for beneficiary rows.
    pub termination_date: Option<NaiveDate>,
    /// Hours worked in the profit year.
    pub hours: u32,
    /// Vesting percent as printed (whole number).
    pub vesting_percent: u32,
    /// Age at year end as printed.
    pub age: u32,
    /// The legacy enrollment code digit.
    pub enrollment_code: u8,
}

/// The termination report's totals section.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminationTotals {
    /// Sum of the profit-sharing column.
    pub profit_sharing: Decimal,
    /// Sum of the vested column.
    pub vested: Decimal,
    /// Sum of the forfeiture column.
    pub forfeitures: Decimal,
}

/// A fully decoded and totals-verified termination report.
#[derive(Debug, Clone)]
pub struct TerminationReport {
    /// The detail rows in report order.
    pub rows: Vec<TerminationRow>,
    /// The totals section as stated by the report.
    pub totals: TerminationTotals,
}

impl TerminationReport {
    /// Parses and verifies a termination report.
    ///
    /// After decoding, the detail-row sums are recomputed and compared to
    /// the report's own totals section; any difference signals a parsing
    /// defect (wrong column offsets) rather than a business discrepancy
    /// and fails loudly.
    ///
    /// # Arguments
    ///
    /// * `text` - The full report text
    /// * `reference_year` - The profit year of the report, anchoring the
    ///   two-digit-year century pivot
    ///
    /// # Errors
    ///
    /// Returns `MissingTotals` when the totals section is absent and
    /// `TotalsMismatch` when the detail rows do not sum to it.
    pub fn parse(text: &str, reference_year: i32) -> EngineResult<Self> {
        let parsed = parse_report(text, MIN_DATA_ROW_LEN, "TOTAL", |line| {
            parse_termination_row(line, reference_year)
        })?;

        let totals = TerminationTotals {
            profit_sharing: required_total(&parsed, "TOTAL PROFIT SHARING")?,
            vested: required_total(&parsed, "TOTAL VESTED")?,
            forfeitures: required_total(&parsed, "TOTAL FORFEITURES")?,
        };

        let report = Self {
            rows: parsed.rows,
            totals,
        };
        report.verify_totals()?;
        Ok(report)
    }

    /// Recomputes the column sums and asserts they equal the totals
    /// section.
    pub fn verify_totals(&self) -> EngineResult<()> {
        let checks = [
            (
                "TOTAL PROFIT SHARING",
                self.rows.iter().map(|r| r.profit_sharing).sum::<Decimal>(),
                self.totals.profit_sharing,
            ),
            (
                "TOTAL VESTED",
                self.rows.iter().map(|r| r.vested).sum::<Decimal>(),
                self.totals.vested,
            ),
            (
                "TOTAL FORFEITURES",
                self.rows.iter().map(|r| r.forfeiture).sum::<Decimal>(),
                self.totals.forfeitures,
            ),
        ];

        for (label, computed, reported) in checks {
            if computed != reported {
                return Err(EngineError::TotalsMismatch {
                    label: label.to_string(),
                    computed,
                    reported,
                });
            }
        }
        Ok(())
    }
}

/// Pulls a required label from the parsed totals section.
fn required_total(
    parsed: &super::parser::ParsedReport<TerminationRow>,
    label: &str,
) -> EngineResult<Decimal> {
    parsed.total(label).ok_or_else(|| EngineError::MissingTotals {
        label: label.to_string(),
    })
}

/// Decodes one termination report detail row.
fn parse_termination_row(line: &str, reference_year: i32) -> EngineResult<TerminationRow> {
    let (badge, suffix) = split_badge_identifier(FIELD_IDENTIFIER.extract(line))?;
    let name = FIELD_NAME.extract(line).trim().to_string();

    let beginning_balance = parse_legacy_amount(FIELD_BEGINNING_BALANCE.extract(line))?;
    let contributions = parse_legacy_amount(FIELD_CONTRIBUTIONS.extract(line))?;
    let earnings = parse_legacy_amount(FIELD_EARNINGS.extract(line))?;
    let profit_sharing = parse_legacy_amount(FIELD_PROFIT_SHARING.extract(line))?;
    let vested = parse_legacy_amount(FIELD_VESTED.extract(line))?;
    let forfeiture = parse_legacy_amount(FIELD_FORFEITURE.extract(line))?;

    let termination_date = parse_legacy_date(FIELD_TERM_DATE.extract(line), reference_year)?;

    let tokens: Vec<&str> = FIELD_TOKENS.extract(line).split_whitespace().collect();
    if tokens.len() != 4 {
        return Err(EngineError::CalculationError {
            message: format!(
                "expected 4 trailing tokens (hours, percent, age, code), found {}",
                tokens.len()
            ),
        });
    }
    let parse_token = |index: usize, what: &str| -> EngineResult<u32> {
        tokens[index]
            .parse()
            .map_err(|_| EngineError::CalculationError {
                message: format!("'{}' is not a valid {}", tokens[index], what),
            })
    };
    let hours = parse_token(0, "hours figure")?;
    let vesting_percent = parse_token(1, "vesting percent")?;
    let age = parse_token(2, "age")?;
    let enrollment_code = parse_token(3, "enrollment code")? as u8;

    Ok(TerminationRow {
        badge,
        suffix,
        name,
        beginning_balance,
        contributions,
        earnings,
        profit_sharing,
        vested,
        forfeiture,
        termination_date,
        hours,
        vesting_percent,
        age,
        enrollment_code,
    })
}
