//! The report parsing state machine.
//!
//! Legacy reports interleave headers, page breaks, detail rows, and a
//! label-prefixed totals section. The parser walks the text line by line
//! through the states Skip, DataRow, TotalsLine, and Done; the concrete
//! field layout is supplied by the report format.

use rust_decimal::Decimal;
use tracing::warn;

use crate::error::{EngineError, EngineResult};

use super::numeric::parse_legacy_amount;

/// The decoded content of one legacy report.
#[derive(Debug, Clone)]
pub struct ParsedReport<R> {
    /// The typed detail rows, in report order.
    pub rows: Vec<R>,
    /// The totals section as (label, amount) pairs, in report order.
    pub totals: Vec<(String, Decimal)>,
}

impl<R> ParsedReport<R> {
    /// Returns the totals amount for a label, if the report stated one.
    pub fn total(&self, label: &str) -> Option<Decimal> {
        self.totals
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, amount)| *amount)
    }
}

/// The parser's position within the report structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    /// Before or between recognizable sections.
    Skip,
    /// Consuming detail rows.
    DataRow,
    /// Consuming the totals section.
    TotalsLine,
    /// Past the totals section; remaining lines are ignored.
    Done,
}

/// Classifies a single report line.
///
/// A line is a data row only if it exceeds the minimum length and begins,
/// after trimming leading spaces, with a digit; this excludes header and
/// label lines without requiring a full grammar. Totals lines are
/// recognized by the label prefix.
fn classify(line: &str, min_data_row_len: usize, totals_prefix: &str) -> ParserState {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ParserState::Skip;
    }
    if trimmed.starts_with(totals_prefix) {
        return ParserState::TotalsLine;
    }
    if line.len() > min_data_row_len && trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        return ParserState::DataRow;
    }
    ParserState::Skip
}

/// Parses a report's detail rows and totals section.
///
/// Malformed individual lines are skipped with a warning (headers and page
/// markers are expected); a report that ends without a totals section is a
/// hard failure, since unverified data must not feed financial
/// reconciliation.
///
/// # Arguments
///
/// * `text` - The full report text
/// * `min_data_row_len` - Minimum length for a line to be a data row
/// * `totals_prefix` - The label prefix of totals lines (e.g., "TOTAL")
/// * `parse_row` - Decodes one data row into the report's row type
///
/// # Errors
///
/// Returns `MissingTotals` when no totals section was found.
pub fn parse_report<R>(
    text: &str,
    min_data_row_len: usize,
    totals_prefix: &str,
    parse_row: impl Fn(&str) -> EngineResult<R>,
) -> EngineResult<ParsedReport<R>> {
    let mut rows = Vec::new();
    let mut totals = Vec::new();
    let mut state = ParserState::Skip;

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        if state == ParserState::Done {
            break;
        }

        match classify(line, min_data_row_len, totals_prefix) {
            ParserState::DataRow => {
                // A data row after the totals section ends the report
                if state == ParserState::TotalsLine {
                    state = ParserState::Done;
                    continue;
                }
                state = ParserState::DataRow;
                match parse_row(line) {
                    Ok(row) => rows.push(row),
                    Err(error) => {
                        warn!(line_number, %error, "Skipping unparseable data row");
                    }
                }
            }
            ParserState::TotalsLine => {
                state = ParserState::TotalsLine;
                match parse_totals_line(line, totals_prefix) {
                    Ok((label, amount)) => totals.push((label, amount)),
                    Err(error) => {
                        warn!(line_number, %error, "Skipping unparseable totals line");
                    }
                }
            }
            ParserState::Skip | ParserState::Done => {}
        }
    }

    if totals.is_empty() {
        return Err(EngineError::MissingTotals {
            label: totals_prefix.to_string(),
        });
    }

    Ok(ParsedReport { rows, totals })
}

/// Parses one label-prefixed totals line.
///
/// The amount is the final whitespace-delimited token; the label is
/// everything before it.
fn parse_totals_line(line: &str, totals_prefix: &str) -> EngineResult<(String, Decimal)> {
    let trimmed = line.trim();
    let (label, amount_text) =
        trimmed
            .rsplit_once(char::is_whitespace)
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("totals line '{}' has no amount", trimmed),
            })?;

    let label = label.trim();
    if !label.starts_with(totals_prefix) {
        return Err(EngineError::CalculationError {
            message: format!("'{}' is not a totals label", label),
        });
    }

    let amount = parse_legacy_amount(amount_text)?;
    Ok((label.to_string(), amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    /// A toy format: badge then amount, whitespace-delimited.
    fn parse_toy_row(line: &str) -> EngineResult<(u32, Decimal)> {
        let mut tokens = line.split_whitespace();
        let badge = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| EngineError::CalculationError {
                message: "bad badge".to_string(),
            })?;
        let amount = parse_legacy_amount(tokens.next().unwrap_or(""))?;
        Ok((badge, amount))
    }

    const TOY_REPORT: &str = "\
PROFIT SHARING REPORT              PAGE 1
RUN 12/31/24

703917            100.00
707319          1,250.50-

TOTAL BALANCE           1,150.50-
";

    #[test]
    fn test_parses_rows_and_totals() {
        let report = parse_report(TOY_REPORT, 10, "TOTAL", parse_toy_row).unwrap();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0], (703917, dec("100.00")));
        assert_eq!(report.rows[1], (707319, dec("-1250.50")));
        assert_eq!(report.total("TOTAL BALANCE"), Some(dec("-1150.50")));
        assert_eq!(report.total("TOTAL OTHER"), None);
    }

    #[test]
    fn test_headers_and_blanks_are_skipped() {
        // The header line starts with a letter; the run line starts with a
        // letter; blanks are empty. Only the two data rows survive.
        let report = parse_report(TOY_REPORT, 10, "TOTAL", parse_toy_row).unwrap();
        assert_eq!(report.rows.len(), 2);
    }

    #[test]
    fn test_short_numeric_lines_are_not_data_rows() {
        // A page number is numeric but shorter than the minimum
        let text = "42\n703917            100.00\nTOTAL BALANCE 100.00\n";
        let report = parse_report(text, 10, "TOTAL", parse_toy_row).unwrap();
        assert_eq!(report.rows.len(), 1);
    }

    #[test]
    fn test_missing_totals_is_a_hard_failure() {
        let text = "703917            100.00\n";
        let result = parse_report(text, 10, "TOTAL", parse_toy_row);

        match result {
            Err(EngineError::MissingTotals { label }) => assert_eq!(label, "TOTAL"),
            other => panic!("Expected MissingTotals, got {:?}", other),
        }
    }

    #[test]
    fn test_data_after_totals_ends_parsing() {
        let text = "\
703917            100.00
TOTAL BALANCE           100.00
707319            999.99
";
        let report = parse_report(text, 10, "TOTAL", parse_toy_row).unwrap();
        assert_eq!(report.rows.len(), 1);
    }

    #[test]
    fn test_unparseable_data_row_is_skipped_not_fatal() {
        let text = "\
703917            100.00
12/31/24 PAGE HEADER WITH LEADING DIGITS
TOTAL BALANCE           100.00
";
        let report = parse_report(text, 10, "TOTAL", parse_toy_row).unwrap();
        assert_eq!(report.rows.len(), 1);
    }
}
