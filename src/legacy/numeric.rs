//! Numeric and date conventions of the legacy report text.
//!
//! These are named, separately tested policy functions so that a future
//! end of legacy-parity requirements is a localized deletion.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{EngineError, EngineResult};

/// Parses a legacy currency amount.
///
/// Legacy amounts carry thousands-separator commas and mark negatives with
/// a trailing minus sign rather than a leading one.
///
/// # Example
///
/// ```
/// use vesting_engine::legacy::parse_legacy_amount;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(
///     parse_legacy_amount("45,072.21-").unwrap(),
///     Decimal::from_str("-45072.21").unwrap()
/// );
/// assert_eq!(
///     parse_legacy_amount("100.00").unwrap(),
///     Decimal::from_str("100.00").unwrap()
/// );
/// ```
pub fn parse_legacy_amount(text: &str) -> EngineResult<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EngineError::CalculationError {
            message: "empty amount field".to_string(),
        });
    }

    let (digits, negative) = match trimmed.strip_suffix('-') {
        Some(rest) => (rest, true),
        None => (trimmed, false),
    };

    let cleaned: String = digits.chars().filter(|c| *c != ',').collect();
    let amount = Decimal::from_str(&cleaned).map_err(|_| EngineError::CalculationError {
        message: format!("'{}' is not a legacy amount", trimmed),
    })?;

    Ok(if negative { -amount } else { amount })
}

/// Resolves a two-digit legacy year to a four-digit year.
///
/// Two-digit year fields follow a pivot rule: digits that, when added to
/// 2000, would project past the reference year are interpreted as 19xx.
/// Applied only when decoding legacy text, never to the live system's
/// native date storage.
///
/// # Example
///
/// ```
/// use vesting_engine::legacy::pivot_two_digit_year;
///
/// assert_eq!(pivot_two_digit_year(98, 2024), 1998);
/// assert_eq!(pivot_two_digit_year(15, 2024), 2015);
/// assert_eq!(pivot_two_digit_year(24, 2024), 2024);
/// ```
pub fn pivot_two_digit_year(two_digit_year: i32, reference_year: i32) -> i32 {
    if 2000 + two_digit_year > reference_year {
        1900 + two_digit_year
    } else {
        2000 + two_digit_year
    }
}

/// Parses a 6-character YYMMDD legacy date field.
///
/// A blank field decodes to `None` (the report leaves the column empty for
/// active participants). The year is resolved with
/// [`pivot_two_digit_year`] against the reference year.
pub fn parse_legacy_date(text: &str, reference_year: i32) -> EngineResult<Option<NaiveDate>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.len() != 6 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EngineError::CalculationError {
            message: format!("'{}' is not a YYMMDD date", trimmed),
        });
    }

    let yy: i32 = trimmed[0..2].parse().map_err(|_| EngineError::CalculationError {
        message: format!("'{}' has a bad year", trimmed),
    })?;
    let month: u32 = trimmed[2..4].parse().map_err(|_| EngineError::CalculationError {
        message: format!("'{}' has a bad month", trimmed),
    })?;
    let day: u32 = trimmed[4..6].parse().map_err(|_| EngineError::CalculationError {
        message: format!("'{}' has a bad day", trimmed),
    })?;

    let year = pivot_two_digit_year(yy, reference_year);
    NaiveDate::from_ymd_opt(year, month, day)
        .map(Some)
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("'{}' is not a calendar date", trimmed),
        })
}

/// Splits a legacy identifier into badge number and beneficiary suffix.
///
/// Identifiers longer than 7 characters are a 6-7 digit badge followed by
/// a 4-digit beneficiary suffix; shorter identifiers are a bare badge with
/// implicit suffix 0. The split is by field width alone.
///
/// # Example
///
/// ```
/// use vesting_engine::legacy::split_badge_identifier;
///
/// assert_eq!(split_badge_identifier("7039171000").unwrap(), (703917, 1000));
/// assert_eq!(split_badge_identifier("707319").unwrap(), (707319, 0));
/// ```
pub fn split_badge_identifier(text: &str) -> EngineResult<(u32, u16)> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EngineError::CalculationError {
            message: format!("'{}' is not a badge identifier", trimmed),
        });
    }

    if trimmed.len() > 7 {
        let split_at = trimmed.len() - 4;
        let badge = trimmed[..split_at]
            .parse()
            .map_err(|_| EngineError::CalculationError {
                message: format!("'{}' has a bad badge part", trimmed),
            })?;
        let suffix = trimmed[split_at..]
            .parse()
            .map_err(|_| EngineError::CalculationError {
                message: format!("'{}' has a bad suffix part", trimmed),
            })?;
        Ok((badge, suffix))
    } else {
        let badge = trimmed.parse().map_err(|_| EngineError::CalculationError {
            message: format!("'{}' is not a badge number", trimmed),
        })?;
        Ok((badge, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_trailing_minus_negatives() {
        assert_eq!(parse_legacy_amount("45,072.21-").unwrap(), dec("-45072.21"));
        assert_eq!(parse_legacy_amount("9,000.00-").unwrap(), dec("-9000.00"));
    }

    #[test]
    fn test_positive_amount() {
        assert_eq!(parse_legacy_amount("100.00").unwrap(), dec("100.00"));
        assert_eq!(
            parse_legacy_amount("24,692,640.86").unwrap(),
            dec("24692640.86")
        );
    }

    #[test]
    fn test_amount_with_padding() {
        assert_eq!(parse_legacy_amount("    9,439.79-").unwrap(), dec("-9439.79"));
    }

    #[test]
    fn test_empty_amount_is_an_error() {
        assert!(parse_legacy_amount("   ").is_err());
    }

    #[test]
    fn test_garbage_amount_is_an_error() {
        assert!(parse_legacy_amount("N/A").is_err());
    }

    #[test]
    fn test_pivot_past_years_stay_in_2000s() {
        assert_eq!(pivot_two_digit_year(0, 2024), 2000);
        assert_eq!(pivot_two_digit_year(24, 2024), 2024);
    }

    #[test]
    fn test_pivot_future_years_fall_back_to_1900s() {
        assert_eq!(pivot_two_digit_year(25, 2024), 1925);
        assert_eq!(pivot_two_digit_year(98, 2024), 1998);
        assert_eq!(pivot_two_digit_year(67, 2024), 1967);
    }

    #[test]
    fn test_parse_date_with_pivot() {
        assert_eq!(
            parse_legacy_date("980315", 2024).unwrap(),
            Some(NaiveDate::from_ymd_opt(1998, 3, 15).unwrap())
        );
        assert_eq!(
            parse_legacy_date("240701", 2024).unwrap(),
            Some(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap())
        );
    }

    #[test]
    fn test_blank_date_is_none() {
        assert_eq!(parse_legacy_date("      ", 2024).unwrap(), None);
        assert_eq!(parse_legacy_date("", 2024).unwrap(), None);
    }

    #[test]
    fn test_invalid_date_is_an_error() {
        assert!(parse_legacy_date("991332", 2024).is_err());
        assert!(parse_legacy_date("12345", 2024).is_err());
        assert!(parse_legacy_date("ABCDEF", 2024).is_err());
    }

    #[test]
    fn test_long_identifier_splits_badge_and_suffix() {
        assert_eq!(split_badge_identifier("7039171000").unwrap(), (703917, 1000));
        // A 7-digit badge with a suffix makes an 11-character identifier
        assert_eq!(
            split_badge_identifier("10739171000").unwrap(),
            (1073917, 1000)
        );
    }

    #[test]
    fn test_short_identifier_is_bare_badge() {
        assert_eq!(split_badge_identifier("707319").unwrap(), (707319, 0));
        assert_eq!(split_badge_identifier("  707319 ").unwrap(), (707319, 0));
    }

    #[test]
    fn test_seven_character_identifier_is_bare_badge() {
        assert_eq!(split_badge_identifier("1073917").unwrap(), (1073917, 0));
    }

    #[test]
    fn test_non_numeric_identifier_is_an_error() {
        assert!(split_badge_identifier("70391A").is_err());
        assert!(split_badge_identifier("").is_err());
    }
}
