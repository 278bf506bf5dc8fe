//! Contribution models.
//!
//! This module defines historical contribution records and the
//! military/special contribution request validated out of cycle.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A posted profit-sharing contribution for one badge and year.
///
/// # Example
///
/// ```
/// use vesting_engine::models::ContributionRecord;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let record = ContributionRecord {
///     badge: 703917,
///     profit_year: 2024,
///     contribution_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
///     amount: Decimal::from_str("1850.00").unwrap(),
///     is_supplemental: false,
/// };
/// assert!(!record.is_supplemental);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionRecord {
    /// Badge number the contribution belongs to.
    pub badge: u32,
    /// The profit year the contribution was posted against.
    pub profit_year: i32,
    /// The date the contribution was made.
    pub contribution_date: NaiveDate,
    /// The contribution amount.
    pub amount: Decimal,
    /// True for supplemental contributions (corrections and late postings
    /// for a year other than the contribution-date year).
    pub is_supplemental: bool,
}

/// A military or special contribution submitted for validation.
///
/// These are out-of-cycle postings; the validator in
/// [`crate::validation`] checks them against the plan's eligibility rules
/// before they are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilitaryContribution {
    /// Badge number of the employee the contribution is for.
    pub badge: u32,
    /// The contribution amount.
    pub amount: Decimal,
    /// The profit year the contribution is to be posted against.
    pub profit_year: i32,
    /// The date of the contribution itself.
    pub contribution_date: NaiveDate,
    /// True if the submitter marked the contribution supplemental.
    pub is_supplemental: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_deserialize_contribution_record() {
        let json = r#"{
            "badge": 707319,
            "profit_year": 2023,
            "contribution_date": "2023-12-31",
            "amount": "2250.75",
            "is_supplemental": false
        }"#;

        let record: ContributionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.badge, 707319);
        assert_eq!(record.profit_year, 2023);
        assert_eq!(record.amount, Decimal::from_str("2250.75").unwrap());
    }

    #[test]
    fn test_military_contribution_round_trip() {
        let contribution = MilitaryContribution {
            badge: 703917,
            amount: Decimal::from_str("1500.00").unwrap(),
            profit_year: 2024,
            contribution_date: NaiveDate::from_ymd_opt(2023, 11, 2).unwrap(),
            is_supplemental: true,
        };

        let json = serde_json::to_string(&contribution).unwrap();
        let deserialized: MilitaryContribution = serde_json::from_str(&json).unwrap();
        assert_eq!(contribution, deserialized);
    }
}
