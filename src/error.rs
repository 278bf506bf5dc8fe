//! Error types for the year-end computation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during year-end computation,
//! legacy report parsing, and reconciliation.

use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the year-end computation engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use vesting_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/file.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/file.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Vesting schedule identifier was not found in the configuration.
    #[error("Vesting schedule not found: {id}")]
    ScheduleNotFound {
        /// The schedule identifier that was not found.
        id: String,
    },

    /// A participant record was invalid or contained inconsistent data.
    #[error("Invalid participant field '{field}' for badge {badge}: {message}")]
    InvalidParticipant {
        /// The badge number of the participant.
        badge: u32,
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A single legacy report line could not be decoded.
    #[error("Report line {line_number} could not be parsed: {message}")]
    ReportLine {
        /// The 1-based line number in the report text.
        line_number: usize,
        /// A description of the parse defect.
        message: String,
    },

    /// The legacy report ended without a recognizable totals section.
    #[error("Report totals section is missing (expected label '{label}')")]
    MissingTotals {
        /// A totals label that was expected but never seen.
        label: String,
    },

    /// Parsed detail rows do not sum to the report's own totals section.
    #[error("Report totals mismatch for '{label}': detail rows sum to {computed}, report states {reported}")]
    TotalsMismatch {
        /// The totals label whose amount disagreed.
        label: String,
        /// The sum recomputed from the parsed detail rows.
        computed: Decimal,
        /// The amount parsed from the totals section.
        reported: Decimal,
    },

    /// The same join key appeared more than once within one side of a
    /// reconciliation input.
    #[error("Duplicate key {key} within the {side} collection")]
    DuplicateKey {
        /// The offending join key, formatted as badge-suffix.
        key: String,
        /// Which side of the join contained the duplicate.
        side: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
