//! Error types for the salesdash analytics backend.
//!
//! - [`DatasetError`] - loading and parsing the transaction CSV
//! - [`FilterError`] - invalid date-range input
//! - [`ConfigError`] - runtime configuration
//! - [`ServerError`] - HTTP layer, wraps the others
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Dataset Errors
// =============================================================================

/// Errors while loading the transaction dataset.
///
/// All of these are fatal at load time: the dashboard cannot start on a
/// file with missing columns or malformed values.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode file content.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Malformed CSV structure.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// A required column is absent from the header row.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A data row holds more fields than the header.
    #[error("Line {line}: expected {expected} fields, saw {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A cell could not be parsed into its column type.
    #[error("Line {line}, column '{column}' (value '{value}'): {message}")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
        message: String,
    },
}

impl DatasetError {
    pub fn invalid_value(
        line: usize,
        column: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            line,
            column: column.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Filter Errors
// =============================================================================

/// Errors in a requested date range.
#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    /// Start date after end date.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    /// Date string not in `YYYY-MM-DD` form.
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors while reading runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No dataset path given by flag or environment.
    #[error("No dataset configured: pass --data or set SALESDASH_DATA")]
    MissingDataPath,

    /// Port value is not a valid u16.
    #[error("Invalid port '{0}'")]
    InvalidPort(String),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Dataset could not be loaded.
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Bad date-range query.
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    /// Configuration problem.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for dataset loading.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Result type for date-range handling.
pub type FilterResult<T> = Result<T, FilterError>;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
