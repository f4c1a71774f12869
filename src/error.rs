//! Unified error hierarchy for bodycomp
//!
//! Data problems inside an export never surface as errors to callers of the
//! engine: rows are dropped and logged. The types here describe why a row was
//! dropped and what can go wrong at the I/O edges (files, preference storage,
//! exports).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all bodycomp operations
#[derive(Debug, Error)]
pub enum BodyCompError {
    /// Measurement import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Preference store errors
    #[error("Preference error: {0}")]
    Preferences(#[from] PreferenceError),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Reasons an export (or a single row of it) could not be imported
#[derive(Debug, Error)]
pub enum ImportError {
    /// Source file could not be read
    #[error("Cannot read {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    /// Row has fewer fields than the minimum
    #[error("Line {line}: expected at least {expected} fields, found {found}")]
    TooFewFields {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Weight cell is blank or not a number
    #[error("Line {line}: weight is missing or not numeric")]
    MissingWeight { line: u64 },

    /// Date-time cell could not be parsed
    #[error("Line {line}: unrecognised date-time '{value}'")]
    InvalidTimestamp { line: u64, value: String },

    /// Record could not be tokenised
    #[error("Line {line}: malformed record: {reason}")]
    MalformedRecord { line: u64, reason: String },
}

impl ImportError {
    /// Whether the error only affects one row and the import can go on
    pub fn is_row_level(&self) -> bool {
        !matches!(self, ImportError::Unreadable { .. })
    }
}

/// Preference store errors
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// Backing file could not be read or written
    #[error("Preference storage failed at {path}: {reason}")]
    Storage { path: PathBuf, reason: String },

    /// Backing file exists but is not valid TOML
    #[error("Preference file {path} is corrupted: {reason}")]
    Corrupted { path: PathBuf, reason: String },
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing the output failed
    #[error("Export failed to {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    /// Encoding the data failed
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Requested format is not supported
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::WriteFailed {
            path: PathBuf::new(),
            reason: err.to_string(),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::SerializationError(err.to_string())
    }
}

/// Result type alias for bodycomp operations
pub type Result<T> = std::result::Result<T, BodyCompError>;

impl BodyCompError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BodyCompError::Import(err) if err.is_row_level() => ErrorSeverity::Info,
            BodyCompError::Import(_) => ErrorSeverity::Error,
            BodyCompError::Preferences(_) => ErrorSeverity::Warning,
            BodyCompError::Export(ExportError::SerializationError(_)) => ErrorSeverity::Critical,
            BodyCompError::Export(_) => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            BodyCompError::Import(ImportError::Unreadable { path, .. }) => {
                format!("Could not read measurement export: {}", path.display())
            }
            BodyCompError::Preferences(PreferenceError::Storage { path, .. }) => {
                format!(
                    "Unable to save your gender/height preferences to {}. They apply to this session only.",
                    path.display()
                )
            }
            BodyCompError::Export(ExportError::WriteFailed { path, .. }) => {
                format!("Could not write report to {}", path.display())
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
    /// Informational message
    Info,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }
}
