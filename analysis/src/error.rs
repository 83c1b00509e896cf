//! Error types for the survey analysis pipeline.
//!
//! - [`LoadError`] - Reading and decoding survey sheets
//! - [`AnalysisError`] - Structural failures in pairing and statistics
//! - [`ExportError`] - Writing CSV/JSON artefacts
//! - [`ConfigError`] - Loading the analysis configuration
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Responses outside the active scale are not errors: the binner drops them.
//! Everything listed here propagates to the caller.

use thiserror::Error;

// =============================================================================
// Loading Errors
// =============================================================================

/// Errors while reading a survey sheet.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited text.
    #[error("Invalid CSV at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Empty file.
    #[error("Survey sheet is empty")]
    EmptyFile,
}

// =============================================================================
// Analysis Errors
// =============================================================================

/// Structural failures while pairing responses or computing statistics.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// A positional column index beyond the table width.
    #[error("Column index {index} is out of range (table has {width} columns)")]
    MissingColumn { index: usize, width: usize },

    /// A contingency table with a zero marginal, or too few rows/columns.
    #[error("Degenerate contingency table: {reason}")]
    DegenerateTable { reason: String },

    /// Keyed alignment requested but a series has no respondent keys.
    #[error("Keyed alignment requires respondent keys on the {side} series")]
    MissingJoinKey { side: &'static str },

    /// The same respondent key appears twice on one side.
    #[error("Duplicate respondent key '{key}' in the {side} series")]
    DuplicateJoinKey { key: String, side: &'static str },

    /// Count matrix does not match its labels.
    #[error("Invalid counts: {0}")]
    InvalidCounts(String),

    /// A scale with no labels or repeated labels.
    #[error("Invalid scale: {0}")]
    InvalidScale(String),

    /// Diagram layout does not fit the table.
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Failure inside the statistics backend.
    #[error("Statistics error: {0}")]
    Statistics(String),
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while writing output artefacts.
#[derive(Debug, Error)]
pub enum ExportError {
    /// IO error.
    #[error("Export IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error.
    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON export error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading [`crate::config::AnalysisConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML.
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Well-formed but unusable settings.
    #[error("Invalid setting '{field}': {message}")]
    Invalid { field: String, message: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::pipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Analysis error.
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
