//! # Survey Shift - before/after Likert survey analysis
//!
//! Survey Shift loads pre/post questionnaire sheets, bins Likert responses,
//! and produces the data behind transition (Sankey) figures, stacked Likert
//! bar charts, and chi-square comparisons between respondent groups.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV sheet  │────▶│   Parser    │────▶│   Binning   │────▶│    Stats    │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (5/3-point) │     │ (pair, χ²)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                            ┌─────────────┐     ┌─────────────┐     │
//!                            │  CSV / JSON │◀────│   Render    │◀────┘
//!                            │  artefacts  │     │  (Sankey)   │
//!                            └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use survey_shift::{chi_square_2x3, collapse_to_three, transition_table, Alignment};
//!
//! let before = collapse_to_three([Some("Strongly agree"), Some("Neutral")]);
//! let after = collapse_to_three([Some("Agree"), Some("Disagree")]);
//! let table = transition_table(&before, &after, Alignment::SourceRow)?;
//!
//! let result = chi_square_2x3([5, 2, 10], [8, 3, 6])?;
//! println!("χ² = {:.3}, p = {:.3}", result.statistic, result.p_value);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Scales, cleaned series, contingency tables
//! - [`parser`] - CSV loading with auto-detection
//! - [`binning`] - Likert binning policies
//! - [`stats`] - Pairing, pooling, chi-square, distributions
//! - [`render`] - Sankey diagram descriptions
//! - [`survey`] - Questionnaire layout and respondent groups
//! - [`config`] - TOML analysis configuration
//! - [`export`] - CSV/JSON writers
//! - [`pipeline`] - End-to-end analysis runs

// Core modules
pub mod error;
pub mod models;

// Loading
pub mod parser;

// Analysis
pub mod binning;
pub mod stats;
pub mod survey;

// Output
pub mod export;
pub mod render;

// Orchestration
pub mod config;
pub mod pipeline;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AnalysisError, AnalysisResult, ConfigError, ExportError, LoadError, PipelineError,
    PipelineResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{CleanedSeries, ContingencyTable, Response, Scale, FIVE_POINT, THREE_POINT};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, load_table, parse_bytes_auto, parse_str,
    ParseResult, SurveyTable,
};

// =============================================================================
// Re-exports - Binning & Statistics
// =============================================================================

pub use binning::{clean_to_scale, collapse_to_three, Binning};

pub use stats::{
    align, chi_square_2x3, chi_square_independence, pooled_counts, stack_counts,
    transition_table, Alignment, ChiSquareResult, ItemDistribution, LikertSummary, Pair,
    PooledCounts,
};

// =============================================================================
// Re-exports - Survey layout & configuration
// =============================================================================

pub use config::{AnalysisConfig, SankeySpec};
pub use survey::{FigureItem, Instrument, Item, QuestionGroup, RespondentGroup, Section};

// =============================================================================
// Re-exports - Rendering & export
// =============================================================================

pub use export::ChiSquareRecord;
pub use render::{NodeLayout, SankeyDiagram, SankeyOptions};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{
    likert_summary, run, run_group_comparison, run_transitions, GroupComparison, RunSummary,
    TransitionOptions, TransitionReport,
};
