//! Statistics over cleaned responses.
//!
//! - `contingency`: Alignment of before/after series and transition tables
//! - `pooling`: Multi-item 3-bin frequency vectors per respondent group
//! - `chi_square`: Pearson independence test
//! - `likert`: Per-item distributions for stacked bar charts

pub mod chi_square;
pub mod contingency;
pub mod likert;
pub mod pooling;

pub use chi_square::{chi_square_2x3, chi_square_independence, ChiSquareResult};
pub use contingency::{align, stack_counts, transition_table, Alignment, Pair};
pub use likert::{ItemDistribution, LikertSummary, LABEL_THRESHOLD_PERCENT};
pub use pooling::{pooled_counts, PooledCounts};
