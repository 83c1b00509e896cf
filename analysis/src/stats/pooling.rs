//! Pool several Likert items into one 3-bin frequency vector.
//!
//! Related items are treated as repeated measures of one construct: every
//! listed column is sliced to the respondent range, concatenated, collapsed
//! to {Disagree, Neutral, Agree} and tallied.

use std::ops::Range;

use crate::binning::collapse_to_three;
use crate::error::AnalysisResult;
use crate::parser::{Cell, SurveyTable};

/// Frequencies in 3-point scale order: [Disagree, Neutral, Agree].
pub type PooledCounts = [u64; 3];

/// Tally the 3-bin responses of `column_indices` over `row_range`.
///
/// The row range is clamped to the table height. A column index beyond the
/// table width is an error.
pub fn pooled_counts(
    table: &SurveyTable,
    column_indices: &[usize],
    row_range: Range<usize>,
) -> AnalysisResult<PooledCounts> {
    let rows = table.clamp_rows(row_range);
    let mut cells: Vec<Cell> = Vec::new();
    for &index in column_indices {
        let column = table.column(index)?;
        cells.extend(column[rows.clone()].iter().cloned());
    }

    let series = collapse_to_three(cells);
    let mut counts = [0u64; 3];
    for (slot, count) in counts.iter_mut().zip(series.counts()) {
        *slot = count;
    }

    tracing::debug!(
        columns = ?column_indices,
        rows = ?rows,
        valid = series.len(),
        dropped = series.dropped(),
        "pooled item counts"
    );

    Ok(counts)
}
