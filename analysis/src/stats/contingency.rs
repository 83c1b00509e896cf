//! Pair two cleaned series and count their joint categories.
//!
//! # Alignment
//!
//! The before and after sheets are loaded independently and cleaned
//! independently, so which responses belong together has to be stated:
//!
//! | Policy      | Pairs by                                   |
//! |-------------|--------------------------------------------|
//! | `Dense`     | position after cleaning (legacy behaviour) |
//! | `SourceRow` | row position in the source sheet           |
//! | `Key`       | respondent key column                      |
//!
//! `Dense` reproduces the historical analysis: once a cell is dropped on one
//! side every later respondent shifts by one. It is kept so old outputs can
//! be regenerated, and it warns when the cleaned lengths disagree.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{CleanedSeries, ContingencyTable};

/// How before/after responses are matched into pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Re-index each cleaned series from zero and pair by position.
    Dense,
    /// Pair responses that came from the same sheet row.
    #[default]
    SourceRow,
    /// Pair responses carrying the same respondent key.
    Key,
}

/// A matched (before level, after level) observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    pub before: usize,
    pub after: usize,
}

/// Match responses from two series. Only pairwise-complete cases survive.
pub fn align(
    before: &CleanedSeries,
    after: &CleanedSeries,
    alignment: Alignment,
) -> AnalysisResult<Vec<Pair>> {
    let pairs = match alignment {
        Alignment::Dense => {
            if before.len() != after.len() {
                tracing::warn!(
                    before = before.len(),
                    after = after.len(),
                    "dense alignment over series of different lengths; pairs may be shifted"
                );
            }
            before
                .responses()
                .iter()
                .zip(after.responses())
                .map(|(b, a)| Pair {
                    before: b.level,
                    after: a.level,
                })
                .collect()
        }
        Alignment::SourceRow => {
            let after_by_row: HashMap<usize, usize> = after
                .responses()
                .iter()
                .map(|r| (r.row, r.level))
                .collect();
            before
                .responses()
                .iter()
                .filter_map(|b| {
                    after_by_row.get(&b.row).map(|&a| Pair {
                        before: b.level,
                        after: a,
                    })
                })
                .collect()
        }
        Alignment::Key => {
            let before_by_key = index_by_key(before, "before")?;
            let after_by_key = index_by_key(after, "after")?;
            before_by_key
                .iter()
                .filter_map(|(key, &b)| {
                    after_by_key.get(key).map(|&a| Pair {
                        before: b,
                        after: a,
                    })
                })
                .collect()
        }
    };

    Ok(pairs)
}

/// Key → level, in key order. Every response must carry a unique key.
fn index_by_key<'a>(
    series: &'a CleanedSeries,
    side: &'static str,
) -> AnalysisResult<BTreeMap<&'a str, usize>> {
    let mut by_key = BTreeMap::new();
    for response in series.responses() {
        let key = response
            .key
            .as_deref()
            .ok_or(AnalysisError::MissingJoinKey { side })?;
        if by_key.insert(key, response.level).is_some() {
            return Err(AnalysisError::DuplicateJoinKey {
                key: key.to_string(),
                side,
            });
        }
    }
    Ok(by_key)
}

/// Build the before × after transition table.
///
/// Rows follow the before scale and columns the after scale; every category
/// is present even when its counts are zero.
pub fn transition_table(
    before: &CleanedSeries,
    after: &CleanedSeries,
    alignment: Alignment,
) -> AnalysisResult<ContingencyTable> {
    let pairs = align(before, after, alignment)?;
    let mut table = ContingencyTable::zeros(before.scale(), after.scale());
    for pair in &pairs {
        table.increment(pair.before, pair.after);
    }

    tracing::debug!(
        ?alignment,
        pairs = pairs.len(),
        before = before.len(),
        after = after.len(),
        "built transition table"
    );

    Ok(table)
}

/// Stack frequency vectors as rows of one table over shared columns.
pub fn stack_counts(
    row_labels: &[&str],
    column_labels: &[String],
    rows: &[&[u64]],
) -> AnalysisResult<ContingencyTable> {
    ContingencyTable::new(
        row_labels.iter().map(|s| s.to_string()).collect(),
        column_labels.to_vec(),
        rows.iter().map(|r| r.to_vec()).collect(),
    )
}
