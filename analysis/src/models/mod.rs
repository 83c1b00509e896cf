//! Domain models for the survey analysis pipeline.
//!
//! - [`Scale`] - Ordered Likert category labels
//! - [`Response`] - One validated response with its source row
//! - [`CleanedSeries`] - Responses guaranteed to belong to a scale
//! - [`ContingencyTable`] - Labelled matrix of joint counts
//!
//! All of these are built in one pass and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{AnalysisError, AnalysisResult};

/// Labels of the 5-point agreement scale, in ordinal order.
pub const FIVE_POINT: [&str; 5] = [
    "Strongly disagree",
    "Disagree",
    "Neutral",
    "Agree",
    "Strongly agree",
];

/// Labels of the collapsed 3-point scale, in ordinal order.
pub const THREE_POINT: [&str; 3] = ["Disagree", "Neutral", "Agree"];

// =============================================================================
// Scale
// =============================================================================

/// An ordered set of distinct category labels defining a Likert axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Scale {
    labels: Vec<String>,
}

impl Scale {
    /// Build a scale from labels. Labels must be non-empty and distinct.
    pub fn new<I, S>(labels: I) -> AnalysisResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(AnalysisError::InvalidScale("scale has no labels".into()));
        }
        let mut seen = HashSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(AnalysisError::InvalidScale(format!(
                    "label '{}' appears more than once",
                    label
                )));
            }
        }
        Ok(Self { labels })
    }

    /// The 5-point agreement scale.
    pub fn five_point() -> Self {
        Self {
            labels: FIVE_POINT.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The 3-point scale obtained by merging the two "strong" categories.
    pub fn three_point() -> Self {
        Self {
            labels: THREE_POINT.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Ordinal position of an exact label.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.position(label).is_some()
    }

    pub fn label(&self, level: usize) -> Option<&str> {
        self.labels.get(level).map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for Scale {
    type Error = AnalysisError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        Scale::new(labels)
    }
}

impl From<Scale> for Vec<String> {
    fn from(scale: Scale) -> Self {
        scale.labels
    }
}

// =============================================================================
// Cleaned responses
// =============================================================================

/// A single response that passed validation against a scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    /// Row position in the source column (0-based).
    pub row: usize,
    /// Position of the response in its scale.
    pub level: usize,
    /// Respondent key, if one was attached.
    pub key: Option<String>,
}

/// Responses restricted to a scale, in source order.
///
/// Invalid cells are dropped, so `len() <= source_len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedSeries {
    scale: Scale,
    responses: Vec<Response>,
    source_len: usize,
}

impl CleanedSeries {
    pub(crate) fn new(scale: Scale, responses: Vec<Response>, source_len: usize) -> Self {
        Self {
            scale,
            responses,
            source_len,
        }
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Number of cells in the column this series was cleaned from.
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// Number of source cells that failed validation.
    pub fn dropped(&self) -> usize {
        self.source_len - self.responses.len()
    }

    /// Response labels in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.responses
            .iter()
            .filter_map(move |r| self.scale.label(r.level))
    }

    /// Frequency of each scale category, in scale order.
    pub fn counts(&self) -> Vec<u64> {
        let mut counts = vec![0u64; self.scale.len()];
        for response in &self.responses {
            counts[response.level] += 1;
        }
        counts
    }

    /// Attach respondent keys taken from a key column (indexed by source row).
    ///
    /// Blank or missing keys leave the response unkeyed.
    pub fn with_keys<S: AsRef<str>>(mut self, keys: &[Option<S>]) -> Self {
        for response in &mut self.responses {
            response.key = keys
                .get(response.row)
                .and_then(|k| k.as_ref())
                .map(|k| k.as_ref().trim())
                .filter(|k| !k.is_empty())
                .map(String::from);
        }
        self
    }
}

// =============================================================================
// Contingency table
// =============================================================================

/// A labelled matrix of non-negative joint counts.
///
/// Every label is always present, including rows and columns whose counts
/// are all zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContingencyTable {
    row_labels: Vec<String>,
    column_labels: Vec<String>,
    counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    /// Build a table from labels and a row-major count matrix.
    pub fn new(
        row_labels: Vec<String>,
        column_labels: Vec<String>,
        counts: Vec<Vec<u64>>,
    ) -> AnalysisResult<Self> {
        if counts.len() != row_labels.len() {
            return Err(AnalysisError::InvalidCounts(format!(
                "{} rows of counts for {} row labels",
                counts.len(),
                row_labels.len()
            )));
        }
        if let Some((i, row)) = counts
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != column_labels.len())
        {
            return Err(AnalysisError::InvalidCounts(format!(
                "row {} has {} counts, expected {}",
                i,
                row.len(),
                column_labels.len()
            )));
        }
        Ok(Self {
            row_labels,
            column_labels,
            counts,
        })
    }

    /// A zero-filled table over two scales.
    pub fn zeros(rows: &Scale, columns: &Scale) -> Self {
        Self {
            row_labels: rows.labels().to_vec(),
            column_labels: columns.labels().to_vec(),
            counts: vec![vec![0; columns.len()]; rows.len()],
        }
    }

    pub(crate) fn increment(&mut self, row: usize, column: usize) {
        self.counts[row][column] += 1;
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.row_labels.len(), self.column_labels.len())
    }

    pub fn row(&self, index: usize) -> Option<&[u64]> {
        self.counts.get(index).map(Vec::as_slice)
    }

    /// Count at a (row label, column label) cell.
    pub fn count(&self, row_label: &str, column_label: &str) -> Option<u64> {
        let r = self.row_labels.iter().position(|l| l == row_label)?;
        let c = self.column_labels.iter().position(|l| l == column_label)?;
        Some(self.counts[r][c])
    }

    pub fn row_sums(&self) -> Vec<u64> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn column_sums(&self) -> Vec<u64> {
        (0..self.column_labels.len())
            .map(|c| self.counts.iter().map(|row| row[c]).sum())
            .collect()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }
}
