//! Likert binning: map raw survey cells onto a fixed ordinal scale.
//!
//! Matching is a strict whitelist. Cells are trimmed and compared
//! case-sensitively against the scale labels; anything else (typos, blanks,
//! other casings, unexpected categories) is dropped, never corrected.
//!
//! ```text
//! 5-point                      3-point
//! ┌───────────────────┐        ┌──────────┐
//! │ Strongly disagree │──┐     │          │
//! │ Disagree          │──┴───▶ │ Disagree │
//! │ Neutral           │──────▶ │ Neutral  │
//! │ Agree             │──┬───▶ │ Agree    │
//! │ Strongly agree    │──┘     │          │
//! └───────────────────┘        └──────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::models::{CleanedSeries, Response, Scale};

/// Which scale raw responses are binned onto.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binning {
    /// Keep the 5-point scale as is.
    #[default]
    FivePoint,
    /// Merge the "strong" categories into their neighbours.
    ThreePoint,
}

impl Binning {
    /// Scale produced by this binning.
    pub fn scale(self) -> Scale {
        match self {
            Binning::FivePoint => Scale::five_point(),
            Binning::ThreePoint => Scale::three_point(),
        }
    }

    /// Bin raw cells with this policy.
    pub fn apply<I, S>(self, values: I) -> CleanedSeries
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        match self {
            Binning::FivePoint => clean_to_scale(values, &Scale::five_point()),
            Binning::ThreePoint => collapse_to_three(values),
        }
    }
}

/// Keep only cells whose trimmed text exactly matches a label of `scale`.
pub fn clean_to_scale<I, S>(values: I, scale: &Scale) -> CleanedSeries
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    bin_with(values, scale.clone(), |cell| scale.position(cell))
}

/// Collapse 5-point responses onto {Disagree, Neutral, Agree}.
///
/// Values already on the 3-point scale map to themselves, so applying this
/// to its own output is a no-op.
pub fn collapse_to_three<I, S>(values: I) -> CleanedSeries
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    bin_with(values, Scale::three_point(), three_bin_level)
}

/// 3-point level for a 5-point label.
fn three_bin_level(cell: &str) -> Option<usize> {
    match cell {
        "Strongly disagree" | "Disagree" => Some(0),
        "Neutral" => Some(1),
        "Agree" | "Strongly agree" => Some(2),
        _ => None,
    }
}

fn bin_with<I, S, F>(values: I, scale: Scale, level_of: F) -> CleanedSeries
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
    F: Fn(&str) -> Option<usize>,
{
    let mut source_len = 0;
    let mut responses = Vec::new();

    for (row, cell) in values.into_iter().enumerate() {
        source_len += 1;
        let level = cell.as_ref().and_then(|c| level_of(c.as_ref().trim()));
        if let Some(level) = level {
            responses.push(Response {
                row,
                level,
                key: None,
            });
        }
    }

    tracing::debug!(
        scale = ?scale.labels(),
        kept = responses.len(),
        dropped = source_len - responses.len(),
        "binned responses"
    );

    CleanedSeries::new(scale, responses, source_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn test_strict_match_no_fuzzy_correction() {
        let input = cells(&["Agree", " disagree", "Strongly Agree", "xyz"]);
        let series = clean_to_scale(input, &Scale::five_point());

        assert_eq!(series.labels().collect::<Vec<_>>(), vec!["Agree"]);
        assert_eq!(series.source_len(), 4);
        assert_eq!(series.dropped(), 3);
    }

    #[test]
    fn test_whitespace_is_trimmed_but_case_is_not() {
        let input = cells(&["  Disagree ", "Strongly agree\t", "NEUTRAL", "neutral"]);
        let series = clean_to_scale(input, &Scale::five_point());

        assert_eq!(
            series.labels().collect::<Vec<_>>(),
            vec!["Disagree", "Strongly agree"]
        );
    }

    #[test]
    fn test_missing_cells_are_dropped_and_rows_kept() {
        let input = vec![None, Some("Neutral"), Some(""), Some("Agree")];
        let series = clean_to_scale(input, &Scale::five_point());

        let rows: Vec<usize> = series.responses().iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![1, 3]);
    }

    #[test]
    fn test_empty_input() {
        let series = clean_to_scale(Vec::<Option<&str>>::new(), &Scale::five_point());
        assert!(series.is_empty());
        assert_eq!(series.source_len(), 0);

        assert!(collapse_to_three(Vec::<Option<&str>>::new()).is_empty());
    }

    #[test]
    fn test_output_is_subset_of_scale() {
        let scale = Scale::new(["Low", "Mid", "High"]).unwrap();
        let input = cells(&["High", "Agree", "Low", "low", "Mid ", "", "Highest"]);
        let series = clean_to_scale(input, &scale);

        assert!(series.labels().all(|l| scale.contains(l)));
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_collapse_merge_policy() {
        let input = cells(&[
            "Strongly disagree",
            "Disagree",
            "Neutral",
            "Agree",
            "Strongly agree",
            "Unsure",
        ]);
        let series = collapse_to_three(input);

        assert_eq!(
            series.labels().collect::<Vec<_>>(),
            vec!["Disagree", "Disagree", "Neutral", "Agree", "Agree"]
        );
        assert_eq!(series.counts(), vec![2, 1, 2]);
    }

    #[test]
    fn test_collapse_is_idempotent() {
        let input = cells(&["Strongly agree", "Neutral", "bogus", "Strongly disagree", "Agree"]);
        let once = collapse_to_three(input);
        let once_labels: Vec<String> = once.labels().map(String::from).collect();

        let twice = collapse_to_three(once_labels.iter().map(Some));
        assert_eq!(twice.labels().collect::<Vec<_>>(), once_labels);
    }

    #[test]
    fn test_binning_dispatch() {
        let input = cells(&["Strongly agree", "Neutral"]);
        assert_eq!(Binning::FivePoint.apply(input.clone()).counts(), vec![0, 0, 1, 0, 1]);
        assert_eq!(Binning::ThreePoint.apply(input).counts(), vec![0, 1, 1]);
        assert_eq!(Binning::ThreePoint.scale(), Scale::three_point());
    }
}
