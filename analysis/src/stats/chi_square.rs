//! Pearson chi-square test of independence.
//!
//! No Yates continuity correction is applied. Tables with an empty row or
//! column have undefined expected counts and are rejected instead of
//! producing NaN.

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{ContingencyTable, Scale};
use crate::stats::contingency::stack_counts;
use crate::stats::pooling::PooledCounts;

/// Outcome of a chi-square independence test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
    pub observed: ContingencyTable,
    pub expected: Vec<Vec<f64>>,
}

/// Compare two pooled 3-bin frequency vectors.
///
/// Rows of the observed table are `Group A` and `Group B`; columns follow
/// the 3-point scale. Degrees of freedom are always 2.
pub fn chi_square_2x3(
    counts_a: PooledCounts,
    counts_b: PooledCounts,
) -> AnalysisResult<ChiSquareResult> {
    let observed = stack_counts(
        &["Group A", "Group B"],
        Scale::three_point().labels(),
        &[&counts_a, &counts_b],
    )?;
    chi_square_independence(&observed)
}

/// Chi-square test over any table with at least two rows and two columns.
pub fn chi_square_independence(observed: &ContingencyTable) -> AnalysisResult<ChiSquareResult> {
    let (rows, columns) = observed.shape();
    if rows < 2 || columns < 2 {
        return Err(AnalysisError::DegenerateTable {
            reason: format!("need at least 2x2, got {}x{}", rows, columns),
        });
    }

    let row_sums = observed.row_sums();
    let column_sums = observed.column_sums();
    check_marginals(observed.row_labels(), &row_sums, "row")?;
    check_marginals(observed.column_labels(), &column_sums, "column")?;

    let total = observed.total() as f64;
    let expected: Vec<Vec<f64>> = row_sums
        .iter()
        .map(|&r| {
            column_sums
                .iter()
                .map(|&c| r as f64 * c as f64 / total)
                .collect()
        })
        .collect();

    let statistic: f64 = observed
        .counts()
        .iter()
        .zip(&expected)
        .flat_map(|(obs_row, exp_row)| obs_row.iter().zip(exp_row))
        .map(|(&o, &e)| {
            let diff = o as f64 - e;
            diff * diff / e
        })
        .sum();

    let degrees_of_freedom = (rows - 1) * (columns - 1);
    let distribution = ChiSquared::new(degrees_of_freedom as f64)
        .map_err(|e| AnalysisError::Statistics(e.to_string()))?;
    let p_value = distribution.sf(statistic).clamp(0.0, 1.0);

    tracing::debug!(statistic, degrees_of_freedom, p_value, "chi-square test");

    Ok(ChiSquareResult {
        statistic,
        degrees_of_freedom,
        p_value,
        observed: observed.clone(),
        expected,
    })
}

fn check_marginals(labels: &[String], sums: &[u64], axis: &str) -> AnalysisResult<()> {
    match sums.iter().position(|&s| s == 0) {
        Some(i) => Err(AnalysisError::DegenerateTable {
            reason: format!("{} '{}' sums to zero", axis, labels[i]),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_matches_hand_computed_statistic() {
        let result = chi_square_2x3([5, 2, 10], [8, 3, 6]).unwrap();

        // Row sums 17, 17; column sums 13, 5, 16; total 34.
        let expected = [[6.5, 2.5, 8.0], [6.5, 2.5, 8.0]];
        let observed = [[5.0, 2.0, 10.0], [8.0, 3.0, 6.0]];
        let mut by_hand = 0.0;
        for i in 0..2 {
            for j in 0..3 {
                let d: f64 = observed[i][j] - expected[i][j];
                by_hand += d * d / expected[i][j];
            }
        }

        assert!(close(result.statistic, by_hand));
        assert!(close(result.statistic, 1.8923076923076922));
        assert_eq!(result.degrees_of_freedom, 2);
        for i in 0..2 {
            for j in 0..3 {
                assert!(close(result.expected[i][j], expected[i][j]));
            }
        }
        // Upper tail of chi2(2) is exp(-x/2).
        assert!((result.p_value - (-by_hand / 2.0).exp()).abs() < 1e-6);
    }

    #[test]
    fn test_observed_rows_reproduce_inputs() {
        let a = [5, 2, 10];
        let b = [8, 3, 6];
        let result = chi_square_2x3(a, b).unwrap();

        assert_eq!(result.observed.row(0), Some(&a[..]));
        assert_eq!(result.observed.row(1), Some(&b[..]));
        assert_eq!(result.observed.row_sums(), vec![17, 17]);
        assert_eq!(result.observed.column_labels(), Scale::three_point().labels());
    }

    #[test]
    fn test_identical_distributions() {
        let result = chi_square_2x3([4, 4, 4], [4, 4, 4]).unwrap();
        assert!(close(result.statistic, 0.0));
        assert!(close(result.p_value, 1.0));
    }

    #[test]
    fn test_zero_row_is_degenerate() {
        let err = chi_square_2x3([0, 0, 0], [5, 3, 2]).unwrap_err();
        assert!(matches!(err, AnalysisError::DegenerateTable { .. }));
        assert!(err.to_string().contains("Group A"));
    }

    #[test]
    fn test_zero_column_is_degenerate() {
        let err = chi_square_2x3([5, 0, 2], [1, 0, 7]).unwrap_err();
        assert!(err.to_string().contains("Neutral"));
    }

    #[test]
    fn test_single_row_table_is_degenerate() {
        let table = ContingencyTable::new(
            vec!["only".into()],
            vec!["x".into(), "y".into()],
            vec![vec![3, 4]],
        )
        .unwrap();
        assert!(chi_square_independence(&table).is_err());
    }

    #[test]
    fn test_general_table_degrees_of_freedom() {
        let table = ContingencyTable::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec!["x".into(), "y".into(), "z".into(), "w".into()],
            vec![vec![3, 4, 5, 6], vec![2, 2, 8, 1], vec![7, 1, 1, 4]],
        )
        .unwrap();
        let result = chi_square_independence(&table).unwrap();
        assert_eq!(result.degrees_of_freedom, 6);
        assert!(result.statistic > 0.0);
        assert!((0.0..=1.0).contains(&result.p_value));
    }
}
