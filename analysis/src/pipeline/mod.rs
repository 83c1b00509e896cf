//! High-level pipeline API: load both sheets, analyze, export.
//!
//! ```text
//! before.csv ─┐                         ┌─▶ <name>_transition.csv
//!             ├─▶ bin ─▶ align ─▶ table ├─▶ <name>.json (Sankey)
//! after.csv  ─┘                         └─▶ per respondent group
//!
//! after.csv ─▶ pool per question group ─▶ chi-square ─▶ chi_square_groups.csv
//! both      ─▶ per-item distributions  ─────────────▶ likert_summary.csv
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use survey_shift::{config::AnalysisConfig, pipeline::run};
//!
//! let config = AnalysisConfig::load("survey.toml".as_ref())?;
//! let summary = run(&config)?;
//! println!("Wrote {} files", summary.files.len());
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::binning::Binning;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult, PipelineResult};
use crate::export::{
    write_chi_square_csv, write_contingency_csv, write_json, write_likert_csv, write_sankey_json,
    ChiSquareRecord,
};
use crate::models::{CleanedSeries, ContingencyTable};
use crate::parser::{load_table, SurveyTable};
use crate::render::{NodeLayout, SankeyDiagram, SankeyOptions};
use crate::stats::{
    chi_square_2x3, pooled_counts, transition_table, Alignment, ChiSquareResult, LikertSummary,
};
use crate::survey::{Instrument, QuestionGroup, RespondentGroup};

/// Options for one before/after comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOptions {
    pub binning: Binning,
    pub alignment: Alignment,
    pub before_column: usize,
    pub after_column: usize,
    /// Respondent key column, used by [`Alignment::Key`].
    pub key_column: Option<usize>,
    pub layout: NodeLayout,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            binning: Binning::FivePoint,
            alignment: Alignment::default(),
            before_column: crate::survey::TRUST_COLUMN,
            after_column: crate::survey::TRUST_COLUMN,
            key_column: None,
            layout: NodeLayout::Auto,
        }
    }
}

/// Transition table plus the diagram drawn from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionReport {
    pub table: ContingencyTable,
    pub diagram: SankeyDiagram,
    /// Valid responses on each side after binning.
    pub before_valid: usize,
    pub after_valid: usize,
    /// Cells discarded by the binner on each side.
    pub before_dropped: usize,
    pub after_dropped: usize,
    /// Pairs counted in the table.
    pub pairs: u64,
}

/// Chi-square comparison of two respondent groups on one question group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupComparison {
    pub question_group: String,
    pub group_a: String,
    pub group_b: String,
    pub result: ChiSquareResult,
}

impl GroupComparison {
    pub fn record(&self) -> ChiSquareRecord {
        ChiSquareRecord::new(&self.question_group, &self.group_a, &self.group_b, &self.result)
    }
}

/// Files written by [`run`].
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: String,
    pub before_rows: usize,
    pub after_rows: usize,
    pub files: Vec<PathBuf>,
    pub comparisons: Vec<ChiSquareRecord>,
}

fn bin_column(
    table: &SurveyTable,
    column: usize,
    binning: Binning,
    key_column: Option<usize>,
) -> AnalysisResult<CleanedSeries> {
    let series = binning.apply(table.column(column)?);
    match key_column {
        Some(key) => Ok(series.with_keys(&table.column(key)?)),
        None => Ok(series),
    }
}

/// Bin one column of each sheet, pair the responses and build the diagram.
pub fn run_transitions(
    before: &SurveyTable,
    after: &SurveyTable,
    options: &TransitionOptions,
) -> AnalysisResult<TransitionReport> {
    let key_column = match options.alignment {
        Alignment::Key => Some(
            options
                .key_column
                .ok_or(AnalysisError::MissingJoinKey { side: "before" })?,
        ),
        _ => None,
    };

    let before_series = bin_column(before, options.before_column, options.binning, key_column)?;
    let after_series = bin_column(after, options.after_column, options.binning, key_column)?;

    let table = transition_table(&before_series, &after_series, options.alignment)?;
    let diagram = SankeyDiagram::from_table(
        &table,
        &SankeyOptions::for_binning(options.binning, options.layout.clone()),
    )?;

    tracing::info!(
        binning = ?options.binning,
        alignment = ?options.alignment,
        before_valid = before_series.len(),
        after_valid = after_series.len(),
        pairs = table.total(),
        "transition table ready"
    );

    Ok(TransitionReport {
        pairs: table.total(),
        before_valid: before_series.len(),
        after_valid: after_series.len(),
        before_dropped: before_series.dropped(),
        after_dropped: after_series.dropped(),
        table,
        diagram,
    })
}

/// Compare two respondent groups on every question group.
pub fn run_group_comparison(
    table: &SurveyTable,
    question_groups: &[QuestionGroup],
    group_a: &RespondentGroup,
    group_b: &RespondentGroup,
) -> AnalysisResult<Vec<GroupComparison>> {
    question_groups
        .iter()
        .map(|question| {
            let counts_a = pooled_counts(table, &question.columns, group_a.rows())?;
            let counts_b = pooled_counts(table, &question.columns, group_b.rows())?;
            let result = chi_square_2x3(counts_a, counts_b)?;

            tracing::info!(
                question_group = %question.name,
                statistic = result.statistic,
                p_value = result.p_value,
                "group comparison"
            );

            Ok(GroupComparison {
                question_group: question.name.clone(),
                group_a: group_a.name.clone(),
                group_b: group_b.name.clone(),
                result,
            })
        })
        .collect()
}

/// Per-item distributions in figure order.
pub fn likert_summary(
    instrument: &Instrument,
    before: &SurveyTable,
    after: &SurveyTable,
) -> AnalysisResult<LikertSummary> {
    let items = instrument.figure_items(before, after)?;
    Ok(LikertSummary::from_figure_items(&items, &Binning::FivePoint.scale()))
}

/// Run the full analysis described by `config` and write every artefact.
pub fn run(config: &AnalysisConfig) -> PipelineResult<RunSummary> {
    let before = load_table(&config.before)?;
    let after = load_table(&config.after)?;
    tracing::info!(
        before = %config.before.display(),
        after = %config.after.display(),
        before_rows = before.table.height(),
        after_rows = after.table.height(),
        "loaded survey sheets"
    );

    let out = &config.output_dir;
    let mut files = Vec::new();

    // Full sample, then each respondent group in its own directory.
    let mut samples: Vec<(Option<&RespondentGroup>, SurveyTable, SurveyTable)> =
        vec![(None, before.table.clone(), after.table.clone())];
    for group in &config.groups {
        samples.push((
            Some(group),
            before.table.slice_rows(group.rows()),
            after.table.slice_rows(group.rows()),
        ));
    }

    for (group, before_sample, after_sample) in &samples {
        let (dir, suffix) = match group {
            Some(g) => (out.join(g.slug()), format!("_{}", g.slug())),
            None => (out.clone(), String::new()),
        };

        for sankey in &config.sankeys {
            let options = TransitionOptions {
                binning: sankey.binning,
                alignment: config.alignment,
                before_column: config.before_column,
                after_column: config.after_column,
                key_column: config.key_column,
                layout: sankey.layout.clone(),
            };
            let report = run_transitions(before_sample, after_sample, &options)?;

            let base = format!("{}{}", sankey.name, suffix);
            let csv_path = dir.join(format!("{}_transition.csv", base));
            write_contingency_csv(&report.table, "before", &csv_path)?;
            let json_path = dir.join(format!("{}.json", base));
            write_sankey_json(&report.diagram, &json_path)?;
            files.push(csv_path);
            files.push(json_path);
        }

        let summary = likert_summary(&config.instrument, before_sample, after_sample)?;
        let likert_path = dir.join(format!("likert_summary{}.csv", suffix));
        write_likert_csv(&summary, &likert_path)?;
        files.push(likert_path);
    }

    let mut comparisons = Vec::new();
    if let [group_a, group_b, ..] = config.groups.as_slice() {
        let results = run_group_comparison(
            &after.table,
            &config.instrument.question_groups(),
            group_a,
            group_b,
        )?;
        comparisons = results.iter().map(GroupComparison::record).collect();
        let path = out.join("chi_square_groups.csv");
        write_chi_square_csv(&comparisons, &path)?;
        files.push(path);
    } else {
        tracing::warn!(
            groups = config.groups.len(),
            "fewer than two respondent groups; skipping chi-square"
        );
    }

    let summary = RunSummary {
        generated_at: chrono::Utc::now().to_rfc3339(),
        before_rows: before.table.height(),
        after_rows: after.table.height(),
        files,
        comparisons,
    };
    write_json(&summary, &manifest_path(out))?;

    tracing::info!(files = summary.files.len(), output = %out.display(), "analysis complete");
    Ok(summary)
}

fn manifest_path(out: &Path) -> PathBuf {
    out.join("run_manifest.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;
    use crate::survey::Section;

    const HEADER: &str = "id,c1,c2,c3,c4,c5,c6,trust,ease,dep,pred,goal,transp,o1,o2,o3,o4,f1,f2";

    fn sheet(rows: &[&str]) -> SurveyTable {
        let mut content = String::from(HEADER);
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        parse_str(&content, ',').unwrap()
    }

    fn row(id: &str, trust: &str, rest: &str) -> String {
        let mut cells = vec![id.to_string()];
        cells.extend(std::iter::repeat(String::new()).take(6));
        cells.push(trust.to_string());
        cells.extend(std::iter::repeat(rest.to_string()).take(11));
        cells.join(",")
    }

    #[test]
    fn test_run_transitions_three_point() {
        let before = sheet(&[
            &row("p1", "Strongly disagree", "Agree"),
            &row("p2", "Agree", "Agree"),
            &row("p3", "typo", "Agree"),
        ]);
        let after = sheet(&[
            &row("p1", "Neutral", "Agree"),
            &row("p2", "Strongly agree", "Agree"),
            &row("p3", "Agree", "Agree"),
        ]);

        let options = TransitionOptions {
            binning: Binning::ThreePoint,
            ..TransitionOptions::default()
        };
        let report = run_transitions(&before, &after, &options).unwrap();

        assert_eq!(report.pairs, 2);
        assert_eq!(report.before_valid, 2);
        assert_eq!(report.after_valid, 3);
        assert_eq!(report.before_dropped, 1);
        assert_eq!(report.after_dropped, 0);
        assert_eq!(report.table.count("Disagree", "Neutral"), Some(1));
        assert_eq!(report.table.count("Agree", "Agree"), Some(1));
        assert_eq!(report.diagram.nodes.len(), 6);
    }

    #[test]
    fn test_run_transitions_keyed() {
        let before = sheet(&[&row("p1", "Agree", "Agree"), &row("p2", "Disagree", "Agree")]);
        let after = sheet(&[&row("p2", "Agree", "Agree"), &row("p1", "Agree", "Agree")]);

        let options = TransitionOptions {
            alignment: Alignment::Key,
            key_column: Some(0),
            ..TransitionOptions::default()
        };
        let report = run_transitions(&before, &after, &options).unwrap();
        assert_eq!(report.table.count("Disagree", "Agree"), Some(1));
        assert_eq!(report.table.count("Agree", "Agree"), Some(1));

        let missing_key = TransitionOptions {
            alignment: Alignment::Key,
            ..TransitionOptions::default()
        };
        assert!(run_transitions(&before, &after, &missing_key).is_err());
    }

    #[test]
    fn test_run_transitions_missing_column() {
        let narrow = parse_str("id,q\np1,Agree", ',').unwrap();
        let err = run_transitions(&narrow, &narrow, &TransitionOptions::default()).unwrap_err();
        assert_eq!(err, AnalysisError::MissingColumn { index: 7, width: 2 });
    }

    #[test]
    fn test_group_comparison() {
        let table = sheet(&[
            &row("p1", "Agree", "Agree"),
            &row("p2", "Disagree", "Neutral"),
            &row("p3", "Strongly agree", "Disagree"),
            &row("p4", "Neutral", "Strongly disagree"),
        ]);
        let groups = [RespondentGroup::new("G1", 0..2), RespondentGroup::new("G2", 2..4)];
        let questions = vec![QuestionGroup {
            name: "Trust".into(),
            columns: vec![7, 8],
        }];

        let comparisons = run_group_comparison(&table, &questions, &groups[0], &groups[1]).unwrap();

        assert_eq!(comparisons.len(), 1);
        let observed = &comparisons[0].result.observed;
        // G1: trust A, D; ease A, N  -> D1 N1 A2
        // G2: trust A, N; ease D, D  -> D2 N1 A1
        assert_eq!(observed.row(0), Some(&[1u64, 1, 2][..]));
        assert_eq!(observed.row(1), Some(&[2u64, 1, 1][..]));
        assert_eq!(comparisons[0].result.degrees_of_freedom, 2);
        assert_eq!(comparisons[0].record().group_b, "G2");
    }

    #[test]
    fn test_group_comparison_degenerate_propagates() {
        let table = sheet(&[&row("p1", "Agree", "Agree"), &row("p2", "Agree", "Agree")]);
        let groups = [RespondentGroup::new("G1", 0..1), RespondentGroup::new("G2", 1..2)];
        let questions = vec![QuestionGroup {
            name: "Trust".into(),
            columns: vec![7],
        }];

        let err = run_group_comparison(&table, &questions, &groups[0], &groups[1]).unwrap_err();
        assert!(matches!(err, AnalysisError::DegenerateTable { .. }));
    }

    #[test]
    fn test_likert_summary_figure_order() {
        let before = sheet(&[&row("p1", "Agree", "Neutral")]);
        let after = sheet(&[&row("p1", "Strongly agree", "Neutral")]);

        let summary = likert_summary(&Instrument::default(), &before, &after).unwrap();

        assert_eq!(summary.items.len(), 18);
        assert_eq!(summary.items[0].counts, vec![0, 0, 0, 1, 0]);
        assert_eq!(summary.items[1].counts, vec![0, 0, 0, 0, 1]);
        assert_eq!(summary.items[12].item, "Observation → improved confidence");

        assert_eq!(summary.section(Section::Trust).len(), 12);
        assert_eq!(summary.section(Section::Collaboration).len(), 4);
        assert_eq!(summary.section(Section::Focus).len(), 2);
    }
}
