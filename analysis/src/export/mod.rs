//! Write analysis artefacts to disk.
//!
//! | Artefact            | Format | Layout                                  |
//! |---------------------|--------|-----------------------------------------|
//! | Transition table    | CSV    | corner + column labels, one row per row |
//! | Chi-square results  | CSV    | one flat record per question group      |
//! | Likert distribution | CSV    | one row per item, tagged with section   |
//! | Sankey diagram      | JSON   | nodes + links                           |
//!
//! Parent directories are created as needed.

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::ExportResult;
use crate::models::ContingencyTable;
use crate::render::SankeyDiagram;
use crate::stats::{ChiSquareResult, LikertSummary};

fn ensure_parent(path: &Path) -> ExportResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write a labelled count matrix. `corner` fills the top-left header cell.
pub fn write_contingency_csv(
    table: &ContingencyTable,
    corner: &str,
    path: &Path,
) -> ExportResult<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec![corner.to_string()];
    header.extend(table.column_labels().iter().cloned());
    writer.write_record(&header)?;

    for (label, row) in table.row_labels().iter().zip(table.counts()) {
        let mut record = vec![label.clone()];
        record.extend(row.iter().map(u64::to_string));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    tracing::debug!(path = %path.display(), "wrote contingency table");
    Ok(())
}

/// One exported chi-square row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquareRecord {
    pub question_group: String,
    pub group_a: String,
    pub group_b: String,
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
    pub a_disagree: u64,
    pub a_neutral: u64,
    pub a_agree: u64,
    pub b_disagree: u64,
    pub b_neutral: u64,
    pub b_agree: u64,
}

impl ChiSquareRecord {
    pub fn new(
        question_group: &str,
        group_a: &str,
        group_b: &str,
        result: &ChiSquareResult,
    ) -> Self {
        let cell = |r: usize, c: usize| {
            result
                .observed
                .row(r)
                .and_then(|row| row.get(c))
                .copied()
                .unwrap_or(0)
        };
        Self {
            question_group: question_group.to_string(),
            group_a: group_a.to_string(),
            group_b: group_b.to_string(),
            statistic: result.statistic,
            degrees_of_freedom: result.degrees_of_freedom,
            p_value: result.p_value,
            a_disagree: cell(0, 0),
            a_neutral: cell(0, 1),
            a_agree: cell(0, 2),
            b_disagree: cell(1, 0),
            b_neutral: cell(1, 1),
            b_agree: cell(1, 2),
        }
    }
}

pub fn write_chi_square_csv(records: &[ChiSquareRecord], path: &Path) -> ExportResult<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// One row per item: figure section, label, n, then count, percent and bar
/// label for each category. Bar labels are blank for thin segments.
pub fn write_likert_csv(summary: &LikertSummary, path: &Path) -> ExportResult<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;

    let labels = summary.scale.labels();
    let mut header = vec![
        "section".to_string(),
        "figure".to_string(),
        "item".to_string(),
        "n".to_string(),
    ];
    header.extend(labels.iter().map(|l| format!("{} (n)", l)));
    header.extend(labels.iter().map(|l| format!("{} (%)", l)));
    header.extend(labels.iter().map(|l| format!("{} (label)", l)));
    writer.write_record(&header)?;

    for item in &summary.items {
        let mut record = vec![
            item.section.map(|s| s.name().to_string()).unwrap_or_default(),
            item.section.map(|s| s.figure().to_string()).unwrap_or_default(),
            item.item.clone(),
            item.n.to_string(),
        ];
        record.extend(item.counts.iter().map(u64::to_string));
        record.extend(item.percentages.iter().map(|p| format!("{:.1}", p)));
        record.extend((0..labels.len()).map(|c| item.display_label(c).unwrap_or_default()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_sankey_json(diagram: &SankeyDiagram, path: &Path) -> ExportResult<()> {
    write_json(diagram, path)
}

/// Pretty-printed JSON for any serializable artefact.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> ExportResult<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
