//! Questionnaire layout: which column holds which item, and who is in which
//! respondent group.
//!
//! The pre/post instrument uses a fixed column order:
//!
//! ```text
//!  0..=6   respondent metadata
//!  7..=12  trust dimensions          (both sheets)
//! 13..=16  collaboration items       (post sheet only)
//! 17..=18  focus items               (post sheet only)
//! ```

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::error::AnalysisResult;
use crate::parser::{Cell, SurveyTable};

/// Column of the overall trust item.
pub const TRUST_COLUMN: usize = 7;

/// A named questionnaire column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub column: usize,
    pub label: String,
}

impl Item {
    pub fn new(column: usize, label: impl Into<String>) -> Self {
        Self {
            column,
            label: label.into(),
        }
    }
}

/// Items pooled together as repeated measures of one construct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionGroup {
    pub name: String,
    pub columns: Vec<usize>,
}

/// A contiguous block of respondents (0-based, end exclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespondentGroup {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

impl RespondentGroup {
    pub fn new(name: impl Into<String>, rows: Range<usize>) -> Self {
        Self {
            name: name.into(),
            start: rows.start,
            end: rows.end,
        }
    }

    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }

    /// File-name friendly form of the group name.
    pub fn slug(&self) -> String {
        self.name
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase()
    }
}

/// Part of the combined Likert chart an item belongs to. Each section is
/// drawn as its own figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Trust,
    Collaboration,
    Focus,
}

impl Section {
    pub fn name(self) -> &'static str {
        match self {
            Section::Trust => "trust",
            Section::Collaboration => "collaboration",
            Section::Focus => "focus",
        }
    }

    /// Figure number in the published layout.
    pub fn figure(self) -> usize {
        match self {
            Section::Trust => 1,
            Section::Collaboration => 2,
            Section::Focus => 3,
        }
    }
}

/// One bar of the combined Likert chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureItem {
    pub section: Section,
    pub label: String,
    pub cells: Vec<Cell>,
}

/// Column layout of the questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Instrument {
    /// Asked before and after; compared as transitions.
    pub trust_dimensions: Vec<Item>,
    /// Asked after only.
    pub collaboration: Vec<Item>,
    /// Asked after only.
    pub focus: Vec<Item>,
}

impl Default for Instrument {
    fn default() -> Self {
        Self {
            trust_dimensions: vec![
                Item::new(7, "Trust in AI"),
                Item::new(8, "Ease of Use"),
                Item::new(9, "Dependability"),
                Item::new(10, "Predictability"),
                Item::new(11, "Goal Alignment"),
                Item::new(12, "Transparency"),
            ],
            collaboration: vec![
                Item::new(13, "Observation → improved confidence"),
                Item::new(14, "Observation → improved understandability"),
                Item::new(15, "Guidance was useful for performance"),
                Item::new(16, "I prefer the agent to work without guidance"),
            ],
            focus: vec![
                Item::new(17, "Increased Focus"),
                Item::new(18, "Decreased Confidence"),
            ],
        }
    }
}

impl Instrument {
    /// Question groups compared between respondent groups.
    pub fn question_groups(&self) -> Vec<QuestionGroup> {
        let group = |name: &str, items: &[Item]| QuestionGroup {
            name: name.to_string(),
            columns: items.iter().map(|i| i.column).collect(),
        };
        vec![
            group("Trust", &self.trust_dimensions),
            group("Collaboration", &self.collaboration),
            group("Focus", &self.focus),
        ]
    }

    /// Items in figure order: trust dimensions interleaved before/after and
    /// lettered (a), (b), ..., then collaboration items, then focus items.
    pub fn figure_items(
        &self,
        before: &SurveyTable,
        after: &SurveyTable,
    ) -> AnalysisResult<Vec<FigureItem>> {
        let mut items = Vec::new();
        for (i, item) in self.trust_dimensions.iter().enumerate() {
            let letter = (b'a' + (i % 26) as u8) as char;
            items.push(FigureItem {
                section: Section::Trust,
                label: format!("({}) {} (Before)", letter, item.label),
                cells: before.column(item.column)?,
            });
            items.push(FigureItem {
                section: Section::Trust,
                label: format!("({}) {} (After)", letter, item.label),
                cells: after.column(item.column)?,
            });
        }
        let sections = [
            (Section::Collaboration, &self.collaboration),
            (Section::Focus, &self.focus),
        ];
        for (section, group) in sections {
            for item in group {
                items.push(FigureItem {
                    section,
                    label: item.label.clone(),
                    cells: after.column(item.column)?,
                });
            }
        }
        Ok(items)
    }
}

/// The two default respondent groups: rows 0..15 and 15..30.
pub fn default_groups() -> Vec<RespondentGroup> {
    vec![
        RespondentGroup::new("Group 1", 0..15),
        RespondentGroup::new("Group 2", 15..30),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    fn sheet(width: usize, value: &str) -> SurveyTable {
        SurveyTable::from_rows(
            (0..width).map(|i| format!("q{}", i)).collect(),
            vec![vec![Some(value.to_string()); width]],
        )
    }

    #[test]
    fn test_default_layout() {
        let instrument = Instrument::default();
        assert_eq!(instrument.trust_dimensions[0].column, TRUST_COLUMN);
        assert_eq!(instrument.trust_dimensions.last().unwrap().column, 12);

        let groups = instrument.question_groups();
        assert_eq!(groups[1].columns, vec![13, 14, 15, 16]);
        assert_eq!(groups[2].columns, vec![17, 18]);
    }

    #[test]
    fn test_figure_items_order() {
        let items = Instrument::default()
            .figure_items(&sheet(13, "Agree"), &sheet(19, "Neutral"))
            .unwrap();

        assert_eq!(items.len(), 18);
        assert_eq!(items[0].label, "(a) Trust in AI (Before)");
        assert_eq!(items[1].label, "(a) Trust in AI (After)");
        assert_eq!(items[11].label, "(f) Transparency (After)");
        assert_eq!(items[17].label, "Decreased Confidence");
        assert_eq!(items[0].cells[0].as_deref(), Some("Agree"));
        assert_eq!(items[1].cells[0].as_deref(), Some("Neutral"));
    }

    #[test]
    fn test_figure_items_split_into_sections() {
        let items = Instrument::default()
            .figure_items(&sheet(13, "Agree"), &sheet(19, "Neutral"))
            .unwrap();

        let count = |section| items.iter().filter(|i| i.section == section).count();
        assert_eq!(count(Section::Trust), 12);
        assert_eq!(count(Section::Collaboration), 4);
        assert_eq!(count(Section::Focus), 2);
        assert_eq!(items[12].section, Section::Collaboration);
        assert_eq!(items[16].section.figure(), 3);
    }

    #[test]
    fn test_figure_items_missing_column() {
        let err = Instrument::default()
            .figure_items(&sheet(13, "Agree"), &sheet(15, "Agree"))
            .unwrap_err();
        assert_eq!(err, AnalysisError::MissingColumn { index: 15, width: 15 });
    }

    #[test]
    fn test_group_slug() {
        let groups = default_groups();
        assert_eq!(groups[0].slug(), "group1");
        assert_eq!(groups[1].rows(), 15..30);
    }
}
