//! Per-item Likert distributions, the data behind stacked bar charts.

use serde::Serialize;

use crate::binning::clean_to_scale;
use crate::models::Scale;
use crate::parser::Cell;
use crate::survey::{FigureItem, Section};

/// Percentages at or below this are rendered without a label.
pub const LABEL_THRESHOLD_PERCENT: f64 = 3.0;

/// Distribution of one questionnaire item over a scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemDistribution {
    /// Figure section, when the item comes from the questionnaire layout.
    pub section: Option<Section>,
    pub item: String,
    /// Valid responses.
    pub n: u64,
    /// Counts per scale category, in scale order.
    pub counts: Vec<u64>,
    /// Percent of valid responses per category. All zero when `n == 0`.
    pub percentages: Vec<f64>,
}

impl ItemDistribution {
    /// Bar label for a category, or `None` when the segment is too thin.
    pub fn display_label(&self, category: usize) -> Option<String> {
        let pct = *self.percentages.get(category)?;
        (pct > LABEL_THRESHOLD_PERCENT).then(|| format!("{:.0}%", pct))
    }
}

/// Distributions for a list of items, all over the same scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LikertSummary {
    pub scale: Scale,
    pub items: Vec<ItemDistribution>,
}

impl LikertSummary {
    /// Summarize `(item label, raw cells)` pairs over `scale`.
    pub fn from_items<'a, I>(items: I, scale: &Scale) -> Self
    where
        I: IntoIterator<Item = (String, &'a [Cell])>,
    {
        Self {
            scale: scale.clone(),
            items: items
                .into_iter()
                .map(|(item, cells)| distribution(None, item, cells, scale))
                .collect(),
        }
    }

    /// Summarize questionnaire items, keeping their figure sections.
    pub fn from_figure_items(items: &[FigureItem], scale: &Scale) -> Self {
        Self {
            scale: scale.clone(),
            items: items
                .iter()
                .map(|i| distribution(Some(i.section), i.label.clone(), &i.cells, scale))
                .collect(),
        }
    }

    /// Items of one figure section, in order.
    pub fn section(&self, section: Section) -> Vec<&ItemDistribution> {
        self.items
            .iter()
            .filter(|i| i.section == Some(section))
            .collect()
    }

    pub fn item(&self, name: &str) -> Option<&ItemDistribution> {
        self.items.iter().find(|i| i.item == name)
    }
}

fn distribution(
    section: Option<Section>,
    item: String,
    cells: &[Cell],
    scale: &Scale,
) -> ItemDistribution {
    let series = clean_to_scale(cells.iter().map(|c| c.as_deref()), scale);
    let counts = series.counts();
    let n = series.len() as u64;
    let percentages = counts
        .iter()
        .map(|&c| if n == 0 { 0.0 } else { c as f64 * 100.0 / n as f64 })
        .collect();
    ItemDistribution {
        section,
        item,
        n,
        counts,
        percentages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn test_percentages_of_valid_responses() {
        let trust = cells(&["Agree", "Agree", "Neutral", "junk", "Strongly agree"]);
        let summary = LikertSummary::from_items(
            vec![("Trust in AI".to_string(), trust.as_slice())],
            &Scale::five_point(),
        );

        let item = summary.item("Trust in AI").unwrap();
        assert_eq!(item.n, 4);
        assert_eq!(item.counts, vec![0, 0, 1, 2, 1]);
        assert_eq!(item.percentages, vec![0.0, 0.0, 25.0, 50.0, 25.0]);
    }

    #[test]
    fn test_empty_item_has_zero_percentages() {
        let empty: Vec<Option<String>> = vec![None, Some("??".into())];
        let summary = LikertSummary::from_items(
            vec![("Focus".to_string(), empty.as_slice())],
            &Scale::three_point(),
        );
        assert_eq!(summary.items[0].n, 0);
        assert!(summary.items[0].percentages.iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_display_label_threshold() {
        let mut values = vec!["Agree"; 33];
        values.push("Neutral");
        let data = cells(&values);
        let summary = LikertSummary::from_items(
            vec![("Ease of Use".to_string(), data.as_slice())],
            &Scale::five_point(),
        );

        let item = &summary.items[0];
        assert_eq!(item.display_label(3), Some("97%".to_string()));
        // 1/34 is just under 3%.
        assert_eq!(item.display_label(2), None);
        assert_eq!(item.display_label(9), None);
    }

    #[test]
    fn test_figure_items_keep_sections() {
        let items = vec![
            FigureItem {
                section: Section::Trust,
                label: "(a) Trust in AI (Before)".into(),
                cells: cells(&["Agree", "Neutral"]),
            },
            FigureItem {
                section: Section::Focus,
                label: "Increased Focus".into(),
                cells: cells(&["Strongly agree"]),
            },
        ];

        let summary = LikertSummary::from_figure_items(&items, &Scale::five_point());

        assert_eq!(summary.items[0].section, Some(Section::Trust));
        assert_eq!(summary.section(Section::Focus).len(), 1);
        assert_eq!(summary.section(Section::Focus)[0].counts, vec![0, 0, 0, 0, 1]);
        assert!(summary.section(Section::Collaboration).is_empty());
    }
}
