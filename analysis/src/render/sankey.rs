//! Sankey diagram descriptions built from transition tables.
//!
//! Nodes are `Before: <label>` for every row followed by `After: <label>`
//! for every column. Each non-zero cell becomes one link. The result is
//! serialized to JSON and drawn by an external renderer.

use serde::{Deserialize, Serialize};

use crate::binning::Binning;
use crate::error::{AnalysisError, AnalysisResult};
use crate::models::ContingencyTable;

/// Horizontal position of pinned before/after nodes.
const BEFORE_X: f64 = 0.01;
const AFTER_X: f64 = 0.99;

const THREE_POINT_LINK_COLOR: &str = "rgba(128,128,128,0.45)";

/// Node colour for a Likert label.
pub fn label_color(label: &str) -> &'static str {
    match label {
        "Strongly disagree" => "#B22222",
        "Disagree" => "#F08080",
        "Agree" => "#6495ED",
        "Strongly agree" => "#00008B",
        _ => "#C0C0C0",
    }
}

/// Node placement.
///
/// In TOML: `layout = { kind = "fixed", y = [0.15, 0.5, 0.85] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeLayout {
    /// Let the renderer place nodes.
    #[default]
    Auto,
    /// Pin nodes: one vertical position per category, shared by both sides.
    Fixed { y: Vec<f64> },
}

impl NodeLayout {
    /// Disagree at the top, Agree at the bottom, evenly spread.
    pub fn pinned_three_point() -> Self {
        NodeLayout::Fixed {
            y: vec![0.15, 0.50, 0.85],
        }
    }
}

/// Options for [`SankeyDiagram::from_table`].
#[derive(Debug, Clone, PartialEq)]
pub struct SankeyOptions {
    pub layout: NodeLayout,
    pub link_color: Option<String>,
    pub width: u32,
    pub height: u32,
    pub font_size: f64,
}

impl Default for SankeyOptions {
    fn default() -> Self {
        Self {
            layout: NodeLayout::Auto,
            link_color: None,
            width: 700,
            height: 400,
            font_size: 18.5,
        }
    }
}

impl SankeyOptions {
    /// Options used for a given binning. 3-point diagrams use grey links.
    pub fn for_binning(binning: Binning, layout: NodeLayout) -> Self {
        let link_color = match binning {
            Binning::FivePoint => None,
            Binning::ThreePoint => Some(THREE_POINT_LINK_COLOR.to_string()),
        };
        Self {
            layout,
            link_color,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyNode {
    pub label: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyLink {
    pub source: usize,
    pub target: usize,
    pub value: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A renderer-ready Sankey description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyDiagram {
    /// `fixed` for automatic placement, `snap` when nodes are pinned.
    pub arrangement: &'static str,
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
    pub width: u32,
    pub height: u32,
    pub font_size: f64,
}

impl SankeyDiagram {
    /// Build a diagram from a before × after table.
    pub fn from_table(table: &ContingencyTable, options: &SankeyOptions) -> AnalysisResult<Self> {
        let (rows, columns) = table.shape();

        let positions = match &options.layout {
            NodeLayout::Auto => None,
            NodeLayout::Fixed { y } => {
                if y.len() != rows || y.len() != columns {
                    return Err(AnalysisError::InvalidLayout(format!(
                        "{} node positions for a {}x{} table",
                        y.len(),
                        rows,
                        columns
                    )));
                }
                Some(y)
            }
        };

        let side = |prefix: &str, labels: &[String], x: f64| -> Vec<SankeyNode> {
            labels
                .iter()
                .enumerate()
                .map(|(i, label)| SankeyNode {
                    label: format!("{}: {}", prefix, label),
                    color: label_color(label).to_string(),
                    x: positions.map(|_| x),
                    y: positions.map(|y| y[i]),
                })
                .collect()
        };
        let mut nodes = side("Before", table.row_labels(), BEFORE_X);
        nodes.extend(side("After", table.column_labels(), AFTER_X));

        let links = table
            .counts()
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .filter(|&(_, &v)| v > 0)
                    .map(move |(c, &v)| (r, c, v))
            })
            .map(|(r, c, value)| SankeyLink {
                source: r,
                target: rows + c,
                value,
                color: options.link_color.clone(),
            })
            .collect();

        Ok(Self {
            arrangement: if positions.is_some() { "snap" } else { "fixed" },
            nodes,
            links,
            width: options.width,
            height: options.height,
            font_size: options.font_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::{clean_to_scale, collapse_to_three};
    use crate::models::Scale;
    use crate::stats::contingency::{transition_table, Alignment};

    fn five_point_table() -> ContingencyTable {
        let before = clean_to_scale(
            [Some("Strongly disagree"), Some("Agree"), Some("Neutral"), Some("Agree")],
            &Scale::five_point(),
        );
        let after = clean_to_scale(
            [Some("Disagree"), Some("Agree"), Some("Agree"), Some("Agree")],
            &Scale::five_point(),
        );
        transition_table(&before, &after, Alignment::SourceRow).unwrap()
    }

    #[test]
    fn test_nodes_and_links() {
        let diagram =
            SankeyDiagram::from_table(&five_point_table(), &SankeyOptions::default()).unwrap();

        assert_eq!(diagram.nodes.len(), 10);
        assert_eq!(diagram.nodes[0].label, "Before: Strongly disagree");
        assert_eq!(diagram.nodes[5].label, "After: Strongly disagree");
        assert_eq!(diagram.nodes[0].color, "#B22222");
        assert_eq!(diagram.arrangement, "fixed");

        // SD→D, N→A, A→A(x2)
        assert_eq!(diagram.links.len(), 3);
        let agree = diagram
            .links
            .iter()
            .find(|l| l.source == 3 && l.target == 8)
            .unwrap();
        assert_eq!(agree.value, 2);
        assert!(diagram.links.iter().all(|l| l.value > 0 && l.target >= 5));
    }

    #[test]
    fn test_link_values_sum_to_table_total() {
        let table = five_point_table();
        let diagram = SankeyDiagram::from_table(&table, &SankeyOptions::default()).unwrap();
        assert_eq!(diagram.links.iter().map(|l| l.value).sum::<u64>(), table.total());
    }

    #[test]
    fn test_pinned_three_point_layout() {
        let before = collapse_to_three([Some("Strongly agree"), Some("Disagree")]);
        let after = collapse_to_three([Some("Neutral"), Some("Disagree")]);
        let table = transition_table(&before, &after, Alignment::SourceRow).unwrap();

        let options =
            SankeyOptions::for_binning(Binning::ThreePoint, NodeLayout::pinned_three_point());
        let diagram = SankeyDiagram::from_table(&table, &options).unwrap();

        assert_eq!(diagram.arrangement, "snap");
        assert_eq!(diagram.nodes[0].x, Some(0.01));
        assert_eq!(diagram.nodes[3].x, Some(0.99));
        assert_eq!(diagram.nodes[4].y, Some(0.50));
        assert_eq!(
            diagram.links[0].color.as_deref(),
            Some("rgba(128,128,128,0.45)")
        );
    }

    #[test]
    fn test_fixed_layout_must_match_table() {
        let options = SankeyOptions {
            layout: NodeLayout::pinned_three_point(),
            ..SankeyOptions::default()
        };
        let err = SankeyDiagram::from_table(&five_point_table(), &options).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidLayout(_)));
    }

    #[test]
    fn test_json_shape() {
        let diagram =
            SankeyDiagram::from_table(&five_point_table(), &SankeyOptions::default()).unwrap();
        let json = serde_json::to_value(&diagram).unwrap();

        assert_eq!(json["nodes"][7]["label"], "After: Neutral");
        assert!(json["nodes"][0].get("x").is_none());
        assert!(json["links"][0].get("color").is_none());
    }
}
