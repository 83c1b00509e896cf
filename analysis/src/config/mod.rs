//! Analysis configuration.
//!
//! Everything the pipeline needs is passed in through [`AnalysisConfig`];
//! nothing is read from process-wide paths. Missing TOML fields fall back
//! to the defaults of the standard pre/post instrument.
//!
//! ```toml
//! before = "data/P1-1-30.csv"
//! after = "data/P2-1-30.csv"
//! output_dir = "output"
//! alignment = "source_row"
//!
//! [[groups]]
//! name = "Group 1"
//! start = 0
//! end = 15
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::binning::Binning;
use crate::error::{ConfigError, ConfigResult};
use crate::render::sankey::NodeLayout;
use crate::stats::contingency::Alignment;
use crate::survey::{default_groups, Instrument, RespondentGroup, TRUST_COLUMN};

/// One Sankey figure to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeySpec {
    /// Base name of the output files.
    pub name: String,
    pub binning: Binning,
    #[serde(default)]
    pub layout: NodeLayout,
}

/// Settings for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sheet answered before the intervention.
    pub before: PathBuf,
    /// Sheet answered after the intervention.
    pub after: PathBuf,
    /// Directory receiving every artefact.
    pub output_dir: PathBuf,
    /// How before/after rows are paired.
    pub alignment: Alignment,
    /// Respondent key column, required by keyed alignment.
    pub key_column: Option<usize>,
    /// Column compared before/after in the Sankey figures.
    pub before_column: usize,
    pub after_column: usize,
    pub sankeys: Vec<SankeySpec>,
    pub groups: Vec<RespondentGroup>,
    pub instrument: Instrument,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            before: PathBuf::from("data/P1-1-30.csv"),
            after: PathBuf::from("data/P2-1-30.csv"),
            output_dir: PathBuf::from("output"),
            alignment: Alignment::default(),
            key_column: None,
            before_column: TRUST_COLUMN,
            after_column: TRUST_COLUMN,
            sankeys: vec![
                SankeySpec {
                    name: "sankey_trust_5x5".into(),
                    binning: Binning::FivePoint,
                    layout: NodeLayout::Auto,
                },
                SankeySpec {
                    name: "sankey_trust_3x3".into(),
                    binning: Binning::ThreePoint,
                    layout: NodeLayout::Auto,
                },
                SankeySpec {
                    name: "sankey_trust_3x3_ordered".into(),
                    binning: Binning::ThreePoint,
                    layout: NodeLayout::pinned_three_point(),
                },
            ],
            groups: default_groups(),
            instrument: Instrument::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse TOML and validate.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let config: AnalysisConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file. Relative input/output paths are resolved against
    /// the file's directory.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        if let Some(base) = path.parent() {
            config.before = base.join(&config.before);
            config.after = base.join(&config.after);
            config.output_dir = base.join(&config.output_dir);
        }
        tracing::info!(path = %path.display(), "loaded analysis config");
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.alignment == Alignment::Key && self.key_column.is_none() {
            return Err(ConfigError::Invalid {
                field: "key_column".into(),
                message: "required when alignment = \"key\"".into(),
            });
        }
        if let Some(group) = self.groups.iter().find(|g| g.start >= g.end) {
            return Err(ConfigError::Invalid {
                field: "groups".into(),
                message: format!("group '{}' has an empty row range", group.name),
            });
        }
        Ok(())
    }
}
