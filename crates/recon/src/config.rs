use serde::Deserialize;

use crate::error::ReconError;
use crate::index::{IndexMode, DEFAULT_SIMILARITY_FLOOR};
use crate::normalize::Normalization;

/// Default minimum score distance for taking a match without asking.
pub const DEFAULT_MIN_AUTO_DISTANCE: f64 = 0.1;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MatchConfig {
    pub name: String,
    #[serde(default)]
    pub strategy: Strategy,
    /// Only one-to-one matching is implemented; `false` is rejected.
    #[serde(default = "default_true")]
    pub single_match_only: bool,
    /// Absent: labels are compared as given.
    #[serde(default)]
    pub normalization: Option<Normalization>,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_true() -> bool {
    true
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            name: "labelmatch".into(),
            strategy: Strategy::default(),
            single_match_only: true,
            normalization: None,
            thresholds: ThresholdConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    PerEntryGreedy,
    GlobalGreedy,
    Interactive,
    InteractiveManualSelection,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::PerEntryGreedy,
        Strategy::GlobalGreedy,
        Strategy::Interactive,
        Strategy::InteractiveManualSelection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerEntryGreedy => "per_entry_greedy",
            Self::GlobalGreedy => "global_greedy",
            Self::Interactive => "interactive",
            Self::InteractiveManualSelection => "interactive_manual_selection",
        }
    }

    /// Shape of the similarity relation this strategy consumes.
    pub fn index_mode(&self) -> IndexMode {
        match self {
            Self::GlobalGreedy => IndexMode::Global,
            _ => IndexMode::BySource,
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Interactive | Self::InteractiveManualSelection)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|st| st.as_str()).collect();
                format!("unknown strategy '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

// ---------------------------------------------------------------------------
// Thresholds + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ThresholdConfig {
    /// Pairs must score strictly above this to be considered at all.
    #[serde(default = "default_floor")]
    pub similarity_floor: f64,
    /// Score distance that lets the interactive strategies skip the question.
    #[serde(default = "default_min_auto_distance")]
    pub min_auto_distance: f64,
}

fn default_floor() -> f64 {
    DEFAULT_SIMILARITY_FLOOR
}

fn default_min_auto_distance() -> f64 {
    DEFAULT_MIN_AUTO_DISTANCE
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            similarity_floor: DEFAULT_SIMILARITY_FLOOR,
            min_auto_distance: DEFAULT_MIN_AUTO_DISTANCE,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Print matches taken without asking during interactive runs.
    #[serde(default)]
    pub report_auto_matches: bool,
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MatchConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: MatchConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if !self.single_match_only {
            return Err(ReconError::UnsupportedMode(
                "single_match_only = false (one source matched to several targets)".into(),
            ));
        }

        check_unit_range("thresholds.similarity_floor", self.thresholds.similarity_floor)?;
        check_unit_range("thresholds.min_auto_distance", self.thresholds.min_auto_distance)?;

        if let Some(ref normalization) = self.normalization {
            normalization.validate()?;
        }

        Ok(())
    }
}

fn check_unit_range(field: &str, value: f64) -> Result<(), ReconError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ReconError::ConfigValidation(format!(
            "{field} must be between 0 and 1, got {value}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
