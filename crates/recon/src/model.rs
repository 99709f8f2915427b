use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

/// Which input collection a label belongs to.
///
/// `Left` is the collection being matched ("list for matching"); its labels
/// become the keys of the result. `Right` is the collection matched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Similarity relation
// ---------------------------------------------------------------------------

/// One entry of the global similarity relation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPair {
    pub score: f64,
    pub source: String,
    pub target: String,
}

/// Targets sharing one exact score for a given source label.
///
/// Order inside the group follows the right-hand collection; it carries no
/// preference, the group is a tie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateGroup {
    pub score: f64,
    pub targets: Vec<String>,
}

/// A single target in the flattened ranking shown to a reviewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub score: f64,
    pub target: String,
}

/// All targets above the similarity floor for one source label, grouped by
/// score, groups ordered best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSet {
    pub source: String,
    pub groups: Vec<CandidateGroup>,
}

impl CandidateSet {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of candidate targets across all groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.targets.len()).sum()
    }

    pub fn top(&self) -> Option<&CandidateGroup> {
        self.groups.first()
    }

    /// Score distance between the best and second best group.
    pub fn gap(&self) -> Option<f64> {
        match self.groups.as_slice() {
            [first, second, ..] => Some(first.score - second.score),
            _ => None,
        }
    }

    /// Flattened ranking: groups in order, targets in group order.
    pub fn ranked(&self) -> Vec<RankedCandidate> {
        self.groups
            .iter()
            .flat_map(|g| {
                g.targets.iter().map(move |t| RankedCandidate {
                    score: g.score,
                    target: t.clone(),
                })
            })
            .collect()
    }

    /// Copy of this set without the given targets; groups left empty are dropped.
    pub fn without(&self, consumed: &BTreeSet<String>) -> CandidateSet {
        let groups = self
            .groups
            .iter()
            .filter_map(|g| {
                let targets: Vec<String> = g
                    .targets
                    .iter()
                    .filter(|t| !consumed.contains(*t))
                    .cloned()
                    .collect();
                (!targets.is_empty()).then_some(CandidateGroup {
                    score: g.score,
                    targets,
                })
            })
            .collect();
        CandidateSet {
            source: self.source.clone(),
            groups,
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// What a source label was matched to.
///
/// `Tied` keeps every equally plausible target instead of silently picking
/// one; consumers have to decide what an ambiguous match means for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MatchValue {
    Single(String),
    Tied(Vec<String>),
}

impl MatchValue {
    /// Builds `Single` for one target and `Tied` for several.
    pub fn from_targets(mut targets: Vec<String>) -> Self {
        if targets.len() == 1 {
            MatchValue::Single(targets.remove(0))
        } else {
            MatchValue::Tied(targets)
        }
    }

    pub fn targets(&self) -> &[String] {
        match self {
            MatchValue::Single(t) => std::slice::from_ref(t),
            MatchValue::Tied(ts) => ts,
        }
    }

    pub fn is_tied(&self) -> bool {
        matches!(self, MatchValue::Tied(_))
    }

    pub fn map<F>(&self, mut f: F) -> MatchValue
    where
        F: FnMut(&str) -> String,
    {
        match self {
            MatchValue::Single(t) => MatchValue::Single(f(t)),
            MatchValue::Tied(ts) => MatchValue::Tied(ts.iter().map(|t| f(t)).collect()),
        }
    }
}

impl std::fmt::Display for MatchValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchValue::Single(t) => f.write_str(t),
            MatchValue::Tied(ts) => write!(f, "[{}]", ts.join(", ")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// No target scored above the floor.
    NoCandidate,
    /// The reviewer answered "none", or walked every candidate without accepting.
    Declined,
    /// The reviewer stopped matching this entry.
    Abandoned,
}

/// Raised when a label stays unmatched in an interactive run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedWarning {
    pub source: String,
    pub floor: f64,
    pub reason: UnmatchedReason,
}

impl std::fmt::Display for UnmatchedWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pct = self.floor * 100.0;
        match self.reason {
            UnmatchedReason::NoCandidate => {
                write!(f, "no similarity for \"{}\" above {pct:.1}% similarity", self.source)
            }
            UnmatchedReason::Declined => write!(
                f,
                "no match chosen for \"{}\" among candidates above {pct:.1}% similarity",
                self.source
            ),
            UnmatchedReason::Abandoned => write!(
                f,
                "matching abandoned for \"{}\" (candidates above {pct:.1}% similarity)",
                self.source
            ),
        }
    }
}

/// Outcome of one matching run.
///
/// Every source label ends up in exactly one of `matches` or `unmatched`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchResult {
    pub matches: BTreeMap<String, MatchValue>,
    pub unmatched: BTreeSet<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<UnmatchedWarning>,
}

impl MatchResult {
    /// Every target label referenced by any match value.
    pub fn matched_targets(&self) -> BTreeSet<&str> {
        self.matches
            .values()
            .flat_map(|v| v.targets().iter().map(String::as_str))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub source_labels: usize,
    pub target_labels: usize,
    pub matched: usize,
    pub single: usize,
    pub tied: usize,
    pub unmatched: usize,
    pub unused_targets: Vec<String>,
}
