use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};

use ordered_float::OrderedFloat;

use crate::model::{CandidateGroup, CandidateSet, MatchValue, ScoredPair};
use crate::similarity::similarity;

/// Default similarity floor: pairs must score strictly above it.
pub const DEFAULT_SIMILARITY_FLOOR: f64 = 0.6;

// ---------------------------------------------------------------------------
// Direct matches
// ---------------------------------------------------------------------------

/// Removes every label present in both pools and returns them as matches.
///
/// Both pools keep their input order. Runs before any indexing, whatever the
/// strategy.
pub fn resolve_direct_matches(
    sources: &mut Vec<String>,
    targets: &mut Vec<String>,
) -> BTreeMap<String, MatchValue> {
    let target_set: HashSet<&str> = targets.iter().map(String::as_str).collect();
    let direct: HashSet<String> = sources
        .iter()
        .filter(|s| target_set.contains(s.as_str()))
        .cloned()
        .collect();

    if direct.is_empty() {
        return BTreeMap::new();
    }

    sources.retain(|s| !direct.contains(s));
    targets.retain(|t| !direct.contains(t));

    direct
        .into_iter()
        .map(|label| (label.clone(), MatchValue::Single(label)))
        .collect()
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// Shape of the similarity relation a strategy consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    BySource,
    Global,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimilarityIndex {
    /// One candidate set per source label, in source order.
    BySource(Vec<CandidateSet>),
    /// Every retained pair, best score first. `sources` keeps every source
    /// label so the ones without any pair can be reported as unmatched.
    Global {
        sources: Vec<String>,
        pairs: Vec<ScoredPair>,
    },
}

impl SimilarityIndex {
    pub fn build(mode: IndexMode, sources: &[String], targets: &[String], floor: f64) -> Self {
        match mode {
            IndexMode::BySource => Self::by_source(sources, targets, floor),
            IndexMode::Global => Self::global(sources, targets, floor),
        }
    }

    pub fn by_source(sources: &[String], targets: &[String], floor: f64) -> Self {
        SimilarityIndex::BySource(
            sources
                .iter()
                .map(|s| candidates_for(s, targets, floor))
                .collect(),
        )
    }

    pub fn global(sources: &[String], targets: &[String], floor: f64) -> Self {
        let mut pairs = Vec::new();
        for source in sources {
            for target in targets {
                let score = similarity(source, target);
                if score > floor {
                    pairs.push(ScoredPair {
                        score,
                        source: source.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
        // Stable: equal scores keep source-major, target-minor order.
        pairs.sort_by(|a, b| b.score.total_cmp(&a.score));

        SimilarityIndex::Global {
            sources: sources.to_vec(),
            pairs,
        }
    }

    pub fn mode(&self) -> IndexMode {
        match self {
            SimilarityIndex::BySource(_) => IndexMode::BySource,
            SimilarityIndex::Global { .. } => IndexMode::Global,
        }
    }
}

/// Targets scoring strictly above `floor` against `source`, grouped by score.
pub fn candidates_for(source: &str, targets: &[String], floor: f64) -> CandidateSet {
    let mut by_score: BTreeMap<Reverse<OrderedFloat<f64>>, Vec<String>> = BTreeMap::new();
    for target in targets {
        let score = similarity(source, target);
        if score > floor {
            by_score
                .entry(Reverse(OrderedFloat(score)))
                .or_default()
                .push(target.clone());
        }
    }

    CandidateSet {
        source: source.to_string(),
        groups: by_score
            .into_iter()
            .map(|(Reverse(OrderedFloat(score)), targets)| CandidateGroup { score, targets })
            .collect(),
    }
}
