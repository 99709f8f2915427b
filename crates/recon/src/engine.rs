use tracing::debug;

use crate::channel::{ChannelError, Confirmation, Decision, DisambiguationChannel};
use crate::config::{MatchConfig, Strategy};
use crate::error::ReconError;
use crate::index::{resolve_direct_matches, SimilarityIndex};
use crate::interactive::{match_interactive, InteractiveVariant, ReviewThresholds};
use crate::matcher::{match_global_greedy, match_per_entry_greedy};
use crate::model::{
    CandidateGroup, CandidateSet, MatchResult, MatchValue, RankedCandidate, Side, UnmatchedWarning,
};
use crate::normalize::{check_unique, normalize_labels, NormalizationMap};

/// Strategy plus thresholds for one resolution pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    pub strategy: Strategy,
    pub similarity_floor: f64,
    pub min_auto_distance: f64,
}

impl MatchOptions {
    pub fn from_config(config: &MatchConfig) -> Self {
        Self {
            strategy: config.strategy,
            similarity_floor: config.thresholds.similarity_floor,
            min_auto_distance: config.thresholds.min_auto_distance,
        }
    }

    fn review_thresholds(&self) -> ReviewThresholds {
        ReviewThresholds {
            similarity_floor: self.similarity_floor,
            min_auto_distance: self.min_auto_distance,
        }
    }
}

/// Match `left` labels to `right` labels per config.
///
/// Uniqueness and normalization problems abort before any matching. Keys,
/// values, unmatched labels and warnings in the result are original labels,
/// and so is everything the channel is shown.
pub fn run(
    config: &MatchConfig,
    left: &[String],
    right: &[String],
    channel: &mut dyn DisambiguationChannel,
) -> Result<MatchResult, ReconError> {
    config.validate()?;
    check_unique(Side::Left, left)?;
    check_unique(Side::Right, right)?;

    let (left_map, right_map) = match config.normalization {
        Some(ref policy) => (
            normalize_labels(Side::Left, left, policy)?,
            normalize_labels(Side::Right, right, policy)?,
        ),
        None => (
            NormalizationMap::identity(left),
            NormalizationMap::identity(right),
        ),
    };

    let mut sources = left_map.normalized().to_vec();
    let mut targets = right_map.normalized().to_vec();
    let direct = resolve_direct_matches(&mut sources, &mut targets);
    debug!(
        direct = direct.len(),
        sources = sources.len(),
        targets = targets.len(),
        "direct matches extracted"
    );

    let options = MatchOptions::from_config(config);
    let index = SimilarityIndex::build(
        options.strategy.index_mode(),
        &sources,
        &targets,
        options.similarity_floor,
    );

    let mut reviewer = OriginalLabels {
        inner: channel,
        left: &left_map,
        right: &right_map,
    };
    let mut result = resolve_matches(&index, &options, &mut reviewer)?;
    result.matches.extend(direct);

    Ok(to_originals(result, &left_map, &right_map))
}

/// Run one strategy over an already built index.
///
/// The index has to have the shape the strategy consumes
/// ([`Strategy::index_mode`]).
pub fn resolve_matches(
    index: &SimilarityIndex,
    options: &MatchOptions,
    channel: &mut dyn DisambiguationChannel,
) -> Result<MatchResult, ReconError> {
    let result = match (options.strategy, index) {
        (Strategy::PerEntryGreedy, SimilarityIndex::BySource(sets)) => match_per_entry_greedy(sets),
        (Strategy::GlobalGreedy, SimilarityIndex::Global { sources, pairs }) => {
            match_global_greedy(sources, pairs)
        }
        (Strategy::Interactive, SimilarityIndex::BySource(sets)) => match_interactive(
            sets,
            InteractiveVariant::Plain,
            options.review_thresholds(),
            channel,
        )?,
        (Strategy::InteractiveManualSelection, SimilarityIndex::BySource(sets)) => {
            match_interactive(
                sets,
                InteractiveVariant::ManualSelection,
                options.review_thresholds(),
                channel,
            )?
        }
        (strategy, index) => {
            return Err(ReconError::UnsupportedMode(format!(
                "{strategy} cannot run on a {:?} similarity index",
                index.mode()
            )))
        }
    };

    debug!(
        strategy = %options.strategy,
        matched = result.matches.len(),
        unmatched = result.unmatched.len(),
        "resolution finished"
    );
    Ok(result)
}

// ---------------------------------------------------------------------------
// Translation back to original labels
// ---------------------------------------------------------------------------

fn to_originals(
    result: MatchResult,
    left: &NormalizationMap,
    right: &NormalizationMap,
) -> MatchResult {
    MatchResult {
        matches: result
            .matches
            .iter()
            .map(|(source, value)| (left.original(source).to_string(), right.translate(value)))
            .collect(),
        unmatched: result
            .unmatched
            .iter()
            .map(|source| left.original(source).to_string())
            .collect(),
        warnings: result
            .warnings
            .into_iter()
            .map(|w| UnmatchedWarning {
                source: left.original(&w.source).to_string(),
                ..w
            })
            .collect(),
    }
}

/// Forwards to the caller's channel with labels mapped back to their
/// original spelling. Rankings keep their order, so `Decision::Index`
/// answers stay valid.
struct OriginalLabels<'a> {
    inner: &'a mut dyn DisambiguationChannel,
    left: &'a NormalizationMap,
    right: &'a NormalizationMap,
}

impl DisambiguationChannel for OriginalLabels<'_> {
    fn present(&mut self, source: &str, candidates: &CandidateSet) -> Result<Decision, ChannelError> {
        let shown = CandidateSet {
            source: self.left.original(source).to_string(),
            groups: candidates
                .groups
                .iter()
                .map(|g| CandidateGroup {
                    score: g.score,
                    targets: g
                        .targets
                        .iter()
                        .map(|t| self.right.original(t).to_string())
                        .collect(),
                })
                .collect(),
        };
        self.inner.present(&shown.source, &shown)
    }

    fn confirm(
        &mut self,
        source: &str,
        rank: usize,
        candidate: &RankedCandidate,
    ) -> Result<Confirmation, ChannelError> {
        let shown = RankedCandidate {
            score: candidate.score,
            target: self.right.original(&candidate.target).to_string(),
        };
        self.inner.confirm(self.left.original(source), rank, &shown)
    }

    fn auto_matched(&mut self, source: &str, value: &MatchValue) {
        self.inner
            .auto_matched(self.left.original(source), &self.right.translate(value));
    }
}
