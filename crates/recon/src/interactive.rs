use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::channel::{Confirmation, Decision, DisambiguationChannel};
use crate::error::ReconError;
use crate::model::{
    CandidateSet, MatchResult, MatchValue, RankedCandidate, UnmatchedReason, UnmatchedWarning,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractiveVariant {
    /// Targets stay available to every source label.
    Plain,
    /// Chosen targets are consumed; later source labels never see them.
    ManualSelection,
}

/// Thresholds for the interactive strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewThresholds {
    pub similarity_floor: f64,
    pub min_auto_distance: f64,
}

enum Outcome {
    Matched(MatchValue),
    Unmatched(UnmatchedReason),
}

/// Match each source label in order, asking `channel` whenever the top
/// candidates are too close to call.
pub fn match_interactive(
    sets: &[CandidateSet],
    variant: InteractiveVariant,
    thresholds: ReviewThresholds,
    channel: &mut dyn DisambiguationChannel,
) -> Result<MatchResult, ReconError> {
    let mut consumed: BTreeSet<String> = BTreeSet::new();
    let mut result = MatchResult::default();

    for set in sets {
        let set = match variant {
            InteractiveVariant::Plain => set.clone(),
            InteractiveVariant::ManualSelection => set.without(&consumed),
        };

        let outcome = resolve_one(&set, variant, thresholds, channel)?;

        match outcome {
            Outcome::Matched(value) => {
                if variant == InteractiveVariant::ManualSelection {
                    consumed.extend(value.targets().iter().cloned());
                }
                result.matches.insert(set.source.clone(), value);
            }
            Outcome::Unmatched(reason) => {
                let warning = UnmatchedWarning {
                    source: set.source.clone(),
                    floor: thresholds.similarity_floor,
                    reason,
                };
                warn!(source = %set.source, reason = ?reason, "{warning}");
                result.unmatched.insert(set.source.clone());
                result.warnings.push(warning);
            }
        }
    }

    Ok(result)
}

fn resolve_one(
    set: &CandidateSet,
    variant: InteractiveVariant,
    thresholds: ReviewThresholds,
    channel: &mut dyn DisambiguationChannel,
) -> Result<Outcome, ReconError> {
    let Some(top) = set.top() else {
        return Ok(Outcome::Unmatched(UnmatchedReason::NoCandidate));
    };
    let top_value = MatchValue::from_targets(top.targets.clone());

    if auto_accepts(set, variant, thresholds.min_auto_distance) {
        debug!(source = %set.source, value = %top_value, score = top.score, "auto match");
        channel.auto_matched(&set.source, &top_value);
        return Ok(Outcome::Matched(top_value));
    }

    let ranked = set.ranked();
    let outcome = match channel.present(&set.source, set)? {
        Decision::Default => match variant {
            InteractiveVariant::Plain => Outcome::Matched(top_value),
            // Only the first ranked target is taken; the rest stay available.
            InteractiveVariant::ManualSelection => {
                Outcome::Matched(MatchValue::Single(ranked[0].target.clone()))
            }
        },
        Decision::Index(n) if n < ranked.len() => {
            Outcome::Matched(MatchValue::Single(ranked[n].target.clone()))
        }
        Decision::Index(_) | Decision::Unrecognized(_) => walk(&set.source, &ranked, channel)?,
        Decision::Skip => Outcome::Unmatched(UnmatchedReason::Declined),
        Decision::Abandon => Outcome::Unmatched(UnmatchedReason::Abandoned),
    };
    Ok(outcome)
}

/// Whether the top group is clear enough to take without asking.
fn auto_accepts(set: &CandidateSet, variant: InteractiveVariant, min_distance: f64) -> bool {
    let Some(top) = set.top() else {
        return false;
    };
    match variant {
        InteractiveVariant::Plain => match set.gap() {
            Some(gap) => gap > min_distance,
            None => top.score > 1.0 - min_distance,
        },
        // A sole candidate is measured against a perfect score.
        InteractiveVariant::ManualSelection => {
            top.targets.len() == 1 && set.gap().unwrap_or(1.0 - top.score) > min_distance
        }
    }
}

/// Offers the candidates ranked after the top one, one at a time.
fn walk(
    source: &str,
    ranked: &[RankedCandidate],
    channel: &mut dyn DisambiguationChannel,
) -> Result<Outcome, ReconError> {
    for (rank, candidate) in ranked.iter().enumerate().skip(1) {
        match channel.confirm(source, rank, candidate)? {
            Confirmation::Accept => {
                return Ok(Outcome::Matched(MatchValue::Single(candidate.target.clone())))
            }
            Confirmation::Reject => continue,
            Confirmation::Abandon => return Ok(Outcome::Unmatched(UnmatchedReason::Abandoned)),
        }
    }
    Ok(Outcome::Unmatched(UnmatchedReason::Declined))
}
