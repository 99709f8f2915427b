use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::debug;

use crate::model::{CandidateSet, MatchResult, MatchValue, ScoredPair};

/// Match source labels one at a time, in order, each to its best remaining
/// score group.
///
/// Targets taken by an earlier source are filtered out of later candidate
/// sets, so a group is only chosen for the targets still available in it. A
/// group of several targets becomes a `Tied` match and all of them are
/// consumed.
pub fn match_per_entry_greedy(sets: &[CandidateSet]) -> MatchResult {
    let mut consumed: BTreeSet<String> = BTreeSet::new();
    let mut result = MatchResult::default();

    for set in sets {
        let remaining = set.without(&consumed);
        match remaining.top() {
            Some(group) => {
                consumed.extend(group.targets.iter().cloned());
                let value = MatchValue::from_targets(group.targets.clone());
                debug!(source = %set.source, score = group.score, value = %value, "greedy match");
                result.matches.insert(set.source.clone(), value);
            }
            None => {
                result.unmatched.insert(set.source.clone());
            }
        }
    }

    result
}

/// Match over the whole similarity relation, best pairs first.
///
/// `pairs` must be sorted by descending score (see
/// [`SimilarityIndex::global`](crate::index::SimilarityIndex::global)); it is
/// never mutated. Each round looks at the live pairs sharing the top score:
///
/// - a single pair is committed;
/// - among several, every pair whose source and target occur only once at
///   that score is committed;
/// - when every tied pair shares a label with another one, the first pair
///   wins and the other targets tied with its source are recorded with it as
///   a `Tied` match.
///
/// Every round commits at least one pair, and committed labels never come
/// back, so no target is assigned twice.
pub fn match_global_greedy(sources: &[String], pairs: &[ScoredPair]) -> MatchResult {
    let mut spent_sources: HashSet<&str> = HashSet::new();
    let mut spent_targets: HashSet<&str> = HashSet::new();
    let mut matches: BTreeMap<String, MatchValue> = BTreeMap::new();

    let mut live: Vec<usize> = (0..pairs.len()).collect();

    loop {
        live.retain(|&i| {
            !spent_sources.contains(pairs[i].source.as_str())
                && !spent_targets.contains(pairs[i].target.as_str())
        });
        let Some(&first) = live.first() else {
            break;
        };

        let top = pairs[first].score;
        let tied: Vec<&ScoredPair> = live
            .iter()
            .map(|&i| &pairs[i])
            .take_while(|p| p.score == top)
            .collect();

        if let [only] = tied.as_slice() {
            debug!(source = %only.source, target = %only.target, score = top, "global match");
            spent_sources.insert(&only.source);
            spent_targets.insert(&only.target);
            matches.insert(only.source.clone(), MatchValue::Single(only.target.clone()));
            continue;
        }

        let mut source_counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut target_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for p in &tied {
            *source_counts.entry(p.source.as_str()).or_insert(0) += 1;
            *target_counts.entry(p.target.as_str()).or_insert(0) += 1;
        }

        let clean: Vec<&ScoredPair> = tied
            .iter()
            .copied()
            .filter(|p| source_counts[p.source.as_str()] == 1 && target_counts[p.target.as_str()] == 1)
            .collect();

        if !clean.is_empty() {
            for p in clean {
                debug!(source = %p.source, target = %p.target, score = top, "global match");
                spent_sources.insert(&p.source);
                spent_targets.insert(&p.target);
                matches.insert(p.source.clone(), MatchValue::Single(p.target.clone()));
            }
            continue;
        }

        // Full collision
        let winner = tied[0];
        let targets: Vec<&str> = tied
            .iter()
            .filter(|p| p.source == winner.source)
            .map(|p| p.target.as_str())
            .collect();
        let value = MatchValue::from_targets(targets.iter().map(|t| t.to_string()).collect());
        debug!(source = %winner.source, value = %value, score = top, "global match on collision");

        spent_sources.insert(&winner.source);
        spent_targets.extend(targets);
        matches.insert(winner.source.clone(), value);
    }

    let unmatched = sources
        .iter()
        .filter(|s| !matches.contains_key(*s))
        .cloned()
        .collect();

    MatchResult {
        matches,
        unmatched,
        warnings: Vec::new(),
    }
}
