use std::collections::BTreeSet;

use crate::model::{MatchResult, MatchSummary};

/// Compute summary statistics for a match result.
///
/// `targets` is the full right-hand collection; the ones no match refers to
/// are listed in input order.
pub fn compute_summary(result: &MatchResult, targets: &[String]) -> MatchSummary {
    let tied = result.matches.values().filter(|v| v.is_tied()).count();
    let used: BTreeSet<&str> = result.matched_targets();

    MatchSummary {
        source_labels: result.matches.len() + result.unmatched.len(),
        target_labels: targets.len(),
        matched: result.matches.len(),
        single: result.matches.len() - tied,
        tied,
        unmatched: result.unmatched.len(),
        unused_targets: targets
            .iter()
            .filter(|t| !used.contains(t.as_str()))
            .cloned()
            .collect(),
    }
}
