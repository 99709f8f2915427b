//! Rendering a match result: JSON report and human listing.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use serde::Serialize;

use labelmatch_recon::model::{MatchResult, MatchSummary, MatchValue, UnmatchedWarning};
use labelmatch_recon::{MatchConfig, Strategy};

use crate::util::pad_right;

#[derive(Debug, Serialize)]
pub struct ReportMeta {
    pub config_name: String,
    pub strategy: Strategy,
    pub similarity_floor: f64,
    pub engine_version: String,
    pub build: String,
    pub run_at: String,
}

impl ReportMeta {
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            config_name: config.name.clone(),
            strategy: config.strategy,
            similarity_floor: config.thresholds.similarity_floor,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            build: env!("LMATCH_BUILD").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Shape of `lmatch match --json`.
#[derive(Debug, Serialize)]
pub struct MatchReport<'a> {
    pub meta: ReportMeta,
    pub matches: &'a BTreeMap<String, MatchValue>,
    pub unmatched: &'a BTreeSet<String>,
    #[serde(skip_serializing_if = "no_warnings")]
    pub warnings: &'a [UnmatchedWarning],
    pub summary: &'a MatchSummary,
}

fn no_warnings(warnings: &&[UnmatchedWarning]) -> bool {
    warnings.is_empty()
}

impl<'a> MatchReport<'a> {
    pub fn new(meta: ReportMeta, result: &'a MatchResult, summary: &'a MatchSummary) -> Self {
        Self {
            meta,
            matches: &result.matches,
            unmatched: &result.unmatched,
            warnings: &result.warnings,
            summary,
        }
    }
}

/// Matches, then unmatched labels, one per line.
pub fn write_human(out: &mut impl Write, result: &MatchResult) -> std::io::Result<()> {
    let key_width = result
        .matches
        .keys()
        .map(|k| crate::util::display_width(k))
        .max()
        .unwrap_or(0)
        .min(40);

    if !result.matches.is_empty() {
        writeln!(out, "matched:")?;
        for (source, value) in &result.matches {
            let marker = if value.is_tied() { "  (tied)" } else { "" };
            writeln!(out, "  {} -> {value}{marker}", pad_right(source, key_width))?;
        }
    }

    if !result.unmatched.is_empty() {
        writeln!(out, "unmatched:")?;
        for source in &result.unmatched {
            writeln!(out, "  {source}")?;
        }
    }

    Ok(())
}

/// One-line summary, e.g. `5 labels: 4 matched (1 tied), 1 unmatched, 2 targets unused`.
pub fn summary_line(summary: &MatchSummary) -> String {
    format!(
        "{} labels: {} matched ({} tied), {} unmatched, {} targets unused",
        summary.source_labels,
        summary.matched,
        summary.tied,
        summary.unmatched,
        summary.unused_targets.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> MatchResult {
        let mut r = MatchResult::default();
        r.matches.insert("Oranje".into(), MatchValue::Single("Orange".into()));
        r.matches.insert(
            "pineapple".into(),
            MatchValue::Tied(vec!["pineappla".into(), "Pineapple".into()]),
        );
        r.unmatched.insert("xyz123".into());
        r
    }

    fn targets(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn human_listing() {
        let mut out = Vec::new();
        write_human(&mut out, &result()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "matched:\n  Oranje    -> Orange\n  pineapple -> [pineappla, Pineapple]  (tied)\nunmatched:\n  xyz123\n"
        );
    }

    #[test]
    fn report_json_shape() {
        let r = result();
        let summary = labelmatch_recon::compute_summary(&r, &targets(&["Orange", "pineappla", "Pineapple"]));
        let report = MatchReport::new(ReportMeta::new(&MatchConfig::default()), &r, &summary);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["matches"]["Oranje"], "Orange");
        assert_eq!(value["matches"]["pineapple"][1], "Pineapple");
        assert_eq!(value["unmatched"][0], "xyz123");
        assert_eq!(value["meta"]["strategy"], "per_entry_greedy");
        assert_eq!(value["summary"]["tied"], 1);
        assert!(value.get("warnings").is_none());
    }

    #[test]
    fn summary_line_counts() {
        let r = result();
        let summary = labelmatch_recon::compute_summary(&r, &targets(&["Orange", "Apple"]));
        assert_eq!(
            summary_line(&summary),
            "3 labels: 2 matched (1 tied), 1 unmatched, 1 targets unused"
        );
    }
}
