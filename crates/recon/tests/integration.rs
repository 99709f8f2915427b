use std::collections::BTreeSet;

use proptest::prelude::*;

use labelmatch_recon::channel::{
    ChannelError, Confirmation, Decision, DisambiguationChannel, NoChannel, ScriptedChannel,
};
use labelmatch_recon::model::{
    CandidateSet, MatchResult, MatchValue, RankedCandidate, UnmatchedReason,
};
use labelmatch_recon::{compute_summary, run, MatchConfig, Strategy as MatchStrategy};

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn fruit_left() -> Vec<String> {
    labels(&["Apple", "pineapple", "Oranje", "marmalada", "seets"])
}

fn fruit_right() -> Vec<String> {
    labels(&["Apple", "pineappla", "Pineapple", "marmalade", "sweets", "Orange"])
}

fn config(strategy: MatchStrategy) -> MatchConfig {
    MatchConfig::from_toml(&format!(
        r#"
name = "fruit"
strategy = "{strategy}"

[thresholds]
similarity_floor = 0.6
min_auto_distance = 0.1
"#
    ))
    .unwrap()
}

fn single(t: &str) -> MatchValue {
    MatchValue::Single(t.into())
}

fn assert_fruit_resolved(result: &MatchResult) {
    assert_eq!(result.matches["Apple"], single("Apple"));
    assert_eq!(result.matches["Oranje"], single("Orange"));
    assert_eq!(result.matches["marmalada"], single("marmalade"));
    assert_eq!(result.matches["seets"], single("sweets"));
    // pineappla and Pineapple both score 16/18
    assert_eq!(
        result.matches["pineapple"],
        MatchValue::Tied(labels(&["pineappla", "Pineapple"]))
    );
    assert!(result.unmatched.is_empty());
}

/// Takes the top group for every question.
struct AlwaysDefault;

impl DisambiguationChannel for AlwaysDefault {
    fn present(&mut self, _: &str, _: &CandidateSet) -> Result<Decision, ChannelError> {
        Ok(Decision::Default)
    }

    fn confirm(&mut self, _: &str, _: usize, _: &RankedCandidate) -> Result<Confirmation, ChannelError> {
        Ok(Confirmation::Reject)
    }
}

// -------------------------------------------------------------------------
// Fruit scenario
// -------------------------------------------------------------------------

#[test]
fn fruit_per_entry_greedy() {
    let result = run(
        &config(MatchStrategy::PerEntryGreedy),
        &fruit_left(),
        &fruit_right(),
        &mut NoChannel,
    )
    .unwrap();
    assert_fruit_resolved(&result);
    assert!(result.warnings.is_empty());

    let summary = compute_summary(&result, &fruit_right());
    assert_eq!(summary.matched, 5);
    assert_eq!(summary.tied, 1);
    assert!(summary.unused_targets.is_empty());
}

#[test]
fn fruit_global_greedy() {
    let result = run(
        &config(MatchStrategy::GlobalGreedy),
        &fruit_left(),
        &fruit_right(),
        &mut NoChannel,
    )
    .unwrap();
    assert_fruit_resolved(&result);
}

#[test]
fn fruit_interactive_asks_only_close_calls() {
    let mut ch = ScriptedChannel::decisions([Decision::Default, Decision::Default, Decision::Default]);
    let result = run(
        &config(MatchStrategy::Interactive),
        &fruit_left(),
        &fruit_right(),
        &mut ch,
    )
    .unwrap();
    assert_fruit_resolved(&result);
    // seets/sweets (10/11) clears 1 - 0.1 and is taken without asking
    assert_eq!(ch.presented, vec!["pineapple", "Oranje", "marmalada"]);
    assert_eq!(ch.auto, vec![("seets".to_string(), single("sweets"))]);
    assert!(ch.is_drained());
}

#[test]
fn fruit_interactive_skip_warns() {
    let mut ch = ScriptedChannel::decisions([Decision::Default, Decision::Skip, Decision::Default]);
    let result = run(
        &config(MatchStrategy::Interactive),
        &fruit_left(),
        &fruit_right(),
        &mut ch,
    )
    .unwrap();
    assert!(result.unmatched.contains("Oranje"));
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].source, "Oranje");
    assert_eq!(result.warnings[0].floor, 0.6);

    let summary = compute_summary(&result, &fruit_right());
    assert_eq!(summary.unused_targets, vec!["Orange"]);
}

#[test]
fn abandoned_label_does_not_stop_the_run() {
    // abcd ties abce/abcf at 0.75; wxyz has wxyq alone at 0.75
    let mut ch = ScriptedChannel::decisions([Decision::Abandon, Decision::Default]);
    let result = run(
        &config(MatchStrategy::Interactive),
        &labels(&["abcd", "wxyz"]),
        &labels(&["abce", "abcf", "wxyq"]),
        &mut ch,
    )
    .unwrap();
    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.matches["wxyz"], single("wxyq"));
    assert_eq!(result.unmatched, BTreeSet::from(["abcd".to_string()]));
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].reason, UnmatchedReason::Abandoned);
    assert_eq!(ch.presented, vec!["abcd", "wxyz"]);
    assert!(ch.is_drained());
}

// -------------------------------------------------------------------------
// Properties
// -------------------------------------------------------------------------

#[test]
fn disjoint_labels_stay_unmatched() {
    for strategy in MatchStrategy::ALL {
        let result = run(
            &config(strategy),
            &labels(&["xyz123"]),
            &labels(&["qqq789"]),
            &mut NoChannel,
        )
        .unwrap();
        assert!(result.matches.is_empty(), "{strategy}");
        assert_eq!(result.unmatched, BTreeSet::from(["xyz123".to_string()]));
    }
}

#[test]
fn exact_equality_always_wins() {
    for strategy in MatchStrategy::ALL {
        let result = run(
            &config(strategy),
            &labels(&["Apple"]),
            &labels(&["Apple", "Apply"]),
            &mut NoChannel,
        )
        .unwrap();
        assert_eq!(result.matches.len(), 1, "{strategy}");
        assert_eq!(result.matches["Apple"], single("Apple"));
        let summary = compute_summary(&result, &labels(&["Apple", "Apply"]));
        assert_eq!(summary.unused_targets, vec!["Apply"]);
    }
}

#[test]
fn per_entry_greedy_is_idempotent() {
    let cfg = config(MatchStrategy::PerEntryGreedy);
    let first = run(&cfg, &fruit_left(), &fruit_right(), &mut NoChannel).unwrap();
    let second = run(&cfg, &fruit_left(), &fruit_right(), &mut NoChannel).unwrap();
    assert_eq!(first, second);
}

#[test]
fn tie_keeps_every_candidate() {
    // sweets and seetsx both score 10/11 against seets
    let result = run(
        &config(MatchStrategy::PerEntryGreedy),
        &labels(&["seets"]),
        &labels(&["sweets", "seetsx"]),
        &mut NoChannel,
    )
    .unwrap();
    assert_eq!(result.matches["seets"], MatchValue::Tied(labels(&["sweets", "seetsx"])));
}

#[test]
fn normalization_round_trip_returns_original_labels() {
    let cfg = MatchConfig::from_toml(
        r#"
name = "columns"

[normalization]
lower_case = true
strip = "default"
"#,
    )
    .unwrap();
    let left = labels(&["First Name", "Last_Name", "E-Mail Addr"]);
    let right = labels(&["first-name", "LASTNAME", "email_address"]);
    let result = run(&cfg, &left, &right, &mut NoChannel).unwrap();

    assert_eq!(result.matches["First Name"], single("first-name"));
    assert_eq!(result.matches["Last_Name"], single("LASTNAME"));
    // emailaddr vs emailaddress: 2 * 9 / 21
    assert_eq!(result.matches["E-Mail Addr"], single("email_address"));
    for key in result.matches.keys().chain(result.unmatched.iter()) {
        assert!(left.contains(key), "{key} is not an original label");
    }
}

// -------------------------------------------------------------------------
// Property tests
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release
// -------------------------------------------------------------------------

fn proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn label_sets() -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
    (
        prop::collection::btree_set("[a-d]{1,4}", 0..7),
        prop::collection::btree_set("[a-d]{1,4}", 0..7),
    )
        .prop_map(|(l, r)| (l.into_iter().collect(), r.into_iter().collect()))
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn every_source_label_lands_exactly_once((left, right) in label_sets()) {
        for strategy in MatchStrategy::ALL {
            let result = run(&config(strategy), &left, &right, &mut AlwaysDefault).unwrap();
            let matched: BTreeSet<&String> = result.matches.keys().collect();
            let unmatched: BTreeSet<&String> = result.unmatched.iter().collect();
            prop_assert!(matched.is_disjoint(&unmatched));
            let all: BTreeSet<&String> = matched.union(&unmatched).copied().collect();
            let expected: BTreeSet<&String> = left.iter().collect();
            prop_assert_eq!(all, expected);
        }
    }

    #[test]
    fn global_greedy_never_reuses_a_target((left, right) in label_sets()) {
        let result = run(&config(MatchStrategy::GlobalGreedy), &left, &right, &mut NoChannel).unwrap();
        let mut seen = BTreeSet::new();
        for value in result.matches.values() {
            for t in value.targets() {
                prop_assert!(seen.insert(t.clone()), "target {} assigned twice", t);
                prop_assert!(right.contains(t));
            }
        }
    }
}
