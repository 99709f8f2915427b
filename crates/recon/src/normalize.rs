use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Deserialize;

use crate::error::{Collision, ReconError};
use crate::model::{MatchValue, Side};

/// Separators and punctuation removed by [`StripChars::Default`], in addition
/// to all whitespace.
pub const DEFAULT_STRIP_CHARS: &[char] = &['_', ',', '|', '\'', '"', '&', '%', '\\', '*', '-'];

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Characters removed from labels before comparison.
///
/// Deserializes from a string: `"none"`, `"default"`, or any other string
/// taken as the literal set of characters to remove.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum StripChars {
    None,
    #[default]
    Default,
    Custom(BTreeSet<char>),
}

impl StripChars {
    pub fn parse(value: &str) -> Self {
        match value {
            "" | "none" => StripChars::None,
            "default" => StripChars::Default,
            chars => StripChars::Custom(chars.chars().collect()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, StripChars::None)
    }

    fn strips(&self, c: char) -> bool {
        match self {
            StripChars::None => false,
            StripChars::Default => c.is_whitespace() || DEFAULT_STRIP_CHARS.contains(&c),
            StripChars::Custom(set) => set.contains(&c),
        }
    }
}

impl From<String> for StripChars {
    fn from(value: String) -> Self {
        StripChars::parse(&value)
    }
}

/// How labels are reduced before comparison. Applied identically to both sides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Normalization {
    #[serde(default = "default_lower_case")]
    pub lower_case: bool,
    #[serde(default)]
    pub strip: StripChars,
}

fn default_lower_case() -> bool {
    true
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            lower_case: true,
            strip: StripChars::Default,
        }
    }
}

impl Normalization {
    pub fn validate(&self) -> Result<(), ReconError> {
        if !self.lower_case && self.strip.is_none() {
            return Err(ReconError::EmptyNormalization);
        }
        Ok(())
    }

    /// Comparison form of a single label.
    pub fn apply(&self, label: &str) -> String {
        let stripped: String = label.chars().filter(|&c| !self.strip.strips(c)).collect();
        if self.lower_case {
            stripped.to_lowercase()
        } else {
            stripped
        }
    }
}

// ---------------------------------------------------------------------------
// Reverse table
// ---------------------------------------------------------------------------

/// Comparison forms of one side's labels plus the way back to the originals.
#[derive(Debug, Clone)]
pub struct NormalizationMap {
    normalized: Vec<String>,
    originals: HashMap<String, String>,
}

impl NormalizationMap {
    /// Map that compares labels as given.
    pub fn identity(labels: &[String]) -> Self {
        Self {
            normalized: labels.to_vec(),
            originals: labels.iter().map(|l| (l.clone(), l.clone())).collect(),
        }
    }

    /// Comparison forms in input order.
    pub fn normalized(&self) -> &[String] {
        &self.normalized
    }

    /// Original label for a comparison form. Unknown forms come back unchanged.
    pub fn original<'a>(&'a self, normalized: &'a str) -> &'a str {
        self.originals
            .get(normalized)
            .map(String::as_str)
            .unwrap_or(normalized)
    }

    pub fn translate(&self, value: &MatchValue) -> MatchValue {
        value.map(|t| self.original(t).to_string())
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Fails when a side lists the same label twice.
pub fn check_unique(side: Side, labels: &[String]) -> Result<(), ReconError> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut duplicates: BTreeSet<&str> = BTreeSet::new();
    for label in labels {
        if !seen.insert(label) {
            duplicates.insert(label);
        }
    }
    if duplicates.is_empty() {
        return Ok(());
    }
    Err(ReconError::InputUniqueness {
        side,
        duplicates: duplicates.into_iter().map(str::to_string).collect(),
    })
}

/// Normalizes one side's labels and builds its reverse table.
///
/// Fails with [`ReconError::Collision`] when two distinct labels reduce to the
/// same comparison form; every colliding key is reported.
pub fn normalize_labels(
    side: Side,
    labels: &[String],
    policy: &Normalization,
) -> Result<NormalizationMap, ReconError> {
    policy.validate()?;

    let mut normalized = Vec::with_capacity(labels.len());
    let mut originals: HashMap<String, String> = HashMap::with_capacity(labels.len());
    let mut collided: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for label in labels {
        let key = policy.apply(label);
        match originals.get(&key) {
            Some(first) => {
                collided
                    .entry(key)
                    .or_insert_with(|| vec![first.clone()])
                    .push(label.clone());
            }
            None => {
                originals.insert(key.clone(), label.clone());
                normalized.push(key);
            }
        }
    }

    if !collided.is_empty() {
        let collisions = collided
            .into_iter()
            .map(|(key, originals)| Collision { key, originals })
            .collect();
        return Err(ReconError::Collision { side, collisions });
    }

    Ok(NormalizationMap {
        normalized,
        originals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_policy_folds_case_and_strips_separators() {
        let policy = Normalization::default();
        assert_eq!(policy.apply("First_Name"), "firstname");
        assert_eq!(policy.apply("Profit & Loss %"), "profitloss");
        assert_eq!(policy.apply("a\\b*c-d|e,f'g\"h\ti\nj"), "abcdefghij");
    }

    #[test]
    fn custom_strip_set() {
        let policy = Normalization {
            lower_case: false,
            strip: StripChars::parse("._"),
        };
        assert_eq!(policy.apply("Net.Sales_Q1 Total"), "NetSalesQ1 Total");
    }

    #[test]
    fn lower_case_only() {
        let policy = Normalization {
            lower_case: true,
            strip: StripChars::None,
        };
        assert_eq!(policy.apply("Foo_Bar"), "foo_bar");
    }

    #[test]
    fn empty_policy_rejected() {
        let policy = Normalization {
            lower_case: false,
            strip: StripChars::None,
        };
        let err = normalize_labels(Side::Left, &labels(&["a"]), &policy).unwrap_err();
        assert!(matches!(err, ReconError::EmptyNormalization));
    }

    #[test]
    fn reverse_table_restores_originals() {
        let map =
            normalize_labels(Side::Left, &labels(&["First Name", "Last_Name"]), &Normalization::default())
                .unwrap();
        assert_eq!(map.normalized(), &["firstname", "lastname"]);
        assert_eq!(map.original("firstname"), "First Name");
        assert_eq!(map.original("lastname"), "Last_Name");
        assert_eq!(map.original("unknown"), "unknown");
    }

    #[test]
    fn collision_lists_every_original() {
        let err = normalize_labels(
            Side::Right,
            &labels(&["Foo_Bar", "foo bar", "FOO-BAR", "baz"]),
            &Normalization::default(),
        )
        .unwrap_err();
        match err {
            ReconError::Collision { side, collisions } => {
                assert_eq!(side, Side::Right);
                assert_eq!(collisions.len(), 1);
                assert_eq!(collisions[0].key, "foobar");
                assert_eq!(collisions[0].originals, labels(&["Foo_Bar", "foo bar", "FOO-BAR"]));
            }
            other => panic!("expected collision, got {other:?}"),
        }
    }

    #[test]
    fn duplicates_reported_once_each() {
        let err = check_unique(Side::Left, &labels(&["a", "b", "a", "a", "c", "b"])).unwrap_err();
        match err {
            ReconError::InputUniqueness { side, duplicates } => {
                assert_eq!(side, Side::Left);
                assert_eq!(duplicates, labels(&["a", "b"]));
            }
            other => panic!("expected uniqueness error, got {other:?}"),
        }
        assert!(check_unique(Side::Right, &labels(&["a", "b"])).is_ok());
    }

    #[test]
    fn strip_chars_deserializes_from_string() {
        #[derive(Deserialize)]
        struct Probe {
            strip: StripChars,
        }
        let none: Probe = toml::from_str("strip = \"none\"").unwrap();
        let default: Probe = toml::from_str("strip = \"default\"").unwrap();
        let custom: Probe = toml::from_str("strip = \"#.\"").unwrap();
        assert_eq!(none.strip, StripChars::None);
        assert_eq!(default.strip, StripChars::Default);
        assert_eq!(custom.strip, StripChars::Custom(['#', '.'].into_iter().collect()));
    }
}
