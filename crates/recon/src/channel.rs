//! Interactive collaborator for entries the heuristics cannot settle.
//!
//! The engine never talks to a terminal. It hands a [`CandidateSet`] to a
//! [`DisambiguationChannel`] and acts on the returned [`Decision`].

use std::collections::VecDeque;

use thiserror::Error;

use crate::model::{CandidateSet, MatchValue, RankedCandidate};

/// Answer to "which of these candidates is the match?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Take the top score group as is.
    Default,
    /// Take one candidate by its zero-based position in the flattened ranking.
    Index(usize),
    /// None of the candidates is right.
    Skip,
    /// Stop matching this entry.
    Abandon,
    /// The answer could not be interpreted; the engine falls back to asking
    /// about each remaining candidate in turn.
    Unrecognized(String),
}

/// Answer to "is this candidate the match?" during the fallback walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Accept,
    Reject,
    Abandon,
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("input closed while waiting for a choice")]
    Closed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no interactive channel available to resolve {0:?}")]
    Unavailable(String),

    #[error("scripted answers exhausted at {0:?}")]
    Exhausted(String),
}

pub trait DisambiguationChannel {
    /// Shows the ranked candidates for `source` and returns the choice.
    fn present(&mut self, source: &str, candidates: &CandidateSet)
        -> Result<Decision, ChannelError>;

    /// Asks about one candidate; `rank` is its zero-based position in the
    /// flattened ranking.
    fn confirm(
        &mut self,
        source: &str,
        rank: usize,
        candidate: &RankedCandidate,
    ) -> Result<Confirmation, ChannelError>;

    /// Told about matches taken without asking.
    fn auto_matched(&mut self, _source: &str, _value: &MatchValue) {}
}

// ---------------------------------------------------------------------------
// Implementations
// ---------------------------------------------------------------------------

/// Channel for batch strategies: any question is an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoChannel;

impl DisambiguationChannel for NoChannel {
    fn present(&mut self, source: &str, _: &CandidateSet) -> Result<Decision, ChannelError> {
        Err(ChannelError::Unavailable(source.to_string()))
    }

    fn confirm(
        &mut self,
        source: &str,
        _: usize,
        _: &RankedCandidate,
    ) -> Result<Confirmation, ChannelError> {
        Err(ChannelError::Unavailable(source.to_string()))
    }
}

/// Replays queued answers in order and records what it was shown.
#[derive(Debug, Default, Clone)]
pub struct ScriptedChannel {
    decisions: VecDeque<Decision>,
    confirmations: VecDeque<Confirmation>,
    pub presented: Vec<String>,
    pub confirmed: Vec<(String, String)>,
    pub auto: Vec<(String, MatchValue)>,
}

impl ScriptedChannel {
    pub fn new(
        decisions: impl IntoIterator<Item = Decision>,
        confirmations: impl IntoIterator<Item = Confirmation>,
    ) -> Self {
        Self {
            decisions: decisions.into_iter().collect(),
            confirmations: confirmations.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn decisions(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self::new(decisions, [])
    }

    /// True when every queued answer was consumed.
    pub fn is_drained(&self) -> bool {
        self.decisions.is_empty() && self.confirmations.is_empty()
    }
}

impl DisambiguationChannel for ScriptedChannel {
    fn present(&mut self, source: &str, _: &CandidateSet) -> Result<Decision, ChannelError> {
        self.presented.push(source.to_string());
        self.decisions
            .pop_front()
            .ok_or_else(|| ChannelError::Exhausted(source.to_string()))
    }

    fn confirm(
        &mut self,
        source: &str,
        _: usize,
        candidate: &RankedCandidate,
    ) -> Result<Confirmation, ChannelError> {
        self.confirmed
            .push((source.to_string(), candidate.target.clone()));
        self.confirmations
            .pop_front()
            .ok_or_else(|| ChannelError::Exhausted(source.to_string()))
    }

    fn auto_matched(&mut self, source: &str, value: &MatchValue) {
        self.auto.push((source.to_string(), value.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> RankedCandidate {
        RankedCandidate {
            score: 0.8,
            target: "t".into(),
        }
    }

    #[test]
    fn no_channel_refuses() {
        let set = CandidateSet {
            source: "s".into(),
            groups: vec![],
        };
        let err = NoChannel.present("s", &set).unwrap_err();
        assert!(matches!(err, ChannelError::Unavailable(ref s) if s == "s"));
        assert!(NoChannel.confirm("s", 0, &candidate()).is_err());
    }

    #[test]
    fn scripted_replays_in_order_then_runs_dry() {
        let set = CandidateSet {
            source: "s".into(),
            groups: vec![],
        };
        let mut ch = ScriptedChannel::new([Decision::Skip, Decision::Index(2)], [Confirmation::Reject]);
        assert_eq!(ch.present("a", &set).unwrap(), Decision::Skip);
        assert_eq!(ch.present("b", &set).unwrap(), Decision::Index(2));
        assert_eq!(ch.confirm("b", 1, &candidate()).unwrap(), Confirmation::Reject);
        assert!(ch.is_drained());
        assert!(matches!(ch.present("c", &set), Err(ChannelError::Exhausted(_))));
        assert_eq!(ch.presented, vec!["a", "b", "c"]);
        assert_eq!(ch.confirmed, vec![("b".to_string(), "t".to_string())]);
    }
}
