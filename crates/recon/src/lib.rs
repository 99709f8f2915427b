//! `labelmatch-recon`: approximate label reconciliation engine.
//!
//! Pure engine crate: receives two label collections, returns a one-to-one
//! mapping plus the labels left over. Interactive review goes through the
//! [`DisambiguationChannel`] trait. No CLI or IO dependencies.

pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod index;
pub mod interactive;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod similarity;

pub use channel::{
    ChannelError, Confirmation, Decision, DisambiguationChannel, NoChannel, ScriptedChannel,
};
pub use config::{MatchConfig, Strategy};
pub use engine::{resolve_matches, run, MatchOptions};
pub use error::ReconError;
pub use evidence::compute_summary;
pub use model::{CandidateSet, MatchResult, MatchSummary, MatchValue, Side, UnmatchedWarning};
pub use normalize::{Normalization, StripChars};
pub use similarity::similarity;
