use thiserror::Error;

use crate::channel::ChannelError;
use crate::model::Side;

/// Labels from one side that normalized to the same comparison key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub key: String,
    pub originals: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ReconError {
    /// A label collection contains the same label more than once.
    #[error("{side} labels are not unique: {}", quoted(duplicates))]
    InputUniqueness { side: Side, duplicates: Vec<String> },

    /// Normalization mapped distinct labels onto one key.
    #[error(
        "normalization made {side} labels ambiguous, choose a different normalization: {}",
        describe_collisions(collisions)
    )]
    Collision { side: Side, collisions: Vec<Collision> },

    /// The requested matching mode is not implemented.
    #[error("unsupported matching mode: {0}")]
    UnsupportedMode(String),

    /// Neither case folding nor character stripping was requested.
    #[error("normalization must lower-case labels or strip characters (or both)")]
    EmptyNormalization,

    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Config validation error (threshold out of range, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),

    /// The interactive collaborator failed to deliver an answer.
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

fn quoted(labels: &[String]) -> String {
    labels
        .iter()
        .map(|l| format!("{l:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_collisions(collisions: &[Collision]) -> String {
    collisions
        .iter()
        .map(|c| format!("{:?} <- [{}]", c.key, quoted(&c.originals)))
        .collect::<Vec<_>>()
        .join("; ")
}
