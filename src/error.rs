//! Errors raised while turning user input into a simulation setup.

use thiserror::Error;

/// A rejected command-line or wave configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown enemy kind `{0}` (expected datawisp, bitbug, memoryleech, syntaxbreaker or default)")]
    UnknownKind(String),
    #[error("wave entry `{0}` is not of the form kind=count")]
    MalformedEntry(String),
    #[error("invalid count `{count}` for `{kind}`: must be a positive integer")]
    InvalidCount { kind: String, count: String },
    #[error("wave specification is empty")]
    EmptyWave,
    #[error("arena {width}x{height} is too small: each side needs at least {min}")]
    ArenaTooSmall { width: f32, height: f32, min: f32 },
}
