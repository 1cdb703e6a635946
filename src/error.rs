use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::session::Phase;

/// Rejected session settings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rounds must be at least 1, got {0}")]
    InvalidRounds(u32),

    #[error("round duration must be at least one second, got {0}s")]
    InvalidRoundDuration(u32),

    #[error("break duration must be at least one second, got {0}s")]
    InvalidBreakDuration(u32),
}

/// Why `Session::start` refused to run
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartError {
    #[error("invalid session config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("a session can only start from setup (current phase: {0})")]
    NotInSetup(Phase),
}

/// Failure inside a cue backend. Never leaves the cue player.
#[derive(Debug, Error)]
pub enum CueError {
    #[error("cue output failed: {0}")]
    Io(#[from] io::Error),

    #[error("cue output is not available: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read prompt catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("prompt catalog {0} contains no prompts")]
    Empty(PathBuf),
}
