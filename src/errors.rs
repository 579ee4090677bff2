// src/errors.rs

//! Crate-wide error types and the `Result` alias.
//!
//! - [`ResolveError`] comes out of the command resolver (pure value errors).
//! - [`RunError`] describes why a single step could not be carried through.
//! - [`RunFailure`] wraps a `RunError` and says whether any step completed
//!   before it happened.
//! - [`CoderunError`] is what the top-level `run` returns.

use std::io;

use thiserror::Error;

use crate::exec::ExecutionResult;

#[derive(Error, Debug)]
pub enum CoderunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Run(#[from] RunFailure),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Why a file name could not be turned into a command plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unsupported file type: '{file_name}'")]
    UnsupportedFileType { file_name: String },

    #[error("cannot derive an output name from '{file_name}': nothing precedes '{extension}'")]
    MissingStem {
        file_name: String,
        extension: String,
    },
}

/// A step that could not be started or whose streams broke mid-run.
///
/// A non-zero exit is *not* a `RunError`; it is recorded in the step's
/// outcome and the step policy decides what happens next.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while running `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },
}

impl RunError {
    /// The command line of the step that failed.
    pub fn command(&self) -> &str {
        match self {
            RunError::Spawn { command, .. } | RunError::Io { command, .. } => command,
        }
    }
}

/// Runner failure, split by whether earlier steps had already completed.
#[derive(Error, Debug)]
pub enum RunFailure {
    /// Nothing completed; the first step already failed.
    #[error(transparent)]
    Total(RunError),

    /// At least one step ran to completion before `error`.
    #[error("{error} (after {steps} completed step(s))", steps = .completed.steps.len())]
    Partial {
        completed: ExecutionResult,
        error: RunError,
    },
}

impl RunFailure {
    pub fn error(&self) -> &RunError {
        match self {
            RunFailure::Total(error) | RunFailure::Partial { error, .. } => error,
        }
    }

    /// What was gathered before the failure, if anything completed.
    pub fn completed(&self) -> Option<&ExecutionResult> {
        match self {
            RunFailure::Total(_) => None,
            RunFailure::Partial { completed, .. } => Some(completed),
        }
    }

    pub fn is_total(&self) -> bool {
        matches!(self, RunFailure::Total(_))
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CoderunError>;
