// src/errors.rs

//! Crate-wide error types.
//!
//! - [`HotlapError`] covers startup problems (config, IO, TOML).
//! - [`ActionError`] / [`StepFailure`] describe a single failed command.
//! - [`PipelineError`] says which phase of a pipeline attempt failed.
//! - [`ScanError`] is recorded by the change detector and never returned.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HotlapError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, HotlapError>;

/// Why a single command did not succeed.
#[derive(Error, Debug)]
pub enum StepFailure {
    #[error("failed to launch: {0}")]
    Launch(#[source] std::io::Error),

    #[error("failed waiting for process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("exited with {0}")]
    Exit(ExitStatus),

    /// Free-form failure, used by actions that are not OS processes.
    #[error("{0}")]
    Message(String),
}

/// A build or run action failed.
///
/// `command` is the rendered command line (or a description for non-command
/// actions), so the operator can tell which step broke.
#[derive(Error, Debug)]
#[error("\"{command}\": {failure}")]
pub struct ActionError {
    pub command: String,
    #[source]
    pub failure: StepFailure,
}

impl ActionError {
    pub fn new(command: impl Into<String>, failure: StepFailure) -> Self {
        Self {
            command: command.into(),
            failure,
        }
    }
}

/// Outcome of a failed pipeline attempt, tagged with the phase that failed.
///
/// Whatever the variant, no process started by the failed attempt is left
/// running.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("pre step {index} failed: {source}")]
    PreBuild {
        index: usize,
        #[source]
        source: ActionError,
    },

    #[error("app failed to start: {0}")]
    RunStart(#[source] ActionError),

    #[error("post step {index} failed: {source}")]
    PostBuild {
        index: usize,
        #[source]
        source: ActionError,
    },
}

impl PipelineError {
    /// The action error underneath the phase tag.
    pub fn action_error(&self) -> &ActionError {
        match self {
            PipelineError::PreBuild { source, .. } => source,
            PipelineError::RunStart(source) => source,
            PipelineError::PostBuild { source, .. } => source,
        }
    }
}

/// A single entry the change detector could not inspect.
#[derive(Error, Debug)]
#[error("cannot scan {path:?}: {source}")]
pub struct ScanError {
    pub path: PathBuf,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}
