// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`action`] defines the `BuildAction` / `RunAction` / `StopHandle`
//!   traits the pipeline is written against.
//! - [`command`] implements them on top of `tokio::process::Command`.

pub mod action;
pub mod command;

pub use action::{ActionFuture, BuildAction, RunAction, StopHandle};
pub use command::{CommandBuildAction, CommandRunAction, CommandSpec, ProcessHandle};
