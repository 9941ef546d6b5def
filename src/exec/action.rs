// src/exec/action.rs

//! Action abstraction consumed by the pipeline.
//!
//! - A [`BuildAction`] runs to completion and reports success or failure.
//! - A [`RunAction`] launches something long-running and hands back a
//!   [`StopHandle`] as soon as it is up.
//!
//! Production code uses the command adapters in [`super::command`]; tests can
//! provide their own implementations that never spawn a process.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::errors::ActionError;

/// Boxed future returned by actions.
pub type ActionFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ActionError>> + Send + 'a>>;

/// A build step. Stateless between invocations; may be executed many times.
pub trait BuildAction: Send + Sync + fmt::Debug {
    /// Human-readable description, e.g. the command line.
    fn describe(&self) -> String;

    /// Run the step to completion.
    fn execute(&self) -> ActionFuture<'_, ()>;
}

/// The long-running application started by the run phase.
pub trait RunAction: Send + Sync + fmt::Debug {
    fn describe(&self) -> String;

    /// Launch the application and return once it is running.
    ///
    /// An error means nothing was left running.
    fn start(&self) -> ActionFuture<'_, Box<dyn StopHandle>>;
}

/// Single-use capability that terminates a started application.
///
/// `stop` consumes the handle, so it can be called at most once.
pub trait StopHandle: Send + fmt::Debug {
    fn stop(self: Box<Self>) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}
