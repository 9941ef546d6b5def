// src/engine/pipeline.rs

//! Pre / run / post sequencing.
//!
//! Phases run strictly in order and the first failure ends the attempt:
//!
//! 1. pre steps, one after another
//! 2. start the run action
//! 3. post steps, one after another
//!
//! Only a post-step failure has something to clean up: the app started in
//! phase 2 is stopped before the error is returned.

use std::fmt;

use tracing::{debug, warn};

use crate::errors::PipelineError;
use crate::exec::{BuildAction, RunAction, StopHandle};

/// Ordered build/run/build unit executed once per detected change.
#[derive(Default)]
pub struct Pipeline {
    pre: Vec<Box<dyn BuildAction>>,
    run: Option<Box<dyn RunAction>>,
    post: Vec<Box<dyn BuildAction>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("pre", &self.pre_descriptions())
            .field("run", &self.run.as_ref().map(|r| r.describe()))
            .field("post", &self.post_descriptions())
            .finish()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pre(mut self, action: impl BuildAction + 'static) -> Self {
        self.pre.push(Box::new(action));
        self
    }

    pub fn with_run(mut self, action: impl RunAction + 'static) -> Self {
        self.run = Some(Box::new(action));
        self
    }

    pub fn with_post(mut self, action: impl BuildAction + 'static) -> Self {
        self.post.push(Box::new(action));
        self
    }

    pub fn push_pre(&mut self, action: Box<dyn BuildAction>) {
        self.pre.push(action);
    }

    pub fn set_run(&mut self, action: Option<Box<dyn RunAction>>) {
        self.run = action;
    }

    pub fn push_post(&mut self, action: Box<dyn BuildAction>) {
        self.post.push(action);
    }

    /// True if the pipeline has no actions at all.
    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.run.is_none() && self.post.is_empty()
    }

    pub fn pre_descriptions(&self) -> Vec<String> {
        self.pre.iter().map(|a| a.describe()).collect()
    }

    pub fn run_description(&self) -> Option<String> {
        self.run.as_ref().map(|r| r.describe())
    }

    pub fn post_descriptions(&self) -> Vec<String> {
        self.post.iter().map(|a| a.describe()).collect()
    }

    /// Execute all phases once.
    ///
    /// `Ok(None)` means every step succeeded and there is no run action.
    pub async fn execute(&self) -> Result<Option<Box<dyn StopHandle>>, PipelineError> {
        run_pipeline(&self.pre, self.run.as_deref(), &self.post).await
    }
}

/// Run `pre`, start `run`, then run `post`, stopping at the first failure.
///
/// On error, nothing started by this call is left running.
pub async fn run_pipeline(
    pre: &[Box<dyn BuildAction>],
    run: Option<&dyn RunAction>,
    post: &[Box<dyn BuildAction>],
) -> Result<Option<Box<dyn StopHandle>>, PipelineError> {
    for (index, step) in pre.iter().enumerate() {
        debug!(index, step = %step.describe(), "pre step");
        step.execute()
            .await
            .map_err(|source| PipelineError::PreBuild { index, source })?;
    }

    let stop = match run {
        Some(action) => {
            debug!(action = %action.describe(), "starting app");
            Some(action.start().await.map_err(PipelineError::RunStart)?)
        }
        None => None,
    };

    for (index, step) in post.iter().enumerate() {
        debug!(index, step = %step.describe(), "post step");
        if let Err(source) = step.execute().await {
            if let Some(stop) = stop {
                warn!(index, "post step failed; stopping app");
                stop.stop().await;
            }
            return Err(PipelineError::PostBuild { index, source });
        }
    }

    Ok(stop)
}
