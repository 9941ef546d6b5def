// src/engine/supervisor.rs

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::errors::PipelineError;
use crate::watch::ChangeDetector;

use super::clock::{Clock, SystemClock};
use super::core::{Phase, SupervisorState};
use super::pipeline::Pipeline;

/// What a single supervisor tick did.
#[derive(Debug)]
pub enum StepOutcome {
    /// No file changed since the watermark; nothing ran.
    Unchanged,
    /// The pipeline succeeded. `running` tells whether an app is now held.
    Rebuilt { running: bool },
    /// The pipeline failed; nothing is running.
    Failed(PipelineError),
}

impl StepOutcome {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, StepOutcome::Unchanged)
    }
}

/// Polls the watch root and restarts the app whenever a file changes.
///
/// `step` performs exactly one tick without sleeping, which is what tests
/// drive. `run` repeats `step` every `interval` until the shutdown future
/// resolves.
pub struct Supervisor {
    root: PathBuf,
    interval: Duration,
    detector: ChangeDetector,
    pipeline: Pipeline,
    clock: Arc<dyn Clock>,
    state: SupervisorState,
}

impl fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("root", &self.root)
            .field("interval", &self.interval)
            .field("pipeline", &self.pipeline)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Supervisor {
    pub fn new(
        root: impl Into<PathBuf>,
        interval: Duration,
        detector: ChangeDetector,
        pipeline: Pipeline,
    ) -> Self {
        Self {
            root: root.into(),
            interval,
            detector,
            pipeline,
            clock: Arc::new(SystemClock),
            state: SupervisorState::new(),
        }
    }

    /// Replace the wall clock used for watermarks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &SupervisorState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// One tick: scan, and rebuild if anything changed since the watermark.
    pub async fn step(&mut self) -> StepOutcome {
        let report = self.detector.scan(&self.root, self.state.watermark());
        let Some(path) = report.changed else {
            debug!(visited = report.visited, skipped = report.skipped.len(), "no changes");
            return StepOutcome::Unchanged;
        };

        info!(path = ?path, "change detected");
        self.rebuild().await
    }

    /// Stop whatever is running and execute the pipeline, regardless of
    /// whether anything changed.
    pub async fn run_once(&mut self) -> StepOutcome {
        self.rebuild().await
    }

    async fn rebuild(&mut self) -> StepOutcome {
        self.stop_running().await;

        info!("building & running app");
        let result = self.pipeline.execute().await;
        let now = self.clock.now();

        match result {
            Ok(handle) => {
                let running = handle.is_some();
                self.state.record_attempt(now, handle);
                StepOutcome::Rebuilt { running }
            }
            Err(err) => {
                // Advance the watermark anyway so the same change is not
                // rebuilt on every tick.
                self.state.record_attempt(now, None);
                error!("error running: {err}");
                StepOutcome::Failed(err)
            }
        }
    }

    async fn stop_running(&mut self) {
        if let Some(handle) = self.state.take_running() {
            info!("stopping running app");
            handle.stop().await;
        }
    }

    /// Stop the held app, if any. Used on shutdown.
    pub async fn shutdown(&mut self) {
        self.stop_running().await;
    }

    /// Poll forever, or until `shutdown` resolves.
    ///
    /// Shutdown is observed between steps; a step already in progress
    /// finishes first. The held app is stopped before returning.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(root = ?self.root, interval = ?self.interval, "supervisor started");

        loop {
            // Not raced against shutdown: dropping a step mid-pipeline would
            // lose the stop handle of an app it already started.
            self.step().await;

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("shutdown requested; stopping supervisor");
        self.shutdown().await;
    }
}
