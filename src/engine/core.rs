// src/engine/core.rs

//! Supervisor state.
//!
//! Owned and mutated by the single control loop only, so there is no locking.
//! It holds no channels or timers; the loop in `engine::supervisor` does all
//! the IO.

use std::time::SystemTime;

use crate::exec::StopHandle;

/// Which state the supervisor is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing is running: no attempt yet, the last attempt failed, or the
    /// pipeline has no run action.
    Idle,
    /// A started app is held and will be stopped on the next change.
    Running,
}

#[derive(Debug)]
pub struct SupervisorState {
    watermark: SystemTime,
    running: Option<Box<dyn StopHandle>>,
}

impl Default for SupervisorState {
    fn default() -> Self {
        Self::new()
    }
}

impl SupervisorState {
    /// Idle, with the watermark at the UNIX epoch so the first scan builds.
    pub fn new() -> Self {
        Self {
            watermark: SystemTime::UNIX_EPOCH,
            running: None,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.running.is_some() {
            Phase::Running
        } else {
            Phase::Idle
        }
    }

    /// Timestamp of the last pipeline attempt.
    pub fn watermark(&self) -> SystemTime {
        self.watermark
    }

    /// Take the held stop handle, leaving the state Idle.
    pub fn take_running(&mut self) -> Option<Box<dyn StopHandle>> {
        self.running.take()
    }

    /// Record the end of a pipeline attempt at `now`.
    ///
    /// `handle` is the app started by a successful attempt, if any. The
    /// previous handle must already have been taken and stopped.
    pub fn record_attempt(&mut self, now: SystemTime, handle: Option<Box<dyn StopHandle>>) {
        debug_assert!(self.running.is_none(), "previous app was not stopped");
        self.watermark = now;
        self.running = handle;
    }
}
