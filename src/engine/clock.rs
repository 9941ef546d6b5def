// src/engine/clock.rs

use std::fmt::Debug;
use std::time::SystemTime;

/// Source of "now" for the supervisor's watermark.
///
/// Injected so tests can step the supervisor against a controlled clock.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> SystemTime;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}
