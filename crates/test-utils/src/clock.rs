use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use hotlap::engine::Clock;

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one and hand another to
/// the supervisor.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<SystemTime>>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// A clock starting at `UNIX_EPOCH + secs`.
    pub fn at_secs(secs: u64) -> Self {
        Self::new(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    pub fn set(&self, t: SystemTime) {
        *self.now.lock().unwrap() = t;
    }

    pub fn advance(&self, by: Duration) -> SystemTime {
        let mut guard = self.now.lock().unwrap();
        *guard += by;
        *guard
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap()
    }
}
