use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hotlap::errors::{ActionError, StepFailure};
use hotlap::exec::{ActionFuture, BuildAction, RunAction, StopHandle};

/// Shared, ordered log of everything the fake actions did.
///
/// Build steps record their name, run actions record `start:<name>` and
/// their stop handles record `stop:<name>`.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == event)
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

/// A build step that records its name and fails while its switch is on.
#[derive(Debug, Clone)]
pub struct FakeBuild {
    name: String,
    recorder: Recorder,
    fail: Arc<AtomicBool>,
    delay: Option<Duration>,
}

impl FakeBuild {
    pub fn new(name: &str, recorder: &Recorder) -> Self {
        Self {
            name: name.to_string(),
            recorder: recorder.clone(),
            fail: Arc::new(AtomicBool::new(false)),
            delay: None,
        }
    }

    pub fn failing(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    /// Sleep this long after recording, before reporting the result.
    pub fn taking(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Flip this to make later executions fail or succeed.
    pub fn fail_switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fail)
    }
}

impl BuildAction for FakeBuild {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn execute(&self) -> ActionFuture<'_, ()> {
        Box::pin(async move {
            self.recorder.record(self.name.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(ActionError::new(
                    self.name.clone(),
                    StepFailure::Message("simulated failure".to_string()),
                ));
            }
            Ok(())
        })
    }
}

/// A run action that records `start:<name>` and hands out a [`FakeStop`].
#[derive(Debug, Clone)]
pub struct FakeRun {
    name: String,
    recorder: Recorder,
    fail: Arc<AtomicBool>,
}

impl FakeRun {
    pub fn new(name: &str, recorder: &Recorder) -> Self {
        Self {
            name: name.to_string(),
            recorder: recorder.clone(),
            fail: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn failing(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }
}

impl RunAction for FakeRun {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn start(&self) -> ActionFuture<'_, Box<dyn StopHandle>> {
        Box::pin(async move {
            self.recorder.record(format!("start:{}", self.name));
            if self.fail.load(Ordering::SeqCst) {
                return Err(ActionError::new(
                    self.name.clone(),
                    StepFailure::Message("simulated launch failure".to_string()),
                ));
            }
            Ok(Box::new(FakeStop {
                name: self.name.clone(),
                recorder: self.recorder.clone(),
            }) as Box<dyn StopHandle>)
        })
    }
}

/// Stop handle that records `stop:<name>`.
#[derive(Debug)]
pub struct FakeStop {
    name: String,
    recorder: Recorder,
}

impl StopHandle for FakeStop {
    fn stop(self: Box<Self>) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async move {
            self.recorder.record(format!("stop:{}", self.name));
        })
    }
}
