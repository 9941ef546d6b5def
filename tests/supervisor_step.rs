// tests/supervisor_step.rs

mod common;
use crate::common::{init_tracing, secs};

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use hotlap::engine::{Phase, StepOutcome, Supervisor};
use hotlap::errors::PipelineError;
use hotlap::fs::mock::MockFileSystem;
use hotlap::watch::ChangeDetector;
use hotlap_test_utils::builders::pipeline_of;
use hotlap_test_utils::clock::ManualClock;
use hotlap_test_utils::fake_actions::{FakeBuild, FakeRun, Recorder};
use hotlap_test_utils::with_timeout;

const ROOT: &str = "/proj";

struct Harness {
    fs: MockFileSystem,
    clock: ManualClock,
    rec: Recorder,
    build: FakeBuild,
    supervisor: Supervisor,
}

/// Supervisor over a mock tree with one source file, pipeline `build` → `app`.
fn harness() -> Harness {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/main.go", secs(100));

    let clock = ManualClock::at_secs(200);
    let rec = Recorder::new();
    let build = FakeBuild::new("build", &rec);
    let pipeline = pipeline_of(
        vec![build.clone()],
        Some(FakeRun::new("app", &rec)),
        Vec::new(),
    );

    let detector = ChangeDetector::new(Arc::new(fs.clone()));
    let supervisor = Supervisor::new(ROOT, Duration::from_millis(500), detector, pipeline)
        .with_clock(Arc::new(clock.clone()));

    Harness {
        fs,
        clock,
        rec,
        build,
        supervisor,
    }
}

#[tokio::test]
async fn first_step_builds_because_watermark_starts_at_epoch() {
    init_tracing();
    let mut h = harness();
    assert_eq!(h.supervisor.phase(), Phase::Idle);

    let outcome = h.supervisor.step().await;
    assert!(matches!(outcome, StepOutcome::Rebuilt { running: true }));
    assert_eq!(h.rec.events(), vec!["build", "start:app"]);
    assert_eq!(h.supervisor.phase(), Phase::Running);
    assert_eq!(h.supervisor.state().watermark(), secs(200));
}

#[tokio::test]
async fn consecutive_scans_without_modification_do_not_rebuild() {
    init_tracing();
    let mut h = harness();
    h.supervisor.step().await;
    h.rec.clear();

    for _ in 0..3 {
        h.clock.advance(Duration::from_secs(1));
        assert!(h.supervisor.step().await.is_unchanged());
    }
    assert!(h.rec.events().is_empty());
    assert_eq!(h.supervisor.phase(), Phase::Running);
    assert_eq!(h.supervisor.state().watermark(), secs(200));
}

#[tokio::test]
async fn change_while_running_stops_old_app_before_rebuilding() {
    init_tracing();
    let mut h = harness();
    h.supervisor.step().await;
    h.rec.clear();

    h.fs.touch("/proj/main.go", secs(300));
    h.clock.set(secs(400));

    let outcome = h.supervisor.step().await;
    assert!(matches!(outcome, StepOutcome::Rebuilt { running: true }));
    assert_eq!(h.rec.events(), vec!["stop:app", "build", "start:app"]);
    assert_eq!(h.supervisor.state().watermark(), secs(400));
}

#[tokio::test]
async fn failed_build_goes_idle_and_is_not_retried_until_next_change() {
    init_tracing();
    let mut h = harness();
    h.supervisor.step().await;
    h.rec.clear();

    h.build.fail_switch().store(true, Ordering::SeqCst);
    h.fs.touch("/proj/main.go", secs(500));
    h.clock.set(secs(600));

    let outcome = h.supervisor.step().await;
    assert!(matches!(
        outcome,
        StepOutcome::Failed(PipelineError::PreBuild { index: 0, .. })
    ));
    assert_eq!(h.rec.events(), vec!["stop:app", "build"]);
    assert_eq!(h.supervisor.phase(), Phase::Idle);
    assert_eq!(h.supervisor.state().watermark(), secs(600));

    // Same failing change: not rebuilt on the next tick.
    h.clock.set(secs(700));
    assert!(h.supervisor.step().await.is_unchanged());

    // A new edit after the fix: built again, nothing to stop first.
    h.rec.clear();
    h.build.fail_switch().store(false, Ordering::SeqCst);
    h.fs.touch("/proj/main.go", secs(800));
    h.clock.set(secs(900));

    let outcome = h.supervisor.step().await;
    assert!(matches!(outcome, StepOutcome::Rebuilt { running: true }));
    assert_eq!(h.rec.events(), vec!["build", "start:app"]);
    assert_eq!(h.supervisor.phase(), Phase::Running);
}

#[tokio::test]
async fn empty_tree_never_builds() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_dir("/proj/src", secs(1_000));
    let rec = Recorder::new();
    let pipeline = pipeline_of(
        vec![FakeBuild::new("build", &rec)],
        Some(FakeRun::new("app", &rec)),
        Vec::new(),
    );
    let mut supervisor = Supervisor::new(
        ROOT,
        Duration::from_millis(500),
        ChangeDetector::new(Arc::new(fs)),
        pipeline,
    );

    assert!(supervisor.step().await.is_unchanged());
    assert!(rec.events().is_empty());
    assert_eq!(supervisor.phase(), Phase::Idle);
}

#[tokio::test]
async fn pipeline_without_run_action_stays_idle_but_advances_watermark() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("/proj/site.md", secs(100));
    let rec = Recorder::new();
    let clock = ManualClock::at_secs(150);
    let pipeline = pipeline_of(
        vec![FakeBuild::new("render", &rec)],
        None::<FakeRun>,
        Vec::new(),
    );
    let mut supervisor = Supervisor::new(
        ROOT,
        Duration::from_millis(500),
        ChangeDetector::new(Arc::new(fs)),
        pipeline,
    )
    .with_clock(Arc::new(clock));

    let outcome = supervisor.step().await;
    assert!(matches!(outcome, StepOutcome::Rebuilt { running: false }));
    assert_eq!(supervisor.phase(), Phase::Idle);
    assert_eq!(supervisor.state().watermark(), secs(150));
    assert!(supervisor.step().await.is_unchanged());
    assert_eq!(rec.events(), vec!["render"]);
}

#[tokio::test]
async fn run_once_rebuilds_without_a_change() {
    init_tracing();
    let mut h = harness();
    h.supervisor.step().await;
    h.rec.clear();

    let outcome = h.supervisor.run_once().await;
    assert!(matches!(outcome, StepOutcome::Rebuilt { running: true }));
    assert_eq!(h.rec.events(), vec!["stop:app", "build", "start:app"]);
}

#[tokio::test]
async fn shutdown_stops_the_running_app() {
    init_tracing();
    let mut h = harness();
    h.supervisor.step().await;

    h.supervisor.shutdown().await;
    assert_eq!(h.supervisor.phase(), Phase::Idle);
    assert_eq!(h.rec.count("stop:app"), 1);

    // Nothing left to stop.
    h.supervisor.shutdown().await;
    assert_eq!(h.rec.count("stop:app"), 1);
}

#[tokio::test]
async fn run_loop_polls_until_shutdown_then_stops_app() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("/proj/main.go", secs(100));
    let rec = Recorder::new();
    let pipeline = pipeline_of(
        vec![FakeBuild::new("build", &rec)],
        Some(FakeRun::new("app", &rec)),
        Vec::new(),
    );
    let supervisor = Supervisor::new(
        ROOT,
        Duration::from_millis(10),
        ChangeDetector::new(Arc::new(fs)),
        pipeline,
    );

    with_timeout(supervisor.run(tokio::time::sleep(Duration::from_millis(100)))).await;

    assert_eq!(rec.events(), vec!["build", "start:app", "stop:app"]);
}

#[tokio::test]
async fn shutdown_during_post_step_still_stops_the_new_app() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("/proj/main.go", secs(100));
    let rec = Recorder::new();
    let pipeline = pipeline_of(
        Vec::new(),
        Some(FakeRun::new("app", &rec)),
        vec![FakeBuild::new("smoke", &rec).taking(Duration::from_millis(300))],
    );
    let supervisor = Supervisor::new(
        ROOT,
        Duration::from_millis(10),
        ChangeDetector::new(Arc::new(fs)),
        pipeline,
    );

    // Shutdown fires while the post step is still sleeping.
    with_timeout(supervisor.run(tokio::time::sleep(Duration::from_millis(50)))).await;

    assert_eq!(rec.events(), vec!["start:app", "smoke", "stop:app"]);
}
