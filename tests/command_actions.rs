// tests/command_actions.rs
//
// These spawn real processes through `sh`, so they only run on unix.
#![cfg(unix)]

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::time::Duration;

use tempfile::TempDir;

use hotlap::engine::Pipeline;
use hotlap::errors::{PipelineError, StepFailure};
use hotlap::exec::{BuildAction, CommandBuildAction, CommandRunAction, CommandSpec, RunAction};
use hotlap_test_utils::with_timeout;

type TestResult = Result<(), Box<dyn Error>>;

fn process_alive(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[tokio::test]
async fn successful_build_step() -> TestResult {
    init_tracing();
    let step = CommandBuildAction::new(CommandSpec::new("true", Vec::<String>::new()));
    step.execute().await?;
    Ok(())
}

#[tokio::test]
async fn nonzero_exit_is_a_build_failure() {
    init_tracing();
    let step = CommandBuildAction::new(CommandSpec::shell("exit 3"));

    let err = step.execute().await.expect_err("exit 3 fails");
    assert_eq!(err.command, "exit 3");
    match err.failure {
        StepFailure::Exit(status) => assert_eq!(status.code(), Some(3)),
        other => panic!("expected Exit, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_program_is_a_launch_failure() {
    init_tracing();
    let step = CommandBuildAction::new(CommandSpec::new(
        "hotlap-definitely-not-a-real-program",
        ["--flag"],
    ));

    let err = step.execute().await.expect_err("launch fails");
    assert_eq!(err.command, "hotlap-definitely-not-a-real-program --flag");
    assert!(matches!(err.failure, StepFailure::Launch(_)));
    assert!(err.to_string().starts_with("\"hotlap-definitely-not-a-real-program --flag\""));
}

#[tokio::test]
async fn build_step_args_are_passed_verbatim() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let out = dir.path().join("out.txt");
    let step = CommandBuildAction::new(CommandSpec::new(
        "sh",
        ["-c", "printf '%s' \"$1\" > \"$2\"", "sh", "two words", out.to_str().unwrap()],
    ));

    step.execute().await?;
    assert_eq!(std::fs::read_to_string(&out)?, "two words");
    Ok(())
}

#[tokio::test]
async fn started_app_is_killed_by_its_stop_handle() -> TestResult {
    init_tracing();
    let run = CommandRunAction::new(CommandSpec::new("sleep", ["30"]));

    let handle = run.spawn()?;
    let pid = handle.id().expect("pid of a live child");
    assert!(process_alive(pid));

    with_timeout(handle.kill()).await;
    assert!(!process_alive(pid));
    Ok(())
}

#[tokio::test]
async fn run_action_start_returns_while_app_keeps_running() -> TestResult {
    init_tracing();
    let run = CommandRunAction::new(CommandSpec::new("sleep", ["30"]));

    // `start` must not wait for the 30s sleep.
    let stop = with_timeout(run.start()).await?;
    with_timeout(stop.stop()).await;
    Ok(())
}

#[tokio::test]
async fn missing_app_program_fails_to_start() {
    init_tracing();
    let run = CommandRunAction::new(CommandSpec::new(
        "hotlap-definitely-not-a-real-program",
        Vec::<String>::new(),
    ));

    let err = run.start().await.expect_err("launch fails");
    assert!(matches!(err.failure, StepFailure::Launch(_)));
}

#[tokio::test]
async fn post_failure_kills_the_real_app() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let pidfile = dir.path().join("app.pid");

    let pipeline = Pipeline::new()
        .with_pre(CommandBuildAction::new(CommandSpec::new("true", Vec::<String>::new())))
        .with_run(CommandRunAction::new(CommandSpec::shell(format!(
            "echo $$ > '{}'; exec sleep 30",
            pidfile.display()
        ))))
        .with_post(CommandBuildAction::new(CommandSpec::shell("sleep 0.5; exit 1")));

    let err = with_timeout(pipeline.execute())
        .await
        .expect_err("post step fails");
    assert!(matches!(err, PipelineError::PostBuild { index: 0, .. }));

    let pid: u32 = std::fs::read_to_string(&pidfile)
        .expect("app wrote its pid")
        .trim()
        .parse()
        .expect("numeric pid");
    assert!(!process_alive(pid), "app {pid} still running after post failure");
}

#[tokio::test]
async fn stopping_a_shell_app_also_kills_what_it_started() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let after = dir.path().join("after");

    // Neither command is the shell's last one, so `sh` forks for both.
    let run = CommandRunAction::new(CommandSpec::shell(format!(
        "sh -c 'sleep 1; touch \"{}\"'; true",
        after.display()
    )));

    let stop = with_timeout(run.start()).await?;
    tokio::time::sleep(Duration::from_millis(200)).await;
    with_timeout(stop.stop()).await;

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!after.exists(), "child of the shell app outlived stop()");
    Ok(())
}

#[tokio::test]
async fn background_job_is_killed_after_the_shell_exits() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let after = dir.path().join("after");

    let run = CommandRunAction::new(CommandSpec::shell(format!(
        "(sleep 1; touch '{}') &",
        after.display()
    )));

    let stop = with_timeout(run.start()).await?;
    tokio::time::sleep(Duration::from_millis(200)).await;
    with_timeout(stop.stop()).await;

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!after.exists(), "background job outlived stop()");
    Ok(())
}

#[tokio::test]
async fn successful_pipeline_hands_back_a_working_stop_handle() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let marker = dir.path().join("built");

    let pipeline = Pipeline::new()
        .with_pre(CommandBuildAction::new(CommandSpec::shell(format!(
            "touch '{}'",
            marker.display()
        ))))
        .with_run(CommandRunAction::new(CommandSpec::new("sleep", ["30"])))
        .with_post(CommandBuildAction::new(CommandSpec::new("true", Vec::<String>::new())));

    let stop = with_timeout(pipeline.execute()).await?.expect("a live app");
    assert!(marker.exists());

    tokio::time::timeout(Duration::from_secs(5), stop.stop()).await?;
    Ok(())
}
