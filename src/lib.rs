// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{
    default_config_path, load_from_path, load_if_present, ActionConfig, ConfigFile,
    RawConfigFile,
};
use crate::engine::{StepOutcome, Supervisor};
use crate::errors::HotlapError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::ChangeDetector;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + CLI overrides
/// - change detector + pipeline
/// - the supervisor loop (or a single run with `--once`)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = resolve_config(&args)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let root = watch_root(fs.as_ref(), cfg.watch_dir())?;
    let detector = ChangeDetector::new(fs).with_exclude(cfg.exclude().clone());
    let mut supervisor = Supervisor::new(root, cfg.interval(), detector, cfg.pipeline());

    if args.once {
        return run_once(&mut supervisor).await;
    }

    supervisor.run(shutdown_signal()).await;
    Ok(())
}

/// Load the config file (if any) and apply command-line overrides.
///
/// An explicit `--config` must exist; the default `Hotlap.toml` may be
/// absent, in which case the pipeline comes from the command line alone.
pub fn resolve_config(args: &CliArgs) -> Result<ConfigFile> {
    let raw = match &args.config {
        Some(path) => {
            load_from_path(path).with_context(|| format!("loading config {:?}", path))?
        }
        None => {
            let path = default_config_path();
            match load_if_present(&path)
                .with_context(|| format!("loading config {:?}", path))?
            {
                Some(raw) => raw,
                None => {
                    debug!(path = ?path, "no config file; using command-line settings only");
                    RawConfigFile::default()
                }
            }
        }
    };

    let raw = apply_overrides(raw, args);
    let cfg = ConfigFile::try_from(raw)?;
    Ok(cfg)
}

fn apply_overrides(mut raw: RawConfigFile, args: &CliArgs) -> RawConfigFile {
    if let Some(dir) = &args.dir {
        raw.watch.dir = dir.clone();
    }
    if let Some(interval) = &args.interval {
        raw.watch.interval = interval.clone();
    }
    if let Some((program, rest)) = args.command.split_first() {
        if raw.run.is_some() {
            debug!("command-line app command replaces [run]");
        }
        raw.run = Some(ActionConfig::new(program.clone(), rest.iter().cloned()));
    }
    raw
}

/// The watch directory must exist up front; later scan errors are tolerated.
fn watch_root(fs: &dyn FileSystem, dir: &Path) -> Result<PathBuf> {
    if !fs.is_dir(dir) {
        return Err(HotlapError::ConfigError(format!(
            "watch directory {:?} does not exist or is not a directory",
            dir
        ))
        .into());
    }
    Ok(fs.canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf()))
}

/// `--once`: a single pipeline attempt, then hold the app until Ctrl-C.
async fn run_once(supervisor: &mut Supervisor) -> Result<()> {
    match supervisor.run_once().await {
        StepOutcome::Failed(err) => Err(anyhow!(err)),
        StepOutcome::Rebuilt { running: false } | StepOutcome::Unchanged => Ok(()),
        StepOutcome::Rebuilt { running: true } => {
            info!("app running; press Ctrl-C to stop");
            shutdown_signal().await;
            supervisor.shutdown().await;
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        // Without a signal handler, never resolve; the process is ended
        // externally.
        std::future::pending::<()>().await;
    }
}

/// Simple dry-run output: print watch settings and the pipeline.
fn print_dry_run(cfg: &ConfigFile) {
    println!("hotlap dry-run");
    println!("  watch.dir = {}", cfg.watch_dir().display());
    println!("  watch.interval = {:?}", cfg.interval());
    if !cfg.exclude().is_empty() {
        println!("  watch.exclude = {:?}", cfg.exclude().patterns());
    }
    println!();

    let pipeline = cfg.pipeline();

    println!("pre ({}):", cfg.pre.len());
    for step in pipeline.pre_descriptions() {
        println!("  - {step}");
    }
    match pipeline.run_description() {
        Some(run) => println!("run: {run}"),
        None => println!("run: (none)"),
    }
    println!("post ({}):", cfg.post.len());
    for step in pipeline.post_descriptions() {
        println!("  - {step}");
    }

    debug!("dry-run complete (no execution)");
}
