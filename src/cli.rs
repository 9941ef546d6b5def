// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `hotlap`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "hotlap",
    version,
    about = "Rebuild and restart an app whenever files in a directory change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If omitted, `Hotlap.toml` in the current directory is used when it
    /// exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory to watch. Overrides `[watch].dir`.
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Scan interval such as `500ms` or `2s`. Overrides `[watch].interval`.
    #[arg(long, value_name = "DURATION")]
    pub interval: Option<String>,

    /// Run the pipeline once, keep the app up until Ctrl-C, no watching.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HOTLAP_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the pipeline, but don't execute any commands.
    #[arg(long)]
    pub dry_run: bool,

    /// App command and arguments. Overrides `[run]`.
    #[arg(last = true, value_name = "RUN_CMD")]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
