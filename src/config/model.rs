// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::engine::Pipeline;
use crate::exec::{CommandBuildAction, CommandRunAction, CommandSpec};
use crate::watch::ExcludeSet;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [watch]
/// dir = "."
/// interval = "500ms"
/// exclude = ["target/**"]
///
/// [[pre]]
/// cmd = "go"
/// args = ["build", "-o", "app", "."]
///
/// [run]
/// cmd = "./app"
///
/// [[post]]
/// cmd = "curl -sf localhost:8080/health"
/// shell = true
/// ```
///
/// All sections are optional, but at least one action must be configured.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// `[watch]` section.
    #[serde(default)]
    pub watch: WatchSection,

    /// `[[pre]]` build steps, in order.
    #[serde(default)]
    pub pre: Vec<ActionConfig>,

    /// `[run]` application.
    #[serde(default)]
    pub run: Option<ActionConfig>,

    /// `[[post]]` build steps, in order.
    #[serde(default)]
    pub post: Vec<ActionConfig>,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Root of the tree to poll.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Delay between scans, e.g. `"500ms"` or `"2s"`.
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Glob patterns (relative to `dir`) ignored by the scan.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_interval() -> String {
    "500ms".to_string()
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            interval: default_interval(),
            exclude: Vec::new(),
        }
    }
}

/// One `[[pre]]`, `[run]` or `[[post]]` entry.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ActionConfig {
    /// Program to execute, or a full command line when `shell = true`.
    pub cmd: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Run `cmd` through the platform shell.
    #[serde(default)]
    pub shell: bool,
}

impl ActionConfig {
    pub fn new<I, S>(cmd: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cmd: cmd.into(),
            args: args.into_iter().map(Into::into).collect(),
            shell: false,
        }
    }

    pub fn shell(line: impl Into<String>) -> Self {
        Self {
            cmd: line.into(),
            args: Vec::new(),
            shell: true,
        }
    }

    pub fn spec(&self) -> CommandSpec {
        if self.shell {
            CommandSpec::shell(&self.cmd)
        } else {
            CommandSpec::new(&self.cmd, self.args.iter().cloned())
        }
    }
}

/// Validated configuration. Construct it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub watch: WatchSection,
    pub pre: Vec<ActionConfig>,
    pub run: Option<ActionConfig>,
    pub post: Vec<ActionConfig>,
    interval: Duration,
    exclude: ExcludeSet,
}

impl ConfigFile {
    /// Only called after validation succeeded.
    pub(crate) fn new_unchecked(raw: RawConfigFile, interval: Duration, exclude: ExcludeSet) -> Self {
        Self {
            watch: raw.watch,
            pre: raw.pre,
            run: raw.run,
            post: raw.post,
            interval,
            exclude,
        }
    }

    pub fn watch_dir(&self) -> &PathBuf {
        &self.watch.dir
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn exclude(&self) -> &ExcludeSet {
        &self.exclude
    }

    /// Build the command pipeline described by this config.
    pub fn pipeline(&self) -> Pipeline {
        let mut pipeline = Pipeline::new();
        for action in &self.pre {
            pipeline.push_pre(Box::new(CommandBuildAction::new(action.spec())));
        }
        if let Some(run) = &self.run {
            pipeline.set_run(Some(Box::new(CommandRunAction::new(run.spec()))));
        }
        for action in &self.post {
            pipeline.push_post(Box::new(CommandBuildAction::new(action.spec())));
        }
        pipeline
    }
}
