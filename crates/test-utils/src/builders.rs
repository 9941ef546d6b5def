#![allow(dead_code)]

use std::path::PathBuf;

use hotlap::config::{ActionConfig, ConfigFile, RawConfigFile};
use hotlap::engine::Pipeline;
use hotlap::exec::{BuildAction, RunAction};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn watch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.watch.dir = dir.into();
        self
    }

    pub fn interval(mut self, interval: &str) -> Self {
        self.config.watch.interval = interval.to_string();
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn pre(mut self, cmd: &str, args: &[&str]) -> Self {
        self.config.pre.push(ActionConfig::new(cmd, args.iter().copied()));
        self
    }

    pub fn run(mut self, cmd: &str, args: &[&str]) -> Self {
        self.config.run = Some(ActionConfig::new(cmd, args.iter().copied()));
        self
    }

    pub fn post(mut self, cmd: &str, args: &[&str]) -> Self {
        self.config.post.push(ActionConfig::new(cmd, args.iter().copied()));
        self
    }

    pub fn post_shell(mut self, line: &str) -> Self {
        self.config.post.push(ActionConfig::shell(line));
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble a pipeline from already-built actions.
pub fn pipeline_of<B, R>(pre: Vec<B>, run: Option<R>, post: Vec<B>) -> Pipeline
where
    B: BuildAction + 'static,
    R: RunAction + 'static,
{
    let mut pipeline = Pipeline::new();
    for step in pre {
        pipeline.push_pre(Box::new(step));
    }
    pipeline.set_run(run.map(|r| Box::new(r) as Box<dyn RunAction>));
    for step in post {
        pipeline.push_post(Box::new(step));
    }
    pipeline
}
