// src/config/validate.rs

use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{ActionConfig, ConfigFile, RawConfigFile};
use crate::errors::{HotlapError, Result};
use crate::watch::ExcludeSet;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::HotlapError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_actions(&raw)?;
        validate_actions(&raw)?;
        let interval = validate_interval(&raw.watch.interval)?;
        let exclude = validate_exclude(&raw.watch.exclude)?;
        Ok(ConfigFile::new_unchecked(raw, interval, exclude))
    }
}

fn ensure_has_actions(cfg: &RawConfigFile) -> Result<()> {
    if cfg.pre.is_empty() && cfg.run.is_none() && cfg.post.is_empty() {
        return Err(HotlapError::ConfigError(
            "config must contain at least one [[pre]], [run] or [[post]] action".to_string(),
        ));
    }
    Ok(())
}

fn validate_actions(cfg: &RawConfigFile) -> Result<()> {
    for (index, action) in cfg.pre.iter().enumerate() {
        validate_action(&format!("pre[{index}]"), action)?;
    }
    if let Some(run) = &cfg.run {
        validate_action("run", run)?;
    }
    for (index, action) in cfg.post.iter().enumerate() {
        validate_action(&format!("post[{index}]"), action)?;
    }
    Ok(())
}

fn validate_action(label: &str, action: &ActionConfig) -> Result<()> {
    if action.cmd.trim().is_empty() {
        return Err(HotlapError::ConfigError(format!(
            "{label}: `cmd` must not be empty"
        )));
    }
    if action.shell && !action.args.is_empty() {
        return Err(HotlapError::ConfigError(format!(
            "{label}: `args` cannot be combined with `shell = true`; put the full command line in `cmd`"
        )));
    }
    Ok(())
}

fn validate_interval(raw: &str) -> Result<Duration> {
    let interval = parse_duration(raw)
        .map_err(|e| HotlapError::ConfigError(format!("[watch].interval: {e}")))?;
    if interval.is_zero() {
        return Err(HotlapError::ConfigError(
            "[watch].interval must be greater than zero".to_string(),
        ));
    }
    Ok(interval)
}

fn validate_exclude(patterns: &[String]) -> Result<ExcludeSet> {
    ExcludeSet::build(patterns)
        .map_err(|e| HotlapError::ConfigError(format!("[watch].exclude: {e:#}")))
}
