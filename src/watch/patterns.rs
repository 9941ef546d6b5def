// src/watch/patterns.rs

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Compiled `[watch].exclude` glob patterns.
///
/// Patterns are evaluated against paths relative to the watch root, using `/`
/// as separator on every platform (e.g. `"target/debug/app"`). With the
/// default glob options `*` also crosses directory boundaries, so `"*.log"`
/// matches `"logs/today.log"`.
#[derive(Clone, Default)]
pub struct ExcludeSet {
    patterns: Vec<String>,
    set: Option<GlobSet>,
}

impl fmt::Debug for ExcludeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcludeSet")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl ExcludeSet {
    /// An exclude set that matches nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile the given glob patterns.
    pub fn build(patterns: &[String]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self::empty());
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern)
                .with_context(|| format!("invalid exclude pattern '{}'", pattern))?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .context("building exclude glob set")?;

        Ok(Self {
            patterns: patterns.to_vec(),
            set: Some(set),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_none()
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns true if `rel_path` (relative to the watch root) is excluded.
    pub fn is_excluded(&self, rel_path: &str) -> bool {
        match &self.set {
            Some(set) => set.is_match(rel_path),
            None => false,
        }
    }
}

/// Render `path` relative to `root` with `/` separators.
///
/// Returns `None` for the root itself or for paths outside of it.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    Some(rel.to_string_lossy().replace('\\', "/"))
}
