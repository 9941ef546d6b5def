// src/watch/detector.rs

//! Polling change detection.
//!
//! A scan walks the whole tree below the watch root and asks one question:
//! does any regular file have an mtime strictly after the watermark? Nothing
//! is remembered between scans; the watermark held by the supervisor is the
//! only state.
//!
//! Entries that cannot be inspected are logged and skipped. A change missed
//! that way is picked up by a later scan as long as the file's mtime is still
//! after the watermark.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{debug, trace, warn};

use crate::errors::ScanError;
use crate::fs::{EntryKind, FileSystem};
use crate::watch::patterns::{relative_path, ExcludeSet};

/// Result of a single scan.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// First file found with an mtime after the watermark, if any.
    pub changed: Option<PathBuf>,
    /// Number of entries inspected (including directories).
    pub visited: usize,
    /// Entries that could not be inspected and were treated as unchanged.
    pub skipped: Vec<ScanError>,
}

impl ScanReport {
    pub fn is_changed(&self) -> bool {
        self.changed.is_some()
    }
}

/// Walks a directory tree looking for files modified after a timestamp.
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    fs: Arc<dyn FileSystem>,
    exclude: ExcludeSet,
}

impl ChangeDetector {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            exclude: ExcludeSet::empty(),
        }
    }

    /// Ignore files matching `exclude`, and do not descend into matching
    /// directories.
    pub fn with_exclude(mut self, exclude: ExcludeSet) -> Self {
        self.exclude = exclude;
        self
    }

    /// True if any regular file under `root` was modified after `since`.
    pub fn has_changed(&self, root: &Path, since: SystemTime) -> bool {
        self.scan(root, since).is_changed()
    }

    /// Walk `root` and report the first file modified after `since`.
    ///
    /// Stops at the first hit. Directory mtimes are never compared.
    pub fn scan(&self, root: &Path, since: SystemTime) -> ScanReport {
        let mut report = ScanReport::default();
        let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

        while let Some(path) = pending.pop() {
            let meta = match self.fs.metadata(&path) {
                Ok(meta) => meta,
                Err(source) => {
                    skip(&mut report, path, source);
                    continue;
                }
            };
            report.visited += 1;

            if let Some(rel) = relative_path(root, &path) {
                if self.exclude.is_excluded(&rel) {
                    trace!(path = %rel, "excluded from scan");
                    continue;
                }
            }

            match meta.kind {
                EntryKind::File => {
                    if meta.modified > since {
                        debug!(path = ?path, "file modified after watermark");
                        report.changed = Some(path);
                        return report;
                    }
                }
                EntryKind::Dir => match self.fs.read_dir(&path) {
                    Ok(children) => pending.extend(children),
                    Err(source) => skip(&mut report, path, source),
                },
                EntryKind::Other => {}
            }
        }

        report
    }
}

fn skip(report: &mut ScanReport, path: PathBuf, source: anyhow::Error) {
    let err = ScanError {
        path,
        source: source.into(),
    };
    warn!(error = %err, "skipping unreadable entry");
    report.skipped.push(err);
}
