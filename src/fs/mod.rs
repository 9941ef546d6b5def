// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing::warn;

pub mod mock;

/// What kind of entry a path refers to, without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks, sockets, devices. Never compared by the change detector.
    Other,
}

/// The subset of metadata the change detector looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    pub kind: EntryKind,
    pub modified: SystemTime,
}

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    fn is_dir(&self, path: &Path) -> bool;
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Metadata for `path` itself (symlinks are not followed).
    fn metadata(&self, path: &Path) -> Result<EntryMeta>;

    /// Return a list of entries in a directory.
    /// Returns full paths.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).with_context(|| format!("canonicalizing {:?}", path))
    }

    fn metadata(&self, path: &Path) -> Result<EntryMeta> {
        let meta = fs::symlink_metadata(path)
            .with_context(|| format!("reading metadata of {:?}", path))?;
        let file_type = meta.file_type();
        let kind = if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::Other
        };
        let modified = meta
            .modified()
            .with_context(|| format!("reading mtime of {:?}", path))?;
        Ok(EntryMeta { kind, modified })
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))?;
        Ok(readable_entries(path, entries.map(|e| e.map(|e| e.path()))))
    }
}

/// Keep the entries of a directory listing that could be read.
///
/// A failed entry is logged and dropped; the rest of the listing is kept.
pub fn readable_entries<I>(dir: &Path, entries: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = io::Result<PathBuf>>,
{
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(dir = ?dir, error = %e, "skipping unreadable directory entry");
                None
            }
        })
        .collect()
}
