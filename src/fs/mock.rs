use super::{EntryKind, EntryMeta, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File {
        modified: SystemTime,
    },
    Dir {
        children: Vec<String>,
        modified: SystemTime,
    },
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    /// Paths whose metadata / listing calls fail, to simulate permission
    /// errors or entries vanishing mid-walk.
    broken: HashSet<PathBuf>,
}

/// In-memory filesystem with explicit mtimes.
///
/// Directories created implicitly get `UNIX_EPOCH` as their mtime so they
/// never look newer than any watermark.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut state = MockState::default();
        // Ensure root exists
        state.entries.insert(
            PathBuf::from("."),
            MockEntry::Dir {
                children: Vec::new(),
                modified: SystemTime::UNIX_EPOCH,
            },
        );

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Add (or overwrite) a file with the given modification time.
    pub fn add_file(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        state.entries.insert(
            path.clone(),
            MockEntry::File { modified },
        );
        link_into_parent(&mut state.entries, &path);
    }

    /// Create a directory (and its parents) with the given modification time.
    pub fn add_dir(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        match state.entries.get_mut(&path) {
            Some(MockEntry::Dir { modified: m, .. }) => *m = modified,
            _ => {
                state.entries.insert(
                    path.clone(),
                    MockEntry::Dir {
                        children: Vec::new(),
                        modified,
                    },
                );
            }
        }
        link_into_parent(&mut state.entries, &path);
    }

    /// Bump the mtime of an existing file. Returns false if it does not exist.
    pub fn touch(&self, path: impl AsRef<Path>, modified: SystemTime) -> bool {
        let mut state = self.state.lock().unwrap();
        match state.entries.get_mut(path.as_ref()) {
            Some(MockEntry::File { modified: m, .. }) => {
                *m = modified;
                true
            }
            _ => false,
        }
    }

    /// Make every metadata / read_dir call on `path` fail.
    pub fn break_path(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.broken.insert(path.as_ref().to_path_buf());
    }

    /// Remove a file from the tree but leave its name in the parent listing,
    /// which is what a file deleted between listing and stat looks like.
    pub fn vanish(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.entries.remove(path.as_ref());
    }

    fn check_broken(state: &MockState, path: &Path) -> Result<()> {
        if state.broken.contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        Ok(())
    }
}

fn parent_of(path: &Path) -> Option<&Path> {
    path.parent().map(|parent| {
        if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        }
    })
}

/// Register `path` in its parent's child list, creating parents as needed.
fn link_into_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let Some(parent) = parent_of(path) else {
        return;
    };
    // Avoid infinite loop at root
    if parent == path {
        return;
    }

    if !entries.contains_key(parent) {
        entries.insert(
            parent.to_path_buf(),
            MockEntry::Dir {
                children: Vec::new(),
                modified: SystemTime::UNIX_EPOCH,
            },
        );
        link_into_parent(entries, parent);
    }

    if let Some(MockEntry::Dir { children, .. }) = entries.get_mut(parent) {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        matches!(state.entries.get(path), Some(MockEntry::Dir { .. }))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        // In mock, we just return the path as is, assuming tests use stable paths
        Ok(path.to_path_buf())
    }

    fn metadata(&self, path: &Path) -> Result<EntryMeta> {
        let state = self.state.lock().unwrap();
        Self::check_broken(&state, path)?;
        match state.entries.get(path) {
            Some(MockEntry::File { modified }) => Ok(EntryMeta {
                kind: EntryKind::File,
                modified: *modified,
            }),
            Some(MockEntry::Dir { modified, .. }) => Ok(EntryMeta {
                kind: EntryKind::Dir,
                modified: *modified,
            }),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.state.lock().unwrap();
        Self::check_broken(&state, path)?;
        match state.entries.get(path) {
            Some(MockEntry::Dir { children, .. }) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
