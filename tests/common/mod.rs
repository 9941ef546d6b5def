#![allow(dead_code)]

use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

pub use hotlap_test_utils::init_tracing;

/// `UNIX_EPOCH + secs`, for readable fixed timestamps.
pub fn secs(n: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(n)
}

/// Create (or overwrite) a file and pin its mtime, so tests never depend on
/// filesystem timestamp resolution.
pub fn write_file_at(path: &Path, contents: &str, modified: SystemTime) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("creating parent dirs");
    }
    fs::write(path, contents).expect("writing file");
    File::options()
        .write(true)
        .open(path)
        .and_then(|f| f.set_modified(modified))
        .expect("setting mtime");
}
