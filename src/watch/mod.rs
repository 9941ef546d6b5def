// src/watch/mod.rs

//! Change detection over the watch root.
//!
//! This module is responsible for:
//! - Walking the tree and comparing file mtimes to a watermark.
//! - Compiling the optional `exclude` glob patterns.
//!
//! It knows nothing about builds or processes; the supervisor decides what a
//! detected change means.

pub mod detector;
pub mod patterns;

pub use detector::{ChangeDetector, ScanReport};
pub use patterns::ExcludeSet;
