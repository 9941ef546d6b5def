// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - [`model`] holds the serde types for `Hotlap.toml`.
//! - [`loader`] reads and parses the file.
//! - [`validate`] turns a `RawConfigFile` into a checked `ConfigFile`.

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{default_config_path, load_and_validate, load_from_path, load_if_present};
pub use model::{ActionConfig, ConfigFile, RawConfigFile, WatchSection};
