// src/engine/mod.rs

//! Orchestration engine for hotlap.
//!
//! This module ties together:
//! - the pre / run / post [`pipeline`]
//! - the supervisor state ([`core`]) and its polling loop ([`supervisor`])
//! - the [`clock`] the loop reads its watermarks from
//!
//! The state is plain data; all IO (scanning, processes, sleeping) happens
//! in the supervisor loop.

pub mod clock;
pub mod core;
pub mod pipeline;
pub mod supervisor;

pub use clock::{Clock, SystemClock};
pub use core::{Phase, SupervisorState};
pub use pipeline::{run_pipeline, Pipeline};
pub use supervisor::{StepOutcome, Supervisor};
