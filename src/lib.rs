//! Cycle-based simulator for the `top` module
//!
//! `top` registers `output_data` on the rising edge of `clk`: synchronous reset,
//! otherwise a range-dependent transform of `input_data`. Every execution of the
//! sequential block is recorded in an 11-point line/branch coverage bank.
//!
//! This is a pure Rust library with C ABI exports.
//!
//! The module is organized as:
//! - signal.rs: Port table with width masking
//! - trigger.rs: Edge memory and trigger vector (active region)
//! - evaluator.rs: The sequential block (NBA region) and its branch table
//! - coverage.rs: Counter bank, cover-point annotations, snapshots
//! - core.rs: `TopSimulator`, which owns all of the above and drives steps
//! - ffi.rs: C ABI function exports

pub mod core;
pub mod coverage;
pub mod error;
pub mod evaluator;
mod ffi;
pub mod signal;
pub mod trigger;

pub use crate::core::{StepOutcome, TopSimulator};
pub use coverage::{CoverMeta, CoverPoint, CoverageBank, CoverageSnapshot};
pub use error::{Result, SimError};
pub use evaluator::BranchId;
pub use trigger::{detect, Edge, TriggerDetector, TriggerVector};

// Re-export FFI functions at crate root for easier linking
pub use ffi::*;
