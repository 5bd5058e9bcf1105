//! Errors raised at the named-signal and configuration boundaries.
//!
//! Evaluation itself is total: every input combination has a defined next state,
//! so nothing in the trigger/NBA path returns a `Result`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Unknown signal: {0}")]
    UnknownSignal(String),

    #[error("Signal {0} is not an input port")]
    NotAnInput(String),

    #[error("Invalid coverage table: {0}")]
    CoverageConfig(String),

    #[error("Coverage invariant violated: {0}")]
    CoverageInvariant(String),

    #[error("Coverage metadata does not match; snapshots come from different designs")]
    MetadataMismatch,

    #[error("Failed to parse coverage JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
