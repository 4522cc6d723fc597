//! Benchmark setup error type.
//!
//! Aggregates failures from graph generation and the core pipeline so that
//! setup functions can propagate them with `?`.

use graphhds_core::GraphHdsError;

use crate::source::SyntheticError;

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic graph generation failed.
    #[error("synthetic graph generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// A pipeline stage rejected its input.
    #[error("graph HDS operation failed: {0}")]
    Core(#[from] GraphHdsError),
}
