//! Errors raised while generating synthetic graphs.

use graphhds_core::GraphHdsError;

/// Synthetic graph generation failures.
#[derive(Debug, thiserror::Error)]
pub enum SyntheticError {
    /// A count that must be positive was zero.
    #[error("expected a non-zero value for {context}")]
    ZeroValue {
        /// Parameter name.
        context: &'static str,
    },
    /// Communities need at least two nodes to hold an edge.
    #[error("community size must be at least 2, got {size}")]
    CommunityTooSmall {
        /// Requested size.
        size: usize,
    },
    /// A probability was outside `[0, 1]`.
    #[error("{parameter} must lie in [0, 1], got {value}")]
    InvalidProbability {
        /// Parameter name.
        parameter: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// The node count does not fit the id types.
    #[error("node count overflows")]
    Overflow,
    /// The generated records were rejected by the graph builder.
    #[error(transparent)]
    Graph(#[from] GraphHdsError),
}
