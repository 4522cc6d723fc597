//! Error types for the graphhds core library.
//!
//! Configuration problems, graph-loading failures, and hierarchy invariant
//! violations are all fatal. Each enum exposes a stable machine-readable code
//! so callers can log or match on failures without parsing messages.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::result::ClusterId;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while assembling a [`crate::SimilarityGraph`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
    /// The graph contained no nodes.
    #[error("graph contains no nodes")]
    EmptyGraph,
    /// An edge carried a NaN or infinite similarity.
    #[error("edge ({left}, {right}) has non-finite weight {weight}")]
    NonFiniteEdgeWeight {
        /// External id of the record that declared the edge.
        left: u64,
        /// External id of the neighbour.
        right: u64,
        /// Offending similarity value.
        weight: f64,
    },
    /// Node weights were requested but a graph node had no weight entry.
    #[error("node {node} has no weight entry in the node mapping")]
    MissingNodeWeight {
        /// External id of the node without a weight.
        node: u64,
    },
    /// A node weight was negative or non-finite after rescaling.
    #[error("node {node} has invalid weight {weight} after rescaling")]
    InvalidNodeWeight {
        /// External id of the node.
        node: u64,
        /// The rescaled weight.
        weight: f64,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// The graph contained no nodes.
        EmptyGraph => EmptyGraph => "GRAPH_EMPTY",
        /// An edge carried a NaN or infinite similarity.
        NonFiniteEdgeWeight => NonFiniteEdgeWeight { .. } => "GRAPH_NON_FINITE_EDGE_WEIGHT",
        /// A graph node had no weight entry.
        MissingNodeWeight => MissingNodeWeight { .. } => "GRAPH_MISSING_NODE_WEIGHT",
        /// A node weight was invalid after rescaling.
        InvalidNodeWeight => InvalidNodeWeight { .. } => "GRAPH_INVALID_NODE_WEIGHT",
    }
}

/// Error type produced when configuring or running [`crate::GraphHds`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphHdsError {
    /// `min_flow` must be finite and non-negative.
    #[error("min_flow must be a finite value >= 0 (got {got})")]
    InvalidMinFlow {
        /// The rejected value.
        got: f64,
    },
    /// `shave_rate` must lie in `(0, 1]`.
    #[error("shave_rate must lie in (0, 1] (got {got})")]
    InvalidShaveRate {
        /// The rejected value.
        got: f64,
    },
    /// `min_shave` must lie in `[0, 1)`.
    #[error("min_shave must lie in [0, 1) (got {got})")]
    InvalidMinShave {
        /// The rejected value.
        got: f64,
    },
    /// `min_stability` must not be NaN.
    #[error("min_stability must not be NaN")]
    InvalidMinStability,
    /// Loading or normalising the input graph failed.
    #[error("graph `{graph}` is invalid: {error}")]
    Graph {
        /// Name of the offending graph.
        graph: Arc<str>,
        /// Underlying graph error.
        #[source]
        error: GraphError,
    },
    /// The flood fill reached a node whose label has no member set.
    #[error("flood fill invariant violated: node {node} carries label {label} with no member set")]
    FloodFillInvariant {
        /// Internal index of the node.
        node: usize,
        /// The dangling level-local label.
        label: u32,
    },
    /// Two hierarchy clusters overlap without one containing the other.
    #[error("clusters {left} and {right} overlap but neither contains the other")]
    PartialOverlap {
        /// First cluster of the offending pair.
        left: ClusterId,
        /// Second cluster of the offending pair.
        right: ClusterId,
    },
    /// A cluster handed to the deduper had no stability score.
    #[error("cluster {cluster} has no stability score")]
    MissingStability {
        /// Cluster without a score.
        cluster: ClusterId,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphHdsError`] variants.
    enum GraphHdsErrorCode for GraphHdsError {
        /// `min_flow` must be finite and non-negative.
        InvalidMinFlow => InvalidMinFlow { .. } => "GRAPHHDS_INVALID_MIN_FLOW",
        /// `shave_rate` must lie in `(0, 1]`.
        InvalidShaveRate => InvalidShaveRate { .. } => "GRAPHHDS_INVALID_SHAVE_RATE",
        /// `min_shave` must lie in `[0, 1)`.
        InvalidMinShave => InvalidMinShave { .. } => "GRAPHHDS_INVALID_MIN_SHAVE",
        /// `min_stability` must not be NaN.
        InvalidMinStability => InvalidMinStability => "GRAPHHDS_INVALID_MIN_STABILITY",
        /// Loading or normalising the input graph failed.
        GraphFailure => Graph { .. } => "GRAPHHDS_GRAPH_FAILURE",
        /// The flood fill reached an impossible labelling state.
        FloodFillInvariant => FloodFillInvariant { .. } => "GRAPHHDS_FLOOD_FILL_INVARIANT",
        /// Two hierarchy clusters partially overlap.
        PartialOverlap => PartialOverlap { .. } => "GRAPHHDS_PARTIAL_OVERLAP",
        /// A cluster handed to the deduper had no stability score.
        MissingStability => MissingStability { .. } => "GRAPHHDS_MISSING_STABILITY",
    }
}

impl GraphHdsError {
    /// Retrieve the inner [`GraphErrorCode`] when the error originated while
    /// loading the graph.
    #[must_use]
    pub const fn graph_code(&self) -> Option<GraphErrorCode> {
        match self {
            Self::Graph { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    /// Returns `true` for failures that indicate a logic defect rather than
    /// bad input or configuration.
    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::FloodFillInvariant { .. } | Self::PartialOverlap { .. }
        )
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, GraphHdsError>;
