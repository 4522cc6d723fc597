//! Level-by-level density shaving.
//!
//! Prune groups are revealed in order. After each group the flow state is
//! clustered and the level is kept only when it clusters a new number of
//! points. Shaving stops once the clustered fraction reaches
//! `1 - min_shave`, and the retained levels are stacked into a
//! [`LabelMatrix`] with the coarsest level first.

mod label_matrix;

use tracing::{debug, info, instrument};

use crate::{
    Result,
    flow::FlowState,
    graph::SimilarityGraph,
    level::{ClusterPolicy, LevelClusters, cluster_level},
    schedule::ShaveSchedule,
};

pub use self::label_matrix::LabelMatrix;

/// Parameters that drive the shaving loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelConfig {
    min_flow: f64,
    shave_rate: f64,
    min_shave: f64,
    policy: ClusterPolicy,
}

impl LevelConfig {
    /// Bundles the shaving parameters. Ranges are validated by
    /// [`crate::GraphHdsBuilder`].
    #[must_use]
    pub const fn new(min_flow: f64, shave_rate: f64, min_shave: f64, policy: ClusterPolicy) -> Self {
        Self {
            min_flow,
            shave_rate,
            min_shave,
            policy,
        }
    }

    /// Density threshold for nodes and pairs.
    #[rustfmt::skip]
    #[must_use]
    pub const fn min_flow(&self) -> f64 { self.min_flow }

    /// Fraction of edges shaved per level.
    #[rustfmt::skip]
    #[must_use]
    pub const fn shave_rate(&self) -> f64 { self.shave_rate }

    /// Fraction of points that may stay unclustered at the final level.
    #[rustfmt::skip]
    #[must_use]
    pub const fn min_shave(&self) -> f64 { self.min_shave }

    /// Flood-fill policy.
    #[rustfmt::skip]
    #[must_use]
    pub const fn policy(&self) -> ClusterPolicy { self.policy }
}

/// What happened to a computed level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelOutcome {
    /// The level clustered a new number of points and was kept.
    Retained,
    /// The level clustered as many points as the level before it.
    Redundant,
    /// The level clustered nothing.
    Empty,
}

/// Diagnostics for one computed shave level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelSummary {
    /// Shave level number; the first computed level has the highest number.
    pub level: usize,
    /// Edges revealed up to and including this level.
    pub edges_kept: usize,
    /// Nodes assigned to any cluster.
    pub points_clustered: usize,
    /// Cluster sizes in label order.
    pub cluster_sizes: Vec<usize>,
    /// Whether the level entered the hierarchy.
    pub outcome: LevelOutcome,
}

impl LevelSummary {
    /// Number of clusters found at this level.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.cluster_sizes.len()
    }
}

/// Retained levels and the diagnostics of every computed level.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelHierarchy {
    matrix: LabelMatrix,
    summaries: Vec<LevelSummary>,
}

impl LevelHierarchy {
    /// The level-local label matrix, coarsest row first.
    #[must_use]
    pub fn matrix(&self) -> &LabelMatrix {
        &self.matrix
    }

    /// Diagnostics in computation order.
    #[must_use]
    pub fn summaries(&self) -> &[LevelSummary] {
        &self.summaries
    }

    /// Number of computed levels that were skipped as redundant or empty.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.summaries
            .iter()
            .filter(|summary| summary.outcome != LevelOutcome::Retained)
            .count()
    }

    /// Splits into the matrix and the level diagnostics.
    #[must_use]
    pub fn into_parts(self) -> (LabelMatrix, Vec<LevelSummary>) {
        (self.matrix, self.summaries)
    }
}

/// Runs the shaving loop over `graph`.
///
/// # Errors
/// Propagates [`crate::GraphHdsError::FloodFillInvariant`] from the level
/// clusterer.
///
/// # Examples
/// ```
/// use graphhds_core::{ClusterPolicy, GraphBuilder, LevelConfig, build_levels};
///
/// let mut builder = GraphBuilder::new("triangle");
/// builder.add_record(0, [(1, 0.9), (2, 0.9)])?;
/// builder.add_record(1, [(2, 0.9)])?;
/// let graph = builder.build()?;
///
/// let config = LevelConfig::new(1.0, 0.5, 0.0, ClusterPolicy::Node);
/// let levels = build_levels(&graph, &config)?;
/// assert_eq!(levels.matrix().row(0), &[1, 1, 1]);
/// # Ok::<(), graphhds_core::GraphHdsError>(())
/// ```
#[instrument(
    name = "core.build_levels",
    err,
    skip(graph, config),
    fields(
        graph = graph.name(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        policy = config.policy().as_str(),
    ),
)]
pub fn build_levels(graph: &SimilarityGraph, config: &LevelConfig) -> Result<LevelHierarchy> {
    let schedule = ShaveSchedule::compute(graph, config.shave_rate());
    let nodes = graph.node_count();
    let level_count = schedule.len();

    let mut flow = FlowState::new(graph, config.min_flow());
    let mut retained: Vec<LevelClusters> = Vec::new();
    let mut summaries = Vec::with_capacity(level_count);
    let mut previous: Option<usize> = None;
    let mut edges_kept = 0;

    for (index, group) in schedule.groups().iter().enumerate() {
        let reveal = flow.reveal(graph, group);
        edges_kept += reveal.edges_revealed;
        let clusters = cluster_level(config.policy(), &flow, graph)?;
        let points = clusters.clustered_points();

        let outcome = if previous == Some(points) {
            LevelOutcome::Redundant
        } else if points == 0 {
            LevelOutcome::Empty
        } else {
            LevelOutcome::Retained
        };
        previous = Some(points);

        let summary = LevelSummary {
            level: level_count - index,
            edges_kept,
            points_clustered: points,
            cluster_sizes: clusters.sizes(),
            outcome,
        };
        debug!(
            level = summary.level,
            threshold = group.threshold(),
            newly_dense = reveal.newly_dense,
            dense = flow.dense_count(),
            "revealed prune group"
        );
        info!(
            level = summary.level,
            edges_kept,
            points_clustered = points,
            clusters = summary.cluster_count(),
            outcome = ?outcome,
            "computed shave level"
        );
        summaries.push(summary);
        if outcome == LevelOutcome::Retained {
            retained.push(clusters);
        }

        #[expect(
            clippy::cast_precision_loss,
            reason = "node counts stay far below 2^52"
        )]
        let fraction = points as f64 / nodes as f64;
        if fraction >= 1.0 - config.min_shave() {
            info!(fraction, "clustered the target fraction of points");
            break;
        }
    }

    let mut matrix = LabelMatrix::zeroed(retained.len() + usize::from(config.min_shave() > 0.0), nodes);
    let rows = matrix.rows();
    if config.min_shave() > 0.0 {
        matrix.row_mut(0).fill(1);
    }
    for (offset, clusters) in retained.iter().enumerate() {
        let row = matrix.row_mut(rows - 1 - offset);
        for (label, members) in clusters.iter() {
            for &node in members {
                row[node] = label;
            }
        }
    }

    Ok(LevelHierarchy { matrix, summaries })
}
