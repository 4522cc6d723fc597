//! Pipeline entry point tying the shaving, combining, and deduplication
//! stages together.

use tracing::{info, instrument};

use crate::{
    Result,
    dedup::ClusterDeduper,
    graph::SimilarityGraph,
    hierarchy::{LevelConfig, build_levels},
    level::ClusterPolicy,
    processor::{CombinedHierarchy, StabilityMeasure},
    result::HdsResult,
};

/// Validated runtime for graph HDS clustering.
///
/// Construct through [`crate::GraphHdsBuilder`].
///
/// # Examples
/// ```
/// use graphhds_core::{GraphBuilder, GraphHdsBuilder};
///
/// let mut builder = GraphBuilder::new("triangle-with-pair");
/// builder.add_record(0, [(1, 0.9), (2, 0.9)])?;
/// builder.add_record(1, [(2, 0.9)])?;
/// builder.add_record(3, [(4, 0.1)])?;
/// let graph = builder.build()?;
///
/// let hds = GraphHdsBuilder::new()
///     .with_min_flow(1.0)
///     .with_shave_rate(0.5)
///     .with_min_shave(0.0)
///     .build()?;
/// let result = hds.run(&graph)?;
/// let assignments = result.assignments();
/// assert_eq!(result.partition().len(), 1);
/// assert!(assignments[..3].iter().all(Option::is_some));
/// assert!(assignments[3..].iter().all(Option::is_none));
/// # Ok::<(), graphhds_core::GraphHdsError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GraphHds {
    levels: LevelConfig,
    min_stability: f64,
    stability_measure: StabilityMeasure,
}

impl GraphHds {
    pub(crate) fn new(
        levels: LevelConfig,
        min_stability: f64,
        stability_measure: StabilityMeasure,
    ) -> Self {
        Self {
            levels,
            min_stability,
            stability_measure,
        }
    }

    /// Shaving parameters handed to [`build_levels`].
    #[rustfmt::skip]
    #[must_use]
    pub fn level_config(&self) -> &LevelConfig { &self.levels }

    /// Density threshold for nodes and pairs.
    #[rustfmt::skip]
    #[must_use]
    pub fn min_flow(&self) -> f64 { self.levels.min_flow() }

    /// Fraction of edges shaved per level.
    #[rustfmt::skip]
    #[must_use]
    pub fn shave_rate(&self) -> f64 { self.levels.shave_rate() }

    /// Fraction of points that may stay unclustered.
    #[rustfmt::skip]
    #[must_use]
    pub fn min_shave(&self) -> f64 { self.levels.min_shave() }

    /// Flood-fill policy.
    #[rustfmt::skip]
    #[must_use]
    pub fn policy(&self) -> ClusterPolicy { self.levels.policy() }

    /// Stability below which clusters are excluded from the partition.
    #[rustfmt::skip]
    #[must_use]
    pub fn min_stability(&self) -> f64 { self.min_stability }

    /// Score used to rank clusters during deduplication.
    #[rustfmt::skip]
    #[must_use]
    pub fn stability_measure(&self) -> StabilityMeasure { self.stability_measure }

    /// Runs shaving, combination, scoring, and deduplication over `graph`.
    ///
    /// # Errors
    /// Returns [`crate::GraphHdsError::FloodFillInvariant`] or
    /// [`crate::GraphHdsError::PartialOverlap`] when an internal invariant is
    /// violated. Neither occurs for graphs built through
    /// [`crate::GraphBuilder`].
    #[instrument(
        name = "core.run",
        err,
        skip(self, graph),
        fields(
            graph = graph.name(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            min_flow = self.min_flow(),
            shave_rate = self.shave_rate(),
            measure = self.stability_measure.as_str(),
        ),
    )]
    pub fn run(&self, graph: &SimilarityGraph) -> Result<HdsResult> {
        let levels = build_levels(graph, &self.levels)?;
        let skipped = levels.skipped();
        let (matrix, summaries) = levels.into_parts();

        #[cfg(feature = "metrics")]
        {
            metrics::counter!("graphhds_levels_retained").increment(matrix.rows() as u64);
            metrics::counter!("graphhds_levels_skipped").increment(skipped as u64);
        }

        let hierarchy = CombinedHierarchy::combine(&matrix);
        let clusters = hierarchy.clusters();
        let mut stabilities = hierarchy.stability(self.stability_measure, graph);
        stabilities.retain(|id, _| clusters.contains_key(id));

        let partition = ClusterDeduper::new(&clusters, &stabilities)?.dedupe(self.min_stability)?;
        info!(
            retained = matrix.rows(),
            skipped,
            clusters = clusters.len(),
            selected = partition.len(),
            excluded = partition.excluded().len(),
            "graph HDS run complete"
        );

        Ok(HdsResult::new(summaries, hierarchy, stabilities, partition))
    }
}
