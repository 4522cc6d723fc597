//! Geometric edge shaving schedule.
//!
//! Edges are revealed from the most to the least similar. The schedule keeps
//! a fraction `f` of the edges, starting at `1.0` and shrinking by
//! `1 - shave_rate` per step, and turns each fraction into a similarity
//! threshold. Every edge lands in exactly one prune group.

use tracing::debug;

use crate::graph::SimilarityGraph;

/// Edges revealed together at one shave level.
#[derive(Clone, Debug, PartialEq)]
pub struct PruneGroup {
    threshold: f64,
    edges: Vec<usize>,
}

impl PruneGroup {
    /// Lowest similarity admitted by this group's bucket.
    #[must_use]
    #[rustfmt::skip]
    pub const fn threshold(&self) -> f64 { self.threshold }

    /// Indices into [`SimilarityGraph::edges`], most similar first.
    #[must_use]
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    /// Number of edges in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` when the group carries no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Ordered prune groups for a graph.
///
/// # Examples
/// ```
/// use graphhds_core::{GraphBuilder, ShaveSchedule};
///
/// let mut builder = GraphBuilder::new("path");
/// builder.add_record(0, [(1, 0.9), (2, 0.5)])?;
/// builder.add_record(2, [(3, 0.1)])?;
/// let graph = builder.build()?;
///
/// let schedule = ShaveSchedule::compute(&graph, 0.5);
/// let total: usize = schedule.groups().iter().map(|g| g.len()).sum();
/// assert_eq!(total, graph.edge_count());
/// # Ok::<(), graphhds_core::GraphHdsError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ShaveSchedule {
    groups: Vec<PruneGroup>,
}

impl ShaveSchedule {
    /// Builds the schedule for `graph` at the given shave rate.
    ///
    /// `shave_rate` is expected to lie in `(0, 1]`; [`crate::GraphHdsBuilder`]
    /// validates it before a run.
    #[must_use]
    pub fn compute(graph: &SimilarityGraph, shave_rate: f64) -> Self {
        let edges = graph.edges();
        let mut order: Vec<usize> = (0..edges.len()).collect();
        order.sort_by(|&a, &b| edges[b].weight().total_cmp(&edges[a].weight()));

        let positions = percentile_positions(edges.len(), shave_rate);
        let mut thresholds: Vec<f64> = Vec::with_capacity(positions.len());
        for position in positions {
            let Some(weight) = order.get(position).map(|&edge| edges[edge].weight()) else {
                continue;
            };
            if thresholds.last() != Some(&weight) {
                thresholds.push(weight);
            }
        }

        let mut groups: Vec<PruneGroup> = thresholds
            .iter()
            .map(|&threshold| PruneGroup {
                threshold,
                edges: Vec::new(),
            })
            .collect();

        let last = groups.len().saturating_sub(1);
        let mut bucket = 0;
        for edge in order {
            let weight = edges[edge].weight();
            if bucket < last && weight < thresholds[bucket] {
                bucket += 1;
            }
            if let Some(group) = groups.get_mut(bucket) {
                group.edges.push(edge);
            }
        }

        debug!(
            graph = graph.name(),
            shave_rate,
            levels = groups.len(),
            "computed edge shave schedule"
        );
        Self { groups }
    }

    /// Prune groups in reveal order.
    #[must_use]
    pub fn groups(&self) -> &[PruneGroup] {
        &self.groups
    }

    /// Number of shave levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` when the graph has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Positions into the weight-descending edge list at which thresholds are
/// sampled, in ascending order.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "kept fractions are in [0, 1] so positions never exceed the edge count"
)]
pub(crate) fn percentile_positions(edge_count: usize, shave_rate: f64) -> Vec<usize> {
    let total = edge_count as f64;
    let mut kept = 1.0_f64;
    let mut positions: Vec<usize> = Vec::new();
    while (kept * total).floor() >= 1.0 {
        let position = (total * kept).round_ties_even() as usize - 1;
        if positions.last() != Some(&position) {
            positions.push(position);
        }
        kept *= 1.0 - shave_rate;
    }
    positions.reverse();
    positions
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::{graph::GraphBuilder, test_utils::proptest_config};

    fn graph_with_weights(weights: &[f64]) -> SimilarityGraph {
        let mut builder = GraphBuilder::new("star");
        builder
            .add_record(
                0,
                weights
                    .iter()
                    .enumerate()
                    .map(|(i, &w)| (i as u64 + 1, w)),
            )
            .expect("finite weights");
        builder.build().expect("graph must build")
    }

    #[rstest]
    #[case(10, 0.5, vec![0, 1, 4, 9])]
    #[case(4, 1.0, vec![3])]
    #[case(1, 0.05, vec![0])]
    #[case(0, 0.2, vec![])]
    fn samples_geometric_positions(
        #[case] edges: usize,
        #[case] rate: f64,
        #[case] expected: Vec<usize>,
    ) {
        assert_eq!(percentile_positions(edges, rate), expected);
    }

    #[test]
    fn single_level_when_rate_is_one() {
        let graph = graph_with_weights(&[0.9, 0.4, 0.2]);
        let schedule = ShaveSchedule::compute(&graph, 1.0);
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.groups()[0].edges(), &[0, 1, 2]);
    }

    #[test]
    fn collapses_equal_thresholds() {
        let graph = graph_with_weights(&[0.5; 6]);
        let schedule = ShaveSchedule::compute(&graph, 0.5);
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.groups()[0].len(), 6);
    }

    #[test]
    fn groups_reveal_most_similar_edges_first() {
        let graph = graph_with_weights(&[0.1, 0.9, 0.5, 0.7]);
        let schedule = ShaveSchedule::compute(&graph, 0.5);
        let thresholds: Vec<f64> = schedule.groups().iter().map(PruneGroup::threshold).collect();
        assert_eq!(thresholds, vec![0.9, 0.7, 0.1]);
        let groups: Vec<&[usize]> = schedule.groups().iter().map(PruneGroup::edges).collect();
        assert_eq!(groups, vec![&[1][..], &[3][..], &[2, 0][..]]);
    }

    proptest! {
        #![proptest_config(proptest_config())]

        #[test]
        fn groups_partition_the_edge_set(
            weights in prop::collection::vec(0.0_f64..=1.0, 1..64),
            rate in 0.01_f64..=1.0,
        ) {
            let graph = graph_with_weights(&weights);
            let schedule = ShaveSchedule::compute(&graph, rate);
            let mut seen: Vec<usize> = schedule
                .groups()
                .iter()
                .flat_map(|group| group.edges().iter().copied())
                .collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..graph.edge_count()).collect::<Vec<_>>());
            prop_assert!(schedule.groups().iter().all(|group| !group.is_empty()));
        }
    }
}
