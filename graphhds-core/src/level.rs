//! Per-level flood-fill clustering over the current flow state.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    Result,
    error::GraphHdsError,
    flow::FlowState,
    graph::SimilarityGraph,
};

/// Which flow signal connects nodes into clusters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClusterPolicy {
    /// Join both nodes of every pair whose accumulated pair flow reaches
    /// `min_flow`.
    Edge,
    /// Join dense nodes along revealed edges to dense neighbours.
    #[default]
    Node,
}

impl ClusterPolicy {
    /// Lower-case name used in logs and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Edge => "edge",
            Self::Node => "node",
        }
    }
}

/// Clusters found at one shave level, keyed by level-local label.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelClusters {
    clusters: BTreeMap<u32, BTreeSet<usize>>,
}

impl LevelClusters {
    /// Wraps a label to member-set map.
    #[must_use]
    pub fn from_map(clusters: BTreeMap<u32, BTreeSet<usize>>) -> Self {
        Self { clusters }
    }

    /// Number of clusters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Returns `true` when no node was clustered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Total number of clustered nodes.
    #[must_use]
    pub fn clustered_points(&self) -> usize {
        self.clusters.values().map(BTreeSet::len).sum()
    }

    /// Cluster sizes in label order.
    #[must_use]
    pub fn sizes(&self) -> Vec<usize> {
        self.clusters.values().map(BTreeSet::len).collect()
    }

    /// Members of `label`.
    #[must_use]
    pub fn members(&self, label: u32) -> Option<&BTreeSet<usize>> {
        self.clusters.get(&label)
    }

    /// Iterates `(label, members)` in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &BTreeSet<usize>)> + '_ {
        self.clusters.iter().map(|(&label, members)| (label, members))
    }
}

/// Incremental union of nodes into labelled clusters.
struct FloodFill {
    labels: Vec<u32>,
    clusters: BTreeMap<u32, BTreeSet<usize>>,
    next_label: u32,
}

impl FloodFill {
    fn new(nodes: usize) -> Self {
        Self {
            labels: vec![0; nodes],
            clusters: BTreeMap::new(),
            next_label: 0,
        }
    }

    fn join(&mut self, first: usize, second: usize) -> Result<()> {
        match (self.labels[first], self.labels[second]) {
            (0, 0) => {
                self.next_label += 1;
                let label = self.next_label;
                self.labels[first] = label;
                self.labels[second] = label;
                self.clusters.insert(label, BTreeSet::from([first, second]));
            }
            (label, 0) => self.annex(label, first, second)?,
            (0, label) => self.annex(label, second, first)?,
            (kept, absorbed) if kept == absorbed => {}
            (kept, absorbed) => {
                let moved = self
                    .clusters
                    .remove(&absorbed)
                    .ok_or(GraphHdsError::FloodFillInvariant {
                        node: second,
                        label: absorbed,
                    })?;
                for &node in &moved {
                    self.labels[node] = kept;
                }
                self.clusters
                    .get_mut(&kept)
                    .ok_or(GraphHdsError::FloodFillInvariant {
                        node: first,
                        label: kept,
                    })?
                    .extend(moved);
            }
        }
        Ok(())
    }

    fn annex(&mut self, label: u32, labelled: usize, node: usize) -> Result<()> {
        self.clusters
            .get_mut(&label)
            .ok_or(GraphHdsError::FloodFillInvariant {
                node: labelled,
                label,
            })?
            .insert(node);
        self.labels[node] = label;
        Ok(())
    }

    fn finish(self) -> LevelClusters {
        LevelClusters::from_map(self.clusters)
    }
}

/// Clusters the current flow state under `policy`.
///
/// # Errors
/// Returns [`GraphHdsError::FloodFillInvariant`] if a node's label ever loses
/// its member set, which indicates a defect in the union logic.
///
/// # Examples
/// ```
/// use graphhds_core::{ClusterPolicy, FlowState, GraphBuilder, ShaveSchedule, cluster_level};
///
/// let mut builder = GraphBuilder::new("triangle");
/// builder.add_record(0, [(1, 0.9), (2, 0.9)])?;
/// builder.add_record(1, [(2, 0.9)])?;
/// let graph = builder.build()?;
///
/// let mut flow = FlowState::new(&graph, 1.0);
/// for group in ShaveSchedule::compute(&graph, 1.0).groups() {
///     flow.reveal(&graph, group);
/// }
/// let clusters = cluster_level(ClusterPolicy::Node, &flow, &graph)?;
/// assert_eq!(clusters.sizes(), vec![3]);
/// # Ok::<(), graphhds_core::GraphHdsError>(())
/// ```
pub fn cluster_level(
    policy: ClusterPolicy,
    flow: &FlowState,
    graph: &SimilarityGraph,
) -> Result<LevelClusters> {
    let mut fill = FloodFill::new(graph.node_count());
    match policy {
        ClusterPolicy::Edge => {
            for (&(first, second), &pair_flow) in flow.pair_flows() {
                if pair_flow >= flow.min_flow() {
                    fill.join(first, second)?;
                }
            }
        }
        ClusterPolicy::Node => {
            for node in flow.dense_nodes() {
                for &index in flow.adjacency(node) {
                    let Some(neighbour) = graph.edge(index).and_then(|edge| edge.other(node))
                    else {
                        continue;
                    };
                    if flow.is_dense(neighbour) {
                        fill.join(node, neighbour)?;
                    }
                }
            }
        }
    }
    Ok(fill.finish())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::{
        schedule::ShaveSchedule,
        test_utils::{graph_strategy, proptest_config, triangle_with_pair},
    };

    fn flow_after_all(graph: &SimilarityGraph, min_flow: f64) -> FlowState {
        let mut flow = FlowState::new(graph, min_flow);
        for group in ShaveSchedule::compute(graph, 1.0).groups() {
            flow.reveal(graph, group);
        }
        flow
    }

    #[rstest]
    #[case(ClusterPolicy::Edge, 0.5)]
    #[case(ClusterPolicy::Node, 1.0)]
    fn triangle_forms_one_cluster(#[case] policy: ClusterPolicy, #[case] min_flow: f64) {
        let graph = triangle_with_pair();
        let flow = flow_after_all(&graph, min_flow);
        let clusters = cluster_level(policy, &flow, &graph).expect("flood fill must succeed");

        assert_eq!(clusters.len(), 1);
        let members = clusters.members(1).expect("first label is 1");
        assert_eq!(members, &BTreeSet::from([0, 1, 2]));
    }

    #[test]
    fn high_threshold_clusters_nothing() {
        let graph = triangle_with_pair();
        let flow = flow_after_all(&graph, 100.0);
        for policy in [ClusterPolicy::Edge, ClusterPolicy::Node] {
            let clusters = cluster_level(policy, &flow, &graph).expect("flood fill must succeed");
            assert!(clusters.is_empty());
            assert_eq!(clusters.clustered_points(), 0);
        }
    }

    #[test]
    fn merging_keeps_the_first_nodes_label() {
        let mut fill = FloodFill::new(4);
        fill.join(0, 1).expect("new cluster");
        fill.join(2, 3).expect("new cluster");
        fill.join(1, 3).expect("merge");

        let clusters = fill.finish();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters.members(1), Some(&BTreeSet::from([0, 1, 2, 3])));
        assert_eq!(clusters.members(2), None);
    }

    #[test]
    fn dangling_label_is_an_invariant_violation() {
        let mut fill = FloodFill::new(3);
        fill.labels[0] = 7;
        let err = fill.join(0, 1).expect_err("label 7 has no members");
        assert!(err.is_invariant_violation());
        assert_eq!(err, GraphHdsError::FloodFillInvariant { node: 0, label: 7 });
    }

    #[test]
    fn policy_names_are_lowercase() {
        assert_eq!(ClusterPolicy::Edge.as_str(), "edge");
        assert_eq!(ClusterPolicy::default().as_str(), "node");
    }

    proptest! {
        #![proptest_config(proptest_config())]

        #[test]
        fn clusters_are_disjoint_and_within_the_graph(
            graph in graph_strategy(),
            min_flow in 0.0_f64..3.0,
            edge_policy in any::<bool>(),
        ) {
            let policy = if edge_policy { ClusterPolicy::Edge } else { ClusterPolicy::Node };
            let flow = flow_after_all(&graph, min_flow);
            let clusters = cluster_level(policy, &flow, &graph).expect("flood fill must succeed");

            let mut seen = BTreeSet::new();
            for (_, members) in clusters.iter() {
                prop_assert!(members.len() >= 2);
                for &node in members {
                    prop_assert!(node < graph.node_count());
                    prop_assert!(seen.insert(node), "node {} in two clusters", node);
                }
            }
            prop_assert_eq!(seen.len(), clusters.clustered_points());
        }
    }
}
