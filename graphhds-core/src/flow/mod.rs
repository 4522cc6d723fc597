//! Incremental two-hop flow accumulation.
//!
//! When an edge `(a, b)` appears, every already revealed neighbour `c` of `a`
//! now reaches `b` through `a`, and symmetrically for the neighbours of `b`.
//! The resulting flow is added to both far endpoints and to their pair. The
//! state is created once per run and only ever grows.

use std::collections::BTreeMap;

use crate::{graph::SimilarityGraph, schedule::PruneGroup};

/// Counters describing one call to [`FlowState::reveal`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RevealSummary {
    /// Number of edges added to the adjacency.
    pub edges_revealed: usize,
    /// Distinct nodes that gained an edge.
    pub nodes_touched: usize,
    /// Nodes whose flow crossed `min_flow` during this call.
    pub newly_dense: usize,
}

/// Accumulated flow, dense flags, and revealed adjacency.
///
/// # Examples
/// ```
/// use graphhds_core::{FlowState, GraphBuilder, ShaveSchedule};
///
/// let mut builder = GraphBuilder::new("path");
/// builder.add_record(0, [(1, 1.0)])?;
/// builder.add_record(1, [(2, 1.0)])?;
/// let graph = builder.build()?;
///
/// let mut flow = FlowState::new(&graph, 1.0);
/// for group in ShaveSchedule::compute(&graph, 1.0).groups() {
///     flow.reveal(&graph, group);
/// }
/// assert!(flow.is_dense(0) && flow.is_dense(2));
/// assert!(!flow.is_dense(1));
/// assert_eq!(flow.pair_flow(0, 2), 1.0);
/// # Ok::<(), graphhds_core::GraphHdsError>(())
/// ```
#[derive(Clone, Debug)]
pub struct FlowState {
    min_flow: f64,
    node_flow: Vec<f64>,
    dense: Vec<bool>,
    dense_count: usize,
    pair_flow: BTreeMap<(usize, usize), f64>,
    adjacency: Vec<Vec<usize>>,
    revealed: usize,
}

impl FlowState {
    /// Creates a zeroed state sized for `graph`.
    #[must_use]
    pub fn new(graph: &SimilarityGraph, min_flow: f64) -> Self {
        let nodes = graph.node_count();
        Self {
            min_flow,
            node_flow: vec![0.0; nodes],
            dense: vec![false; nodes],
            dense_count: 0,
            pair_flow: BTreeMap::new(),
            adjacency: vec![Vec::new(); nodes],
            revealed: 0,
        }
    }

    /// Reveals every edge of `group`, updating flows before registering each
    /// edge in its endpoints' adjacency.
    pub fn reveal(&mut self, graph: &SimilarityGraph, group: &PruneGroup) -> RevealSummary {
        let dense_before = self.dense_count;
        let mut touched = vec![false; self.adjacency.len()];
        let mut summary = RevealSummary::default();

        for &index in group.edges() {
            let Some(edge) = graph.edge(index) else {
                continue;
            };
            let (left, right) = (edge.source(), edge.target());
            self.spread(graph, left, right, edge.weight());
            self.spread(graph, right, left, edge.weight());
            self.adjacency[left].push(index);
            self.adjacency[right].push(index);
            for node in [left, right] {
                if !touched[node] {
                    touched[node] = true;
                    summary.nodes_touched += 1;
                }
            }
            summary.edges_revealed += 1;
        }

        self.revealed += summary.edges_revealed;
        summary.newly_dense = self.dense_count - dense_before;
        summary
    }

    /// Adds the flow created by the new edge `(pivot, other)` through every
    /// edge already incident to `pivot`.
    fn spread(&mut self, graph: &SimilarityGraph, pivot: usize, other: usize, weight: f64) {
        let other_weight = graph.weight(other);
        for slot in 0..self.adjacency[pivot].len() {
            let Some(edge) = graph.edge(self.adjacency[pivot][slot]) else {
                continue;
            };
            let Some(neighbour) = edge.other(pivot) else {
                continue;
            };
            let neighbour_weight = graph.weight(neighbour);
            let increment = weight * edge.weight() * neighbour_weight.max(other_weight);

            self.add_node_flow(other, increment * other_weight);
            self.add_node_flow(neighbour, increment * neighbour_weight);
            let key = (other.min(neighbour), other.max(neighbour));
            *self.pair_flow.entry(key).or_insert(0.0) += increment;
        }
    }

    fn add_node_flow(&mut self, node: usize, amount: f64) {
        self.node_flow[node] += amount;
        if !self.dense[node] && self.node_flow[node] >= self.min_flow {
            self.dense[node] = true;
            self.dense_count += 1;
        }
    }

    /// The density threshold this state was created with.
    #[must_use]
    #[rustfmt::skip]
    pub const fn min_flow(&self) -> f64 { self.min_flow }

    /// Accumulated flow of `node`.
    #[must_use]
    pub fn node_flow(&self, node: usize) -> f64 {
        self.node_flow.get(node).copied().unwrap_or(0.0)
    }

    /// All accumulated node flows indexed by node.
    #[must_use]
    pub fn node_flows(&self) -> &[f64] {
        &self.node_flow
    }

    /// Returns `true` once `node` has reached `min_flow`.
    #[must_use]
    pub fn is_dense(&self, node: usize) -> bool {
        self.dense.get(node).copied().unwrap_or(false)
    }

    /// Dense nodes in ascending index order.
    pub fn dense_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.dense
            .iter()
            .enumerate()
            .filter_map(|(node, &dense)| dense.then_some(node))
    }

    /// Number of dense nodes.
    #[must_use]
    #[rustfmt::skip]
    pub const fn dense_count(&self) -> usize { self.dense_count }

    /// Accumulated flow between `a` and `b`, in either order.
    #[must_use]
    pub fn pair_flow(&self, a: usize, b: usize) -> f64 {
        self.pair_flow
            .get(&(a.min(b), a.max(b)))
            .copied()
            .unwrap_or(0.0)
    }

    /// All pair flows keyed by canonical `(min, max)` node pair.
    #[must_use]
    pub fn pair_flows(&self) -> &BTreeMap<(usize, usize), f64> {
        &self.pair_flow
    }

    /// Indices of the revealed edges incident to `node`, in reveal order.
    #[must_use]
    pub fn adjacency(&self, node: usize) -> &[usize] {
        self.adjacency
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of edges revealed so far.
    #[must_use]
    #[rustfmt::skip]
    pub const fn revealed_edges(&self) -> usize { self.revealed }
}
