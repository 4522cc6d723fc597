//! Ordering of a cluster's members from least to most dense.
//!
//! Density is the two-hop flow a member sends to the other members through
//! intra-cluster edges, `sum over c, j != i of w(i, c) * w(c, j)`. Edges
//! leaving the cluster are ignored.

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::SimilarityGraph;

type Adjacency = BTreeMap<usize, BTreeMap<usize, f64>>;

/// How members are peeled off a cluster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShavingOrder {
    /// Sort once by the density measured on the whole cluster.
    #[default]
    Flow,
    /// Repeatedly remove the least dense member and update the densities of
    /// the members that remain.
    Incremental,
}

impl ShavingOrder {
    /// Lower-case name used in logs and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::Incremental => "incremental",
        }
    }
}

/// Returns `members` ordered from least to most dense. Ties go to the lower
/// node index.
///
/// # Examples
/// ```
/// use std::collections::BTreeSet;
/// use graphhds_core::{GraphBuilder, ShavingOrder, density_sorted};
///
/// let mut builder = GraphBuilder::new("path");
/// builder.add_record(0, [(1, 1.0)])?;
/// builder.add_record(1, [(2, 1.0)])?;
/// let graph = builder.build()?;
///
/// let members = BTreeSet::from([0, 1, 2]);
/// assert_eq!(density_sorted(&graph, &members, ShavingOrder::Flow), vec![1, 0, 2]);
/// # Ok::<(), graphhds_core::GraphHdsError>(())
/// ```
#[must_use]
pub fn density_sorted(
    graph: &SimilarityGraph,
    members: &BTreeSet<usize>,
    order: ShavingOrder,
) -> Vec<usize> {
    let adjacency = member_adjacency(graph, members);
    match order {
        ShavingOrder::Flow => by_flow(&adjacency, members),
        ShavingOrder::Incremental => peel(&adjacency, members),
    }
}

fn member_adjacency(graph: &SimilarityGraph, members: &BTreeSet<usize>) -> Adjacency {
    let mut adjacency: Adjacency = members.iter().map(|&node| (node, BTreeMap::new())).collect();
    for edge in graph.edges() {
        let (source, target) = (edge.source(), edge.target());
        if members.contains(&source) && members.contains(&target) {
            adjacency.entry(source).or_default().insert(target, edge.weight());
            adjacency.entry(target).or_default().insert(source, edge.weight());
        }
    }
    adjacency
}

fn neighbours(adjacency: &Adjacency, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
    adjacency
        .get(&node)
        .into_iter()
        .flatten()
        .map(|(&other, &weight)| (other, weight))
}

fn strength(adjacency: &Adjacency, node: usize, alive: &BTreeSet<usize>) -> f64 {
    neighbours(adjacency, node)
        .filter(|(other, _)| alive.contains(other))
        .map(|(_, weight)| weight)
        .sum()
}

fn density(adjacency: &Adjacency, node: usize, alive: &BTreeSet<usize>) -> f64 {
    neighbours(adjacency, node)
        .filter(|(via, _)| alive.contains(via))
        .map(|(via, weight)| weight * (strength(adjacency, via, alive) - weight))
        .sum()
}

fn by_flow(adjacency: &Adjacency, members: &BTreeSet<usize>) -> Vec<usize> {
    let mut scored: Vec<(usize, f64)> = members
        .iter()
        .map(|&node| (node, density(adjacency, node, members)))
        .collect();
    // Stable, so equal densities keep ascending index order.
    scored.sort_by(|a, b| a.1.total_cmp(&b.1));
    scored.into_iter().map(|(node, _)| node).collect()
}

fn peel(adjacency: &Adjacency, members: &BTreeSet<usize>) -> Vec<usize> {
    let mut alive = members.clone();
    let mut densities: BTreeMap<usize, f64> = members
        .iter()
        .map(|&node| (node, density(adjacency, node, members)))
        .collect();
    let mut order = Vec::with_capacity(members.len());

    while let Some(removed) = least_dense(&densities) {
        // Paths routed through `removed`.
        let through = strength(adjacency, removed, &alive);
        for (node, weight) in neighbours(adjacency, removed) {
            if let Some(value) = densities.get_mut(&node) {
                *value -= weight * (through - weight);
            }
        }
        // Paths ending at `removed`.
        for (via, via_weight) in neighbours(adjacency, removed) {
            if !alive.contains(&via) {
                continue;
            }
            for (node, weight) in neighbours(adjacency, via) {
                if node == removed {
                    continue;
                }
                if let Some(value) = densities.get_mut(&node) {
                    *value -= weight * via_weight;
                }
            }
        }

        densities.remove(&removed);
        alive.remove(&removed);
        order.push(removed);
    }
    order
}

fn least_dense(densities: &BTreeMap<usize, f64>) -> Option<usize> {
    densities
        .iter()
        .min_by(|a, b| a.1.total_cmp(b.1).then(a.0.cmp(b.0)))
        .map(|(&node, _)| node)
}
