//! Cluster scores used to rank clusters during deduplication.

use std::collections::{BTreeMap, BTreeSet};

use crate::{graph::SimilarityGraph, hierarchy::LabelMatrix, result::ClusterId};

/// Which score ranks clusters during deduplication.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StabilityMeasure {
    /// Number of retained levels a cluster spans.
    #[default]
    LevelCount,
    /// Intra-cluster two-hop flow per member pair.
    Flow,
}

impl StabilityMeasure {
    /// Lower-case name used in logs and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LevelCount => "levels",
            Self::Flow => "flow",
        }
    }
}

/// Counts the rows each nonzero id appears in.
pub(super) fn level_count(labels: &LabelMatrix) -> BTreeMap<ClusterId, f64> {
    let mut counts: BTreeMap<ClusterId, u32> = BTreeMap::new();
    for row in labels.iter_rows() {
        let present: BTreeSet<u32> = row.iter().copied().filter(|&l| l != 0).collect();
        for label in present {
            *counts.entry(ClusterId::new(label)).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .map(|(id, count)| (id, f64::from(count)))
        .collect()
}

/// Sums the squared intra-cluster similarity matrix and divides by the
/// number of member pairs.
///
/// With `M` the member-restricted similarity matrix, `sum(M·M)` equals the sum
/// over members of their squared intra-cluster weighted degree.
pub(super) fn flow(
    graph: &SimilarityGraph,
    clusters: &BTreeMap<ClusterId, BTreeSet<usize>>,
) -> BTreeMap<ClusterId, f64> {
    let mut neighbours: Vec<Vec<(usize, f64)>> = vec![Vec::new(); graph.node_count()];
    for edge in graph.edges() {
        neighbours[edge.source()].push((edge.target(), edge.weight()));
        neighbours[edge.target()].push((edge.source(), edge.weight()));
    }

    clusters
        .iter()
        .map(|(&id, members)| {
            let size = members.len();
            if size < 2 {
                return (id, 0.0);
            }
            let squared_degrees: f64 = members
                .iter()
                .map(|&node| {
                    let degree: f64 = neighbours
                        .get(node)
                        .into_iter()
                        .flatten()
                        .filter(|(other, _)| members.contains(other))
                        .map(|&(_, weight)| weight)
                        .sum();
                    degree * degree
                })
                .sum();
            #[expect(
                clippy::cast_precision_loss,
                reason = "cluster sizes stay far below 2^26"
            )]
            let pairs = (size * (size - 1)) as f64 / 2.0;
            (id, squared_degrees / pairs)
        })
        .collect()
}
