//! Flattening of the cluster hierarchy into a non-overlapping partition.
//!
//! Clusters are visited from the most to the least stable. A cluster is kept
//! unless one of its ancestors or descendants has already been kept. Clusters
//! below `min_stability` are excluded, but they are still recorded as kept
//! and so continue to block their relatives.

mod relationship;
mod tree;

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
};

use tracing::{debug, instrument};

use crate::{
    Result,
    error::GraphHdsError,
    graph::SimilarityGraph,
    processor::{ShavingOrder, density_sorted},
    result::ClusterId,
};

pub use self::{
    relationship::{Relationship, RelationshipCache},
    tree::ClusterTree,
};

/// Selected clusters and the ids that were dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DedupedPartition {
    clusters: BTreeMap<ClusterId, BTreeSet<usize>>,
    excluded: BTreeSet<ClusterId>,
}

impl DedupedPartition {
    /// Pairwise disjoint clusters that survived deduplication.
    #[must_use]
    pub fn clusters(&self) -> &BTreeMap<ClusterId, BTreeSet<usize>> {
        &self.clusters
    }

    /// Ids removed for low stability or because a relative was kept.
    #[must_use]
    pub fn excluded(&self) -> &BTreeSet<ClusterId> {
        &self.excluded
    }

    /// Number of surviving clusters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Returns `true` when no cluster survived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Members of cluster `id` from least to most dense, or `None` when the
    /// cluster was not selected.
    #[must_use]
    pub fn density_sorted(
        &self,
        graph: &SimilarityGraph,
        id: ClusterId,
        order: ShavingOrder,
    ) -> Option<Vec<usize>> {
        self.clusters
            .get(&id)
            .map(|members| density_sorted(graph, members, order))
    }
}

/// Stability-ordered greedy selection over a cluster hierarchy.
///
/// # Examples
/// ```
/// use std::collections::{BTreeMap, BTreeSet};
/// use graphhds_core::{ClusterDeduper, ClusterId};
///
/// let (a, b, c) = (ClusterId::new(1), ClusterId::new(2), ClusterId::new(3));
/// let clusters = BTreeMap::from([
///     (a, BTreeSet::from([1, 2, 3, 4])),
///     (b, BTreeSet::from([1, 2])),
///     (c, BTreeSet::from([3, 4])),
/// ]);
/// let stabilities = BTreeMap::from([(a, 2.0), (b, 5.0), (c, 1.0)]);
///
/// let partition = ClusterDeduper::new(&clusters, &stabilities)?.dedupe(0.0)?;
/// assert_eq!(partition.clusters().keys().copied().collect::<Vec<_>>(), vec![b, c]);
/// assert_eq!(partition.excluded(), &BTreeSet::from([a]));
/// # Ok::<(), graphhds_core::GraphHdsError>(())
/// ```
#[derive(Clone, Debug)]
pub struct ClusterDeduper<'a> {
    clusters: &'a BTreeMap<ClusterId, BTreeSet<usize>>,
    stabilities: &'a BTreeMap<ClusterId, f64>,
    relationships: RelationshipCache,
}

impl<'a> ClusterDeduper<'a> {
    /// Scans all cluster pairs for containment.
    ///
    /// # Errors
    /// Returns [`GraphHdsError::MissingStability`] when a cluster has no
    /// score and [`GraphHdsError::PartialOverlap`] when two clusters overlap
    /// without nesting.
    pub fn new(
        clusters: &'a BTreeMap<ClusterId, BTreeSet<usize>>,
        stabilities: &'a BTreeMap<ClusterId, f64>,
    ) -> Result<Self> {
        if let Some(&cluster) = clusters.keys().find(|id| !stabilities.contains_key(id)) {
            return Err(GraphHdsError::MissingStability { cluster });
        }
        let relationships = RelationshipCache::scan(clusters)?;
        Ok(Self {
            clusters,
            stabilities,
            relationships,
        })
    }

    /// Cached pairwise relationships.
    #[must_use]
    pub fn relationships(&self) -> &RelationshipCache {
        &self.relationships
    }

    /// Containment tree over the clusters.
    #[must_use]
    pub fn tree(&self) -> ClusterTree {
        ClusterTree::build(self.clusters, &self.relationships)
    }

    /// Selects non-overlapping clusters.
    ///
    /// # Errors
    /// Returns [`GraphHdsError::InvalidMinStability`] when `min_stability` is
    /// NaN.
    #[instrument(
        name = "core.dedupe",
        err,
        skip(self),
        fields(clusters = self.clusters.len(), pairs = self.relationships.len()),
    )]
    pub fn dedupe(&self, min_stability: f64) -> Result<DedupedPartition> {
        if min_stability.is_nan() {
            return Err(GraphHdsError::InvalidMinStability);
        }

        let mut ranked: Vec<(ClusterId, f64)> = self
            .clusters
            .keys()
            .filter_map(|id| self.stabilities.get(id).map(|&score| (*id, score)))
            .collect();
        ranked.sort_by(|a, b| match b.1.total_cmp(&a.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            order => order,
        });

        let mut excluded = BTreeSet::new();
        let mut selected = BTreeSet::new();
        for (id, score) in ranked {
            if score < min_stability {
                debug!(cluster = %id, stability = score, "excluding unstable cluster");
                excluded.insert(id);
            }
            if self
                .relationships
                .relatives(id)
                .any(|relative| selected.contains(&relative))
            {
                excluded.insert(id);
            } else {
                selected.insert(id);
            }
        }

        #[cfg(feature = "metrics")]
        metrics::counter!("graphhds_clusters_excluded").increment(excluded.len() as u64);

        let clusters = self
            .clusters
            .iter()
            .filter(|(id, _)| !excluded.contains(id))
            .map(|(&id, members)| (id, members.clone()))
            .collect();
        Ok(DedupedPartition { clusters, excluded })
    }
}
