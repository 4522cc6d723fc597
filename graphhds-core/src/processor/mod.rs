//! Combination of per-level labels into one globally labelled hierarchy.
//!
//! Level-local labels are first made unique per row. Walking from the
//! coarsest row down, a cluster that maps onto exactly one cluster in the
//! next row keeps its id (it shrank); clusters that break apart yield new ids
//! (they split). Each row that gives birth to clusters gets the next compact
//! depth.

mod combine;
mod shaving;
mod stability;

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, instrument};

use crate::{graph::SimilarityGraph, hierarchy::LabelMatrix, result::ClusterId};

pub use self::{
    shaving::{ShavingOrder, density_sorted},
    stability::StabilityMeasure,
};

/// Globally labelled hierarchy with birth depths.
///
/// # Examples
/// ```
/// use graphhds_core::{ClusterId, CombinedHierarchy, LabelMatrix};
///
/// let levels = LabelMatrix::from_rows(vec![
///     vec![1, 1, 1, 1],
///     vec![4, 4, 9, 9],
///     vec![2, 2, 0, 0],
/// ])
/// .expect("rows align");
/// let hierarchy = CombinedHierarchy::combine(&levels);
/// assert_eq!(hierarchy.labels().row(1), &[2, 2, 3, 3]);
/// assert_eq!(hierarchy.labels().row(2), &[2, 2, 0, 0]);
/// assert_eq!(hierarchy.depth_of(ClusterId::new(3)), Some(2));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CombinedHierarchy {
    labels: LabelMatrix,
    depths: BTreeMap<ClusterId, u32>,
    births: BTreeMap<u32, BTreeSet<ClusterId>>,
    branch_rows: BTreeMap<ClusterId, usize>,
}

impl CombinedHierarchy {
    /// Combines a level-local label matrix (coarsest row first).
    #[must_use]
    #[instrument(
        name = "core.combine",
        skip(levels),
        fields(rows = levels.rows(), columns = levels.columns()),
    )]
    pub fn combine(levels: &LabelMatrix) -> Self {
        let combined = combine::combine_rows(&combine::initial_relabel(levels));
        debug!(
            clusters = combined.depths.len(),
            depths = combined.births.len(),
            "combined level labels"
        );
        Self {
            labels: combined.labels,
            depths: combined.depths,
            births: combined.births,
            branch_rows: combined.branch_rows,
        }
    }

    /// Combined labels; every nonzero cell is a [`ClusterId`] value.
    #[must_use]
    pub fn labels(&self) -> &LabelMatrix {
        &self.labels
    }

    /// Number of distinct clusters.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.depths.len()
    }

    /// Compact depth at which `id` was born; the coarsest births are depth 1.
    #[must_use]
    pub fn depth_of(&self, id: ClusterId) -> Option<u32> {
        self.depths.get(&id).copied()
    }

    /// Clusters born at each depth.
    #[must_use]
    pub fn births(&self) -> &BTreeMap<u32, BTreeSet<ClusterId>> {
        &self.births
    }

    /// Matrix row at which `id` first appears.
    #[must_use]
    pub fn branch_row(&self, id: ClusterId) -> Option<usize> {
        self.branch_rows.get(&id).copied()
    }

    /// Clusters first appearing at `row`.
    #[must_use]
    pub fn born_at(&self, row: usize) -> BTreeSet<ClusterId> {
        self.branch_rows
            .iter()
            .filter_map(|(&id, &born)| (born == row).then_some(id))
            .collect()
    }

    /// Number of rows each cluster appears in.
    #[must_use]
    pub fn stabilities(&self) -> BTreeMap<ClusterId, f64> {
        stability::level_count(&self.labels)
    }

    /// Flow-based score of every cluster in [`Self::clusters`].
    #[must_use]
    pub fn flow_stability(&self, graph: &SimilarityGraph) -> BTreeMap<ClusterId, f64> {
        stability::flow(graph, &self.clusters())
    }

    /// Scores clusters with the chosen measure.
    #[must_use]
    pub fn stability(
        &self,
        measure: StabilityMeasure,
        graph: &SimilarityGraph,
    ) -> BTreeMap<ClusterId, f64> {
        match measure {
            StabilityMeasure::LevelCount => self.stabilities(),
            StabilityMeasure::Flow => self.flow_stability(graph),
        }
    }

    /// Members of each cluster across all rows. Clusters with fewer than two
    /// members are omitted.
    #[must_use]
    pub fn clusters(&self) -> BTreeMap<ClusterId, BTreeSet<usize>> {
        let mut members: BTreeMap<ClusterId, BTreeSet<usize>> = BTreeMap::new();
        for row in self.labels.iter_rows() {
            for (node, &label) in row.iter().enumerate() {
                if label != 0 {
                    members.entry(ClusterId::new(label)).or_default().insert(node);
                }
            }
        }
        members.retain(|_, nodes| nodes.len() >= 2);
        members
    }

    /// Node order for display: a stable lexicographic sort of the label
    /// columns, coarsest row first.
    #[must_use]
    pub fn sort_order(&self) -> Vec<usize> {
        let columns: Vec<Vec<u32>> = (0..self.labels.columns())
            .map(|node| self.labels.column(node))
            .collect();
        let mut order: Vec<usize> = (0..columns.len()).collect();
        order.sort_by(|&a, &b| columns[a].cmp(&columns[b]));
        order
    }
}

#[cfg(test)]
mod tests;
