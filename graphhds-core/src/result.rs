//! Result types for a complete graph HDS run.
//!
//! Bundles the per-level diagnostics, the combined hierarchy, the cluster
//! scores, and the deduplicated flat partition into one value.

use std::{collections::BTreeMap, fmt};

use crate::{
    dedup::DedupedPartition, hierarchy::LevelSummary, processor::CombinedHierarchy,
};

/// Global identifier of a hierarchy cluster.
///
/// Identifiers are positive; `0` is reserved for "unclustered" cells in a
/// [`crate::LabelMatrix`].
///
/// # Examples
/// ```
/// use graphhds_core::ClusterId;
///
/// let id = ClusterId::new(4);
/// assert_eq!(id.get(), 4);
/// assert_eq!(id.to_string(), "4");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(u32);

impl ClusterId {
    /// Creates a new cluster identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: u32) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> u32 { self.0 }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Output of [`crate::GraphHds::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct HdsResult {
    levels: Vec<LevelSummary>,
    hierarchy: CombinedHierarchy,
    stabilities: BTreeMap<ClusterId, f64>,
    partition: DedupedPartition,
}

impl HdsResult {
    pub(crate) fn new(
        levels: Vec<LevelSummary>,
        hierarchy: CombinedHierarchy,
        stabilities: BTreeMap<ClusterId, f64>,
        partition: DedupedPartition,
    ) -> Self {
        Self {
            levels,
            hierarchy,
            stabilities,
            partition,
        }
    }

    /// Diagnostics for every shave level that was evaluated, in the order the
    /// levels were computed (sparsest first).
    #[must_use]
    pub fn levels(&self) -> &[LevelSummary] {
        &self.levels
    }

    /// The globally labelled hierarchy.
    #[must_use]
    pub fn hierarchy(&self) -> &CombinedHierarchy {
        &self.hierarchy
    }

    /// The score used to rank clusters during deduplication.
    #[must_use]
    pub fn stabilities(&self) -> &BTreeMap<ClusterId, f64> {
        &self.stabilities
    }

    /// The flat non-overlapping partition.
    #[must_use]
    pub fn partition(&self) -> &DedupedPartition {
        &self.partition
    }

    /// Per-node assignment into the flat partition, indexed by internal node
    /// index. `None` marks background nodes.
    ///
    /// # Examples
    /// ```
    /// use graphhds_core::{GraphBuilder, GraphHdsBuilder};
    ///
    /// let mut builder = GraphBuilder::new("triangle");
    /// builder.add_record(0, [(1, 0.9), (2, 0.9)])?;
    /// builder.add_record(1, [(2, 0.9)])?;
    /// let graph = builder.build()?;
    /// let result = GraphHdsBuilder::new().with_min_flow(0.5).build()?.run(&graph)?;
    /// assert_eq!(result.assignments().len(), 3);
    /// # Ok::<(), graphhds_core::GraphHdsError>(())
    /// ```
    #[must_use]
    pub fn assignments(&self) -> Vec<Option<ClusterId>> {
        let mut out = vec![None; self.hierarchy.labels().columns()];
        for (id, members) in self.partition.clusters() {
            for &node in members {
                if let Some(slot) = out.get_mut(node) {
                    *slot = Some(*id);
                }
            }
        }
        out
    }

    /// Number of shave levels retained in the hierarchy.
    #[must_use]
    pub fn retained_levels(&self) -> usize {
        self.hierarchy.labels().rows()
    }
}
