//! Shrink and split detection across adjacent label matrix rows.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{hierarchy::LabelMatrix, result::ClusterId};

/// Raw output of [`combine_rows`].
pub(super) struct Combined {
    pub(super) labels: LabelMatrix,
    pub(super) depths: BTreeMap<ClusterId, u32>,
    pub(super) births: BTreeMap<u32, BTreeSet<ClusterId>>,
    pub(super) branch_rows: BTreeMap<ClusterId, usize>,
}

/// Gives every nonzero label a fresh id so no two rows share one.
pub(super) fn initial_relabel(matrix: &LabelMatrix) -> LabelMatrix {
    let mut out = LabelMatrix::zeroed(matrix.rows(), matrix.columns());
    let mut next = 0_u32;
    for row in 0..matrix.rows() {
        let distinct: BTreeSet<u32> = matrix.row(row).iter().copied().filter(|&l| l != 0).collect();
        let fresh: HashMap<u32, u32> = distinct
            .into_iter()
            .map(|label| {
                next += 1;
                (label, next)
            })
            .collect();
        for (cell, label) in out.row_mut(row).iter_mut().zip(matrix.row(row)) {
            *cell = fresh.get(label).copied().unwrap_or(0);
        }
    }
    out
}

/// Rewrites a relabelled matrix so a cluster that only shrinks from one row to
/// the next keeps its id, while every split child gets a new id.
pub(super) fn combine_rows(relabeled: &LabelMatrix) -> Combined {
    let mut labels = LabelMatrix::zeroed(relabeled.rows(), relabeled.columns());
    let mut depths = BTreeMap::new();
    let mut births: BTreeMap<u32, BTreeSet<ClusterId>> = BTreeMap::new();
    let mut branch_rows = BTreeMap::new();
    let mut next_id = 0_u32;
    let mut depth = 0_u32;
    let mut previous: HashMap<u32, u32> = HashMap::new();

    for row in 0..relabeled.rows() {
        let current = relabeled.row(row);
        let mut assigned: HashMap<u32, u32> = HashMap::new();
        let mut fresh: BTreeSet<u32> = BTreeSet::new();

        if row == 0 {
            fresh.extend(current.iter().copied().filter(|&l| l != 0));
        } else {
            let above = relabeled.row(row - 1);
            let mut parents: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
            let mut children: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
            for (&child, &parent) in current.iter().zip(above) {
                if child == 0 {
                    continue;
                }
                parents.entry(child).or_default().insert(parent);
                if parent != 0 {
                    children.entry(parent).or_default().insert(child);
                }
            }
            for (child, parent_set) in parents {
                // A child shrinks from its parent only when each is the
                // other's sole counterpart.
                let inherited = parent_set
                    .first()
                    .copied()
                    .filter(|&parent| parent != 0 && parent_set.len() == 1)
                    .filter(|parent| children.get(parent).is_some_and(|kids| kids.len() == 1))
                    .and_then(|parent| previous.get(&parent).copied());
                if let Some(id) = inherited {
                    assigned.insert(child, id);
                } else {
                    fresh.insert(child);
                }
            }
        }

        if !fresh.is_empty() {
            depth += 1;
            for label in &fresh {
                next_id += 1;
                let id = ClusterId::new(next_id);
                assigned.insert(*label, next_id);
                depths.insert(id, depth);
                births.entry(depth).or_default().insert(id);
                branch_rows.insert(id, row);
            }
        }

        for (cell, label) in labels.row_mut(row).iter_mut().zip(current) {
            *cell = assigned.get(label).copied().unwrap_or(0);
        }
        previous = assigned;
    }

    Combined {
        labels,
        depths,
        births,
        branch_rows,
    }
}
