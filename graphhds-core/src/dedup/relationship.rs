//! Pairwise containment checks between hierarchy clusters.

use std::collections::{BTreeMap, BTreeSet, HashMap};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{Result, error::GraphHdsError, result::ClusterId};

/// How two clusters relate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relationship {
    /// The clusters share no member.
    Unrelated,
    /// `ancestor` contains every member of `descendant`. Equal member sets
    /// make the larger id the ancestor.
    Contains {
        /// The enclosing cluster.
        ancestor: ClusterId,
        /// The enclosed cluster.
        descendant: ClusterId,
    },
}

/// Classifies `(left, right)` with `left < right`.
pub(crate) fn relate(
    left: (ClusterId, &BTreeSet<usize>),
    right: (ClusterId, &BTreeSet<usize>),
) -> Result<Relationship> {
    let (left_id, left_members) = left;
    let (right_id, right_members) = right;
    let (small, large) = if left_members.len() <= right_members.len() {
        (left_members, right_members)
    } else {
        (right_members, left_members)
    };
    let shared = small.iter().filter(|node| large.contains(node)).count();
    if shared == 0 {
        Ok(Relationship::Unrelated)
    } else if shared == left_members.len() {
        Ok(Relationship::Contains {
            ancestor: right_id,
            descendant: left_id,
        })
    } else if shared == right_members.len() {
        Ok(Relationship::Contains {
            ancestor: left_id,
            descendant: right_id,
        })
    } else {
        Err(GraphHdsError::PartialOverlap {
            left: left_id,
            right: right_id,
        })
    }
}

/// Relationship of every cluster pair, owned by one deduplication run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelationshipCache {
    pairs: HashMap<(ClusterId, ClusterId), Relationship>,
    ancestors: BTreeMap<ClusterId, BTreeSet<ClusterId>>,
    descendants: BTreeMap<ClusterId, BTreeSet<ClusterId>>,
}

impl RelationshipCache {
    /// Scans every unordered pair of `clusters`.
    ///
    /// # Errors
    /// Returns [`GraphHdsError::PartialOverlap`] for the first offending pair
    /// in id order.
    pub fn scan(clusters: &BTreeMap<ClusterId, BTreeSet<usize>>) -> Result<Self> {
        let entries: Vec<(ClusterId, &BTreeSet<usize>)> =
            clusters.iter().map(|(&id, members)| (id, members)).collect();
        let pairs: Vec<(usize, usize)> = (0..entries.len())
            .flat_map(|i| ((i + 1)..entries.len()).map(move |j| (i, j)))
            .collect();

        let classify = |&(i, j): &(usize, usize)| relate(entries[i], entries[j]);
        #[cfg(feature = "parallel")]
        let outcomes: Vec<Result<Relationship>> = pairs.par_iter().map(classify).collect();
        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<Result<Relationship>> = pairs.iter().map(classify).collect();

        let mut cache = Self::default();
        for (&(i, j), outcome) in pairs.iter().zip(outcomes) {
            cache.record(entries[i].0, entries[j].0, outcome?);
        }
        Ok(cache)
    }

    fn record(&mut self, left: ClusterId, right: ClusterId, relationship: Relationship) {
        if let Relationship::Contains {
            ancestor,
            descendant,
        } = relationship
        {
            self.descendants.entry(ancestor).or_default().insert(descendant);
            self.ancestors.entry(descendant).or_default().insert(ancestor);
        }
        self.pairs.insert((left, right), relationship);
    }

    /// Cached relationship between two clusters, in either order.
    #[must_use]
    pub fn get(&self, a: ClusterId, b: ClusterId) -> Option<Relationship> {
        self.pairs.get(&(a.min(b), a.max(b))).copied()
    }

    /// Number of cached pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` when no pair was scanned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Clusters containing `id`.
    pub fn ancestors(&self, id: ClusterId) -> impl Iterator<Item = ClusterId> + '_ {
        self.ancestors.get(&id).into_iter().flatten().copied()
    }

    /// Clusters contained in `id`.
    pub fn descendants(&self, id: ClusterId) -> impl Iterator<Item = ClusterId> + '_ {
        self.descendants.get(&id).into_iter().flatten().copied()
    }

    /// Ancestors and descendants of `id`.
    pub fn relatives(&self, id: ClusterId) -> impl Iterator<Item = ClusterId> + '_ {
        self.ancestors(id).chain(self.descendants(id))
    }
}
