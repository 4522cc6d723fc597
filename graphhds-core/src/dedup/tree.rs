//! Arena of hierarchy clusters with explicit parent links.

use std::collections::{BTreeMap, BTreeSet};

use super::relationship::RelationshipCache;
use crate::result::ClusterId;

#[derive(Clone, Debug, PartialEq, Eq)]
struct TreeNode {
    id: ClusterId,
    size: usize,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Containment tree over deduplication candidates.
///
/// A cluster's parent is its smallest ancestor (ties broken by id), so the
/// tree is the transitive reduction of the containment relation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterTree {
    nodes: Vec<TreeNode>,
    slots: BTreeMap<ClusterId, usize>,
}

impl ClusterTree {
    pub(super) fn build(
        clusters: &BTreeMap<ClusterId, BTreeSet<usize>>,
        relationships: &RelationshipCache,
    ) -> Self {
        let slots: BTreeMap<ClusterId, usize> = clusters
            .keys()
            .enumerate()
            .map(|(slot, &id)| (id, slot))
            .collect();
        let size_of = |id: ClusterId| clusters.get(&id).map_or(0, BTreeSet::len);

        let mut nodes: Vec<TreeNode> = clusters
            .iter()
            .map(|(&id, members)| TreeNode {
                id,
                size: members.len(),
                parent: None,
                children: Vec::new(),
            })
            .collect();

        for slot in 0..nodes.len() {
            let id = nodes[slot].id;
            let parent = relationships
                .ancestors(id)
                .min_by_key(|&ancestor| (size_of(ancestor), ancestor))
                .and_then(|ancestor| slots.get(&ancestor).copied());
            if let Some(parent) = parent {
                nodes[slot].parent = Some(parent);
                nodes[parent].children.push(slot);
            }
        }

        Self { nodes, slots }
    }

    /// Number of clusters in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` when the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Clusters without an ancestor, in id order.
    #[must_use]
    pub fn roots(&self) -> Vec<ClusterId> {
        self.nodes
            .iter()
            .filter(|node| node.parent.is_none())
            .map(|node| node.id)
            .collect()
    }

    /// Immediate parent of `id`.
    #[must_use]
    pub fn parent(&self, id: ClusterId) -> Option<ClusterId> {
        let slot = *self.slots.get(&id)?;
        self.nodes[slot].parent.map(|parent| self.nodes[parent].id)
    }

    /// Immediate children of `id`, in id order.
    #[must_use]
    pub fn children(&self, id: ClusterId) -> Vec<ClusterId> {
        self.slots
            .get(&id)
            .map(|&slot| {
                self.nodes[slot]
                    .children
                    .iter()
                    .map(|&child| self.nodes[child].id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Member count of `id`.
    #[must_use]
    pub fn size(&self, id: ClusterId) -> Option<usize> {
        self.slots.get(&id).map(|&slot| self.nodes[slot].size)
    }

    /// Number of ancestors between `id` and its root.
    #[must_use]
    pub fn depth(&self, id: ClusterId) -> Option<usize> {
        let mut slot = *self.slots.get(&id)?;
        let mut depth = 0;
        while let Some(parent) = self.nodes[slot].parent {
            depth += 1;
            slot = parent;
        }
        Some(depth)
    }
}
