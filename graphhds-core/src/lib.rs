//! Graph HDS core library.
//!
//! Density-based hierarchical clustering over weighted similarity graphs:
//! edges are revealed in weight-descending groups, two-hop flow accumulates
//! on nodes, dense nodes are flood-filled into clusters at each level, and
//! the levels are combined into one hierarchy that is flattened by stability.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod dedup;
mod error;
mod flow;
mod graph;
mod hds;
mod hierarchy;
mod level;
mod processor;
mod result;
mod schedule;
#[cfg(test)]
mod test_utils;

pub use crate::{
    builder::GraphHdsBuilder,
    dedup::{ClusterDeduper, ClusterTree, DedupedPartition, Relationship, RelationshipCache},
    error::{GraphError, GraphErrorCode, GraphHdsError, GraphHdsErrorCode, Result},
    flow::{FlowState, RevealSummary},
    graph::{Edge, GraphBuilder, SimilarityGraph, WeightScale},
    hds::GraphHds,
    hierarchy::{
        LabelMatrix, LevelConfig, LevelHierarchy, LevelOutcome, LevelSummary, build_levels,
    },
    level::{ClusterPolicy, LevelClusters, cluster_level},
    processor::{CombinedHierarchy, ShavingOrder, StabilityMeasure, density_sorted},
    result::{ClusterId, HdsResult},
    schedule::{PruneGroup, ShaveSchedule},
};
