//! JSONL provider for graph HDS.
//!
//! Reads adjacency records and the optional node mapping into a
//! [`graphhds_core::SimilarityGraph`], and writes the hierarchy artifacts
//! consumed by the GeneDIVER viewer.

mod errors;
mod reader;
mod writer;

pub use errors::JsonlProviderError;
pub use reader::{
    ClusterLabelRecord, ClusterLabels, GraphLoader, GraphRecord, LabelKey, MappingRow,
    load_cluster_labels, read_cluster_labels, read_mapping, read_records,
};
pub use writer::{ArtifactWriter, DedupedRecord, LabelRecord, StabilityRecord};
