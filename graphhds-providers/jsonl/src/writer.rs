//! Serialisation of hierarchy artifacts for the GeneDIVER viewer.
//!
//! Every per-node artifact lists nodes in the hierarchy's display order and
//! identifies them by external id.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use graphhds_core::{ClusterId, HdsResult, SimilarityGraph};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{errors::JsonlProviderError, reader::ClusterLabels};

type Result<T> = core::result::Result<T, JsonlProviderError>;

/// One cell of a label matrix artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabelRecord {
    /// Matrix row, or the compact birth depth in the clusters artifact.
    pub level: usize,
    /// External node id.
    pub id: u64,
    /// Combined cluster label; `0` is background.
    pub label: u32,
}

/// Score of one cluster.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StabilityRecord {
    /// Cluster id.
    pub label: u32,
    /// Score used during deduplication.
    pub stability: f64,
}

/// Membership of one node in the flat partition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DedupedRecord {
    /// External node id.
    pub id: u64,
    /// Selected cluster id.
    pub label: u32,
}

/// Writes the artifacts of one run.
///
/// # Examples
/// ```
/// use graphhds_core::{GraphBuilder, GraphHdsBuilder};
/// use graphhds_providers_jsonl::ArtifactWriter;
///
/// let mut builder = GraphBuilder::new("pair");
/// builder.add_record(1, [(2, 1.0)])?;
/// let graph = builder.build()?;
/// let result = GraphHdsBuilder::new().with_min_flow(0.0).build()?.run(&graph)?;
///
/// let mut hds = Vec::new();
/// ArtifactWriter::new(&graph, &result).write_hds(&mut hds)?;
/// assert_eq!(String::from_utf8_lossy(&hds).lines().count(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct ArtifactWriter<'a> {
    graph: &'a SimilarityGraph,
    result: &'a HdsResult,
    order: Vec<usize>,
    cluster_labels: Option<ClusterLabels>,
}

impl<'a> ArtifactWriter<'a> {
    /// Hierarchy in the viewer's text format.
    pub const HDS_FILE: &'static str = "graph.hds";
    /// One-based index of the presorted hierarchy.
    pub const INDEX_FILE: &'static str = "graph_sorted.idx";
    /// Node descriptions.
    pub const DESCRIPTION_FILE: &'static str = "graph.dsc";
    /// Empty data file the viewer expects.
    pub const DATA_FILE: &'static str = "graph.txt";
    /// Every cell of the combined label matrix.
    pub const LABEL_MATRIX_FILE: &'static str = "full_label_matrix.jsonl";
    /// Members of each cluster at its birth row.
    pub const CLUSTERS_FILE: &'static str = "graph.clusters.jsonl";
    /// Cluster scores.
    pub const STABILITIES_FILE: &'static str = "graph.stabilities.jsonl";
    /// Flat partition.
    pub const DEDUPED_FILE: &'static str = "graph.deduped.jsonl";
    /// Known labels per node, written only when labels are supplied.
    pub const CLUSTER_LABELS_FILE: &'static str = "graph_cluster_labels.txt";

    /// Pairs a run result with the graph it was computed on.
    #[must_use]
    pub fn new(graph: &'a SimilarityGraph, result: &'a HdsResult) -> Self {
        Self {
            graph,
            result,
            order: result.hierarchy().sort_order(),
            cluster_labels: None,
        }
    }

    /// Adds known cluster labels; nodes without one are written as `0`.
    /// An empty map writes no labels artifact.
    #[must_use]
    pub fn with_cluster_labels(mut self, labels: ClusterLabels) -> Self {
        self.cluster_labels = Some(labels).filter(|labels| !labels.is_empty());
        self
    }

    fn node_key(&self, node: usize) -> String {
        self.graph
            .description(node)
            .unwrap_or_else(|| self.external_id(node).to_string())
    }

    fn external_id(&self, node: usize) -> u64 {
        self.graph.external_id(node).unwrap_or_default()
    }

    /// Writes every artifact into `dir`, creating it when missing.
    ///
    /// # Errors
    /// Returns [`JsonlProviderError::Open`] when the directory or a file
    /// cannot be created and [`JsonlProviderError::Io`] when writing fails.
    #[instrument(
        name = "jsonl.write_artifacts",
        err,
        skip(self),
        fields(graph = self.graph.name(), rows = self.result.retained_levels()),
    )]
    pub fn write_all(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).map_err(|source| JsonlProviderError::Open {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut written = vec![
            self.emit(dir, Self::HDS_FILE, |out| self.write_hds(out))?,
            self.emit(dir, Self::INDEX_FILE, |out| self.write_index(out))?,
            self.emit(dir, Self::DESCRIPTION_FILE, |out| self.write_descriptions(out))?,
            self.emit(dir, Self::DATA_FILE, |_| Ok(()))?,
            self.emit(dir, Self::LABEL_MATRIX_FILE, |out| self.write_label_matrix(out))?,
            self.emit(dir, Self::CLUSTERS_FILE, |out| self.write_clusters(out))?,
            self.emit(dir, Self::STABILITIES_FILE, |out| self.write_stabilities(out))?,
            self.emit(dir, Self::DEDUPED_FILE, |out| self.write_deduped(out))?,
        ];
        if let Some(labels) = &self.cluster_labels {
            written.push(self.emit(dir, Self::CLUSTER_LABELS_FILE, |out| {
                self.write_cluster_labels(out, labels)
            })?);
        }
        Ok(written)
    }

    fn emit<F>(&self, dir: &Path, name: &str, write: F) -> Result<PathBuf>
    where
        F: FnOnce(&mut BufWriter<File>) -> Result<()>,
    {
        let path = dir.join(name);
        let file = File::create(&path).map_err(|source| JsonlProviderError::Open {
            path: path.clone(),
            source,
        })?;
        let mut out = BufWriter::new(file);
        write(&mut out)?;
        out.flush()?;
        debug!(path = %path.display(), "wrote artifact");
        Ok(path)
    }

    /// Space-separated combined labels of every row, one node per line.
    ///
    /// # Errors
    /// Returns [`JsonlProviderError::Io`] when writing fails.
    pub fn write_hds<W: Write>(&self, mut out: W) -> Result<()> {
        let labels = self.result.hierarchy().labels();
        for &node in &self.order {
            let column: Vec<String> = labels.column(node).iter().map(u32::to_string).collect();
            writeln!(out, "{}", column.join(" "))?;
        }
        Ok(())
    }

    /// `1..=N`, one per line.
    ///
    /// # Errors
    /// Returns [`JsonlProviderError::Io`] when writing fails.
    pub fn write_index<W: Write>(&self, mut out: W) -> Result<()> {
        for position in 1..=self.order.len() {
            writeln!(out, "{position}")?;
        }
        Ok(())
    }

    /// Original identifier of each node, falling back to its external id.
    ///
    /// # Errors
    /// Returns [`JsonlProviderError::Io`] when writing fails.
    pub fn write_descriptions<W: Write>(&self, mut out: W) -> Result<()> {
        for &node in &self.order {
            writeln!(out, "{}", self.node_key(node))?;
        }
        Ok(())
    }

    /// `<identifier>,<label>` per node, with `0` for nodes missing from
    /// `labels`. Identifiers match the `.dsc` artifact.
    ///
    /// # Errors
    /// Returns [`JsonlProviderError::Io`] when writing fails.
    pub fn write_cluster_labels<W: Write>(&self, mut out: W, labels: &ClusterLabels) -> Result<()> {
        for &node in &self.order {
            let key = self.node_key(node);
            let label = labels.get(&key).map_or("0", String::as_str);
            writeln!(out, "{key},{label}")?;
        }
        Ok(())
    }

    /// Every `(row, node)` cell of the combined matrix.
    ///
    /// # Errors
    /// Returns [`JsonlProviderError::Io`] or [`JsonlProviderError::Encode`].
    pub fn write_label_matrix<W: Write>(&self, mut out: W) -> Result<()> {
        for (level, row) in self.result.hierarchy().labels().iter_rows().enumerate() {
            for &node in &self.order {
                let label = row.get(node).copied().unwrap_or_default();
                write_line(&mut out, &LabelRecord {
                    level,
                    id: self.external_id(node),
                    label,
                })?;
            }
        }
        Ok(())
    }

    /// Members of each cluster at the row where it was born, tagged with the
    /// compact birth depth.
    ///
    /// # Errors
    /// Returns [`JsonlProviderError::Io`] or [`JsonlProviderError::Encode`].
    pub fn write_clusters<W: Write>(&self, mut out: W) -> Result<()> {
        let hierarchy = self.result.hierarchy();
        for (row_index, row) in hierarchy.labels().iter_rows().enumerate() {
            let born = hierarchy.born_at(row_index);
            if born.is_empty() {
                continue;
            }
            for &node in &self.order {
                let Some(&label) = row.get(node) else {
                    continue;
                };
                let id = ClusterId::new(label);
                if label == 0 || !born.contains(&id) {
                    continue;
                }
                let depth = hierarchy.depth_of(id).unwrap_or_default();
                write_line(&mut out, &LabelRecord {
                    level: depth as usize,
                    id: self.external_id(node),
                    label,
                })?;
            }
        }
        Ok(())
    }

    /// Score of every exported cluster.
    ///
    /// # Errors
    /// Returns [`JsonlProviderError::Io`] or [`JsonlProviderError::Encode`].
    pub fn write_stabilities<W: Write>(&self, mut out: W) -> Result<()> {
        for (id, &stability) in self.result.stabilities() {
            write_line(&mut out, &StabilityRecord {
                label: id.get(),
                stability,
            })?;
        }
        Ok(())
    }

    /// Node memberships of the flat partition.
    ///
    /// # Errors
    /// Returns [`JsonlProviderError::Io`] or [`JsonlProviderError::Encode`].
    pub fn write_deduped<W: Write>(&self, mut out: W) -> Result<()> {
        for (id, members) in self.result.partition().clusters() {
            for &node in members {
                write_line(&mut out, &DedupedRecord {
                    id: self.external_id(node),
                    label: id.get(),
                })?;
            }
        }
        Ok(())
    }
}

fn write_line<W: Write, T: Serialize>(out: &mut W, record: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, record).map_err(JsonlProviderError::Encode)?;
    out.write_all(b"\n")?;
    Ok(())
}
