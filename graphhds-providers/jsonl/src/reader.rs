//! Parsing of JSONL adjacency records and the TSV node mapping.

use std::{
    collections::BTreeMap,
    fmt,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use graphhds_core::{GraphBuilder, SimilarityGraph, WeightScale};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use crate::errors::JsonlProviderError;

type Result<T> = core::result::Result<T, JsonlProviderError>;

/// One line of the graph file: a node and its weighted neighbours.
///
/// # Examples
/// ```
/// use graphhds_providers_jsonl::GraphRecord;
///
/// let record: GraphRecord = serde_json::from_str(r#"{"id": 3, "connections": [[4, 0.5]]}"#)?;
/// assert_eq!(record.connections, vec![(4, 0.5)]);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GraphRecord {
    /// External node id.
    pub id: u64,
    /// `(neighbour, similarity)` pairs.
    pub connections: Vec<(u64, f64)>,
}

/// One row of the node mapping file.
#[derive(Clone, Debug, PartialEq)]
pub struct MappingRow {
    /// External node id as used in the graph file.
    pub id: u64,
    /// Original string identifier of the node.
    pub original: String,
    /// Raw node weight before rescaling.
    pub weight: f64,
}

/// Node id or label in a cluster labels file; either a number or a string.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum LabelKey {
    /// Integer form.
    Number(u64),
    /// String form.
    Text(String),
}

impl fmt::Display for LabelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// One line of a sparse cluster labels file.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ClusterLabelRecord {
    /// Node identifier as shown in the `.dsc` artifact.
    pub id: LabelKey,
    /// Known cluster label of the node.
    pub label: LabelKey,
}

/// Known labels keyed by node identifier, both in their text form.
pub type ClusterLabels = BTreeMap<String, String>;

/// Reads graph records, skipping blank lines.
///
/// # Errors
/// Returns [`JsonlProviderError::Record`] with the one-based line number of
/// the first malformed record, or [`JsonlProviderError::Io`] when reading
/// fails.
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<GraphRecord>> {
    read_jsonl(reader)
}

/// Reads `{"id", "label"}` lines. Later lines win for repeated ids.
///
/// # Errors
/// Returns [`JsonlProviderError::Record`] with the one-based line number of
/// the first malformed line, or [`JsonlProviderError::Io`] when reading fails.
///
/// # Examples
/// ```
/// use graphhds_providers_jsonl::read_cluster_labels;
///
/// let labels = read_cluster_labels("{\"id\": \"P1\", \"label\": 4}\n".as_bytes())?;
/// assert_eq!(labels.get("P1").map(String::as_str), Some("4"));
/// # Ok::<(), graphhds_providers_jsonl::JsonlProviderError>(())
/// ```
pub fn read_cluster_labels<R: BufRead>(reader: R) -> Result<ClusterLabels> {
    let records: Vec<ClusterLabelRecord> = read_jsonl(reader)?;
    Ok(records
        .into_iter()
        .map(|record| (record.id.to_string(), record.label.to_string()))
        .collect())
}

/// Opens and reads a cluster labels file.
///
/// # Errors
/// Returns [`JsonlProviderError::Open`] when the file cannot be opened and
/// propagates [`read_cluster_labels`] failures.
pub fn load_cluster_labels(path: &Path) -> Result<ClusterLabels> {
    read_cluster_labels(open(path)?)
}

fn read_jsonl<R: BufRead, T: DeserializeOwned>(reader: R) -> Result<Vec<T>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record = serde_json::from_str(trimmed).map_err(|source| JsonlProviderError::Record {
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Reads `<node id>\t<original id>\t<raw weight>` rows.
///
/// # Errors
/// Returns [`JsonlProviderError::MappingColumns`] for rows without exactly
/// three columns and [`JsonlProviderError::MappingField`] when the id or
/// weight does not parse.
///
/// # Examples
/// ```
/// use graphhds_providers_jsonl::read_mapping;
///
/// let rows = read_mapping("7\tP12345\t2.5\n".as_bytes())?;
/// assert_eq!(rows[0].original, "P12345");
/// assert_eq!(rows[0].weight, 2.5);
/// # Ok::<(), graphhds_providers_jsonl::JsonlProviderError>(())
/// ```
pub fn read_mapping<R: BufRead>(reader: R) -> Result<Vec<MappingRow>> {
    let mut rows = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        let columns: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        let [id, original, weight] = columns.as_slice() else {
            return Err(JsonlProviderError::MappingColumns {
                line: number,
                found: columns.len(),
            });
        };
        let field_error = |field: &'static str, value: &str| JsonlProviderError::MappingField {
            line: number,
            field,
            value: value.to_owned(),
        };
        rows.push(MappingRow {
            id: id.trim().parse().map_err(|_| field_error("id", id))?,
            original: original.trim().to_owned(),
            weight: weight.trim().parse().map_err(|_| field_error("weight", weight))?,
        });
    }
    Ok(rows)
}

/// Assembles a [`SimilarityGraph`] from JSONL input.
///
/// # Examples
/// ```
/// use graphhds_core::WeightScale;
/// use graphhds_providers_jsonl::GraphLoader;
///
/// let graph = GraphLoader::new("demo")
///     .with_weight_scale(WeightScale::Linear)
///     .load_from_readers(
///         "{\"id\": 1, \"connections\": [[2, 0.9]]}\n".as_bytes(),
///         Some("1\talpha\t1.0\n2\tbeta\t3.0\n".as_bytes()),
///     )?;
/// assert_eq!(graph.weights(), &[0.5, 1.5]);
/// assert_eq!(graph.description(1).as_deref(), Some("beta"));
/// # Ok::<(), graphhds_providers_jsonl::JsonlProviderError>(())
/// ```
#[derive(Clone, Debug)]
pub struct GraphLoader {
    name: String,
    scale: WeightScale,
}

impl GraphLoader {
    /// Creates a loader for a graph called `name` using linear weights.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scale: WeightScale::Linear,
        }
    }

    /// Selects how mapping weights are rescaled.
    #[must_use]
    pub fn with_weight_scale(mut self, scale: WeightScale) -> Self {
        self.scale = scale;
        self
    }

    /// Name given to loaded graphs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads the graph file and, when given, the mapping file.
    ///
    /// # Errors
    /// Returns [`JsonlProviderError::Open`] when a file cannot be opened and
    /// propagates parse and graph assembly failures.
    #[instrument(
        name = "jsonl.load_graph",
        err,
        skip(self),
        fields(name = %self.name, scale = ?self.scale),
    )]
    pub fn load_graph(&self, graph: &Path, mapping: Option<&Path>) -> Result<SimilarityGraph> {
        let graph_reader = open(graph)?;
        let mapping_reader = mapping.map(open).transpose()?;
        self.load_from_readers(graph_reader, mapping_reader)
    }

    /// Assembles a graph from already opened streams.
    ///
    /// # Errors
    /// Propagates record, mapping, and graph assembly failures.
    pub fn load_from_readers<G, M>(&self, graph: G, mapping: Option<M>) -> Result<SimilarityGraph>
    where
        G: BufRead,
        M: BufRead,
    {
        let records = read_records(graph)?;
        let mut builder = GraphBuilder::new(&self.name).with_weight_scale(self.scale);
        for record in &records {
            builder.add_record(record.id, record.connections.iter().copied())?;
        }
        if let Some(reader) = mapping {
            let rows = read_mapping(reader)?;
            debug!(rows = rows.len(), "read node mapping");
            for row in rows {
                builder.set_node_weight(row.id, row.weight);
                builder.set_description(row.id, row.original);
            }
        }
        debug!(
            records = records.len(),
            self_edges = builder.self_edges_dropped(),
            "read graph records"
        );
        Ok(builder.build()?)
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| JsonlProviderError::Open {
            path: path.to_path_buf(),
            source,
        })
}
