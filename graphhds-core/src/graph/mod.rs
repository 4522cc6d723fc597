//! Immutable weighted similarity graph and the builder that assembles it.
//!
//! Edges are undirected and stored once in canonical `(min, max)` order.
//! Nodes are re-indexed contiguously by sorting their external ids so label
//! matrices can be stored densely.

mod weights;

use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    sync::Arc,
};

use tracing::{debug, warn};

use crate::{
    Result,
    error::{GraphError, GraphHdsError},
};

pub use self::weights::WeightScale;

/// A canonical undirected edge between two internal node indices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    source: usize,
    target: usize,
    weight: f64,
}

impl Edge {
    /// Returns the smaller endpoint index.
    #[must_use]
    #[rustfmt::skip]
    pub const fn source(&self) -> usize { self.source }

    /// Returns the larger endpoint index.
    #[must_use]
    #[rustfmt::skip]
    pub const fn target(&self) -> usize { self.target }

    /// Returns the similarity weight.
    #[must_use]
    #[rustfmt::skip]
    pub const fn weight(&self) -> f64 { self.weight }

    /// Returns the endpoint opposite `node`, or `None` when `node` is not an
    /// endpoint of this edge.
    #[must_use]
    pub const fn other(&self, node: usize) -> Option<usize> {
        if node == self.source {
            Some(self.target)
        } else if node == self.target {
            Some(self.source)
        } else {
            None
        }
    }
}

/// Weighted undirected similarity graph with normalized node weights.
///
/// # Examples
/// ```
/// use graphhds_core::GraphBuilder;
///
/// let mut builder = GraphBuilder::new("demo");
/// builder.add_record(42, [(7, 0.5)])?;
/// let graph = builder.build()?;
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.external_id(0), Some(7));
/// assert_eq!(graph.index_of(42), Some(1));
/// # Ok::<(), graphhds_core::GraphHdsError>(())
/// ```
#[derive(Clone, Debug)]
pub struct SimilarityGraph {
    name: Arc<str>,
    external_ids: Vec<u64>,
    descriptions: Vec<Option<String>>,
    weights: Vec<f64>,
    edges: Vec<Edge>,
}

impl SimilarityGraph {
    /// Returns the graph name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.external_ids.len()
    }

    /// Number of distinct undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All edges in load order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the edge stored at `index`.
    #[must_use]
    pub fn edge(&self, index: usize) -> Option<&Edge> {
        self.edges.get(index)
    }

    /// Returns the normalized weight of `node`, or `0.0` when out of range.
    #[must_use]
    pub fn weight(&self, node: usize) -> f64 {
        self.weights.get(node).copied().unwrap_or(0.0)
    }

    /// All normalized node weights indexed by internal node index.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Returns the external integer id of `node`.
    #[must_use]
    pub fn external_id(&self, node: usize) -> Option<u64> {
        self.external_ids.get(node).copied()
    }

    /// Returns the internal index assigned to `external_id`.
    #[must_use]
    pub fn index_of(&self, external_id: u64) -> Option<usize> {
        self.external_ids.binary_search(&external_id).ok()
    }

    /// Returns the human-facing identifier of `node`: the original string id
    /// from the node mapping when one was supplied, otherwise the external
    /// integer id.
    #[must_use]
    pub fn description(&self, node: usize) -> Option<String> {
        match self.descriptions.get(node) {
            Some(Some(text)) => Some(text.clone()),
            Some(None) => self.external_id(node).map(|id| id.to_string()),
            None => None,
        }
    }
}

/// Collects node records and produces a [`SimilarityGraph`].
///
/// Reciprocal edges may be declared from either side; the first declaration
/// of a pair wins. Self-edges are dropped with a warning.
///
/// # Examples
/// ```
/// use graphhds_core::{GraphBuilder, WeightScale};
///
/// let mut builder = GraphBuilder::new("weighted").with_weight_scale(WeightScale::Linear);
/// builder.add_record(1, [(2, 0.8), (1, 1.0)])?;
/// builder.add_record(2, [(1, 0.8)])?;
/// builder.set_node_weight(1, 1.0);
/// builder.set_node_weight(2, 3.0);
/// let graph = builder.build()?;
/// assert_eq!(graph.edge_count(), 1);
/// assert_eq!(graph.weights(), &[0.5, 1.5]);
/// # Ok::<(), graphhds_core::GraphHdsError>(())
/// ```
#[derive(Clone, Debug)]
pub struct GraphBuilder {
    name: Arc<str>,
    scale: WeightScale,
    nodes: BTreeSet<u64>,
    edges: Vec<(u64, u64, f64)>,
    seen: HashSet<(u64, u64)>,
    raw_weights: BTreeMap<u64, f64>,
    descriptions: BTreeMap<u64, String>,
    self_edges: usize,
}

impl GraphBuilder {
    /// Creates an empty builder for a graph called `name`.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            scale: WeightScale::Linear,
            nodes: BTreeSet::new(),
            edges: Vec::new(),
            seen: HashSet::new(),
            raw_weights: BTreeMap::new(),
            descriptions: BTreeMap::new(),
            self_edges: 0,
        }
    }

    /// Selects how raw node weights are rescaled before normalization.
    #[must_use]
    pub fn with_weight_scale(mut self, scale: WeightScale) -> Self {
        self.scale = scale;
        self
    }

    /// Adds the adjacency record of node `id`.
    ///
    /// # Errors
    /// Returns [`GraphHdsError::Graph`] wrapping
    /// [`GraphError::NonFiniteEdgeWeight`] when a connection weight is NaN or
    /// infinite. A rejected record leaves the builder untouched.
    pub fn add_record<I>(&mut self, id: u64, connections: I) -> Result<()>
    where
        I: IntoIterator<Item = (u64, f64)>,
    {
        let connections: Vec<(u64, f64)> = connections.into_iter().collect();
        if let Some(&(neighbour, weight)) =
            connections.iter().find(|(_, weight)| !weight.is_finite())
        {
            return Err(GraphHdsError::Graph {
                graph: Arc::clone(&self.name),
                error: GraphError::NonFiniteEdgeWeight {
                    left: id,
                    right: neighbour,
                    weight,
                },
            });
        }

        self.nodes.insert(id);
        for (neighbour, weight) in connections {
            if neighbour == id {
                self.self_edges += 1;
                warn!(node = id, "dropping self-edge; fix the input graph");
                continue;
            }
            self.nodes.insert(neighbour);
            let key = (id.min(neighbour), id.max(neighbour));
            if self.seen.insert(key) {
                self.edges.push((key.0, key.1, weight));
            }
        }
        Ok(())
    }

    /// Records the raw weight of node `id`. Weights only take effect when at
    /// least one is supplied and the scale is not [`WeightScale::Uniform`].
    pub fn set_node_weight(&mut self, id: u64, raw_weight: f64) {
        self.raw_weights.insert(id, raw_weight);
    }

    /// Records the original string identifier of node `id`.
    pub fn set_description(&mut self, id: u64, description: impl Into<String>) {
        self.descriptions.insert(id, description.into());
    }

    /// Number of self-edges dropped so far.
    #[must_use]
    pub fn self_edges_dropped(&self) -> usize {
        self.self_edges
    }

    /// Validates and freezes the graph.
    ///
    /// # Errors
    /// Returns [`GraphHdsError::Graph`] wrapping [`GraphError::EmptyGraph`]
    /// when no node was declared, [`GraphError::MissingNodeWeight`] when
    /// weights were supplied but a node lacks one, and
    /// [`GraphError::InvalidNodeWeight`] when rescaling yields a negative or
    /// non-finite weight.
    pub fn build(self) -> Result<SimilarityGraph> {
        let name = Arc::clone(&self.name);
        self.build_inner().map_err(|error| GraphHdsError::Graph { graph: name, error })
    }

    fn build_inner(self) -> core::result::Result<SimilarityGraph, GraphError> {
        if self.nodes.is_empty() {
            return Err(GraphError::EmptyGraph);
        }
        let external_ids: Vec<u64> = self.nodes.into_iter().collect();
        let weights = if self.raw_weights.is_empty() {
            vec![1.0; external_ids.len()]
        } else {
            weights::normalize(&external_ids, &self.raw_weights, self.scale)?
        };

        let index = |id: u64| external_ids.binary_search(&id).unwrap_or_default();
        let edges = self
            .edges
            .iter()
            .map(|&(left, right, weight)| Edge {
                source: index(left),
                target: index(right),
                weight,
            })
            .collect();

        let descriptions = external_ids
            .iter()
            .map(|id| self.descriptions.get(id).cloned())
            .collect();

        debug!(
            graph = %self.name,
            nodes = external_ids.len(),
            edges = self.edges.len(),
            self_edges = self.self_edges,
            "graph assembled"
        );
        Ok(SimilarityGraph {
            name: self.name,
            external_ids,
            descriptions,
            weights,
            edges,
        })
    }
}
