use graphhds_core::{GraphBuilder, SimilarityGraph};

/// Builds a graph from `(left, right, weight)` triples in load order.
#[must_use]
pub fn graph_from_edges(name: &str, edges: &[(u64, u64, f64)]) -> SimilarityGraph {
    let mut builder = GraphBuilder::new(name);
    for &(left, right, weight) in edges {
        builder
            .add_record(left, [(right, weight)])
            .expect("fixture weights are finite");
    }
    builder.build().expect("fixture graph must build")
}

/// Triangle `{0, 1, 2}` at `0.9` plus the weak pair `3 - 4`.
#[must_use]
pub fn triangle_with_pair() -> SimilarityGraph {
    graph_from_edges(
        "triangle-with-pair",
        &[(0, 1, 0.9), (1, 2, 0.9), (0, 2, 0.9), (3, 4, 0.1)],
    )
}

/// Two triangles of different strength joined by a weak bridge.
#[must_use]
pub fn bridged_triangles() -> SimilarityGraph {
    graph_from_edges(
        "bridged-triangles",
        &[
            (0, 1, 0.9),
            (1, 2, 0.9),
            (0, 2, 0.9),
            (3, 4, 0.8),
            (4, 5, 0.8),
            (3, 5, 0.8),
            (2, 3, 0.1),
        ],
    )
}
