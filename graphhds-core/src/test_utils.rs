//! Shared fixtures and generators for `graphhds-core` unit tests.

use graphhds_test_support::proptest_profile::ProptestRunProfile;
use proptest::{prelude::*, test_runner::Config as ProptestConfig};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use test_strategy::Arbitrary;

use crate::graph::{GraphBuilder, SimilarityGraph};

const DEFAULT_CASES: u32 = 64;

/// Proptest configuration honouring the shared environment profile.
pub(crate) fn proptest_config() -> ProptestConfig {
    let profile = ProptestRunProfile::from_env(DEFAULT_CASES);
    ProptestConfig {
        cases: profile.cases(),
        max_shrink_iters: profile.max_shrink_iters(),
        ..ProptestConfig::default()
    }
}

/// Builds a graph from `(left, right, weight)` triples.
pub(crate) fn graph_from_edges(name: &str, edges: &[(u64, u64, f64)]) -> SimilarityGraph {
    let mut builder = GraphBuilder::new(name);
    for &(left, right, weight) in edges {
        builder
            .add_record(left, [(right, weight)])
            .expect("fixture weights are finite");
    }
    builder.build().expect("fixture graph must build")
}

/// Triangle `{0, 1, 2}` at similarity `0.9` plus the weak pair `3 - 4`.
pub(crate) fn triangle_with_pair() -> SimilarityGraph {
    graph_from_edges(
        "triangle-with-pair",
        &[(0, 1, 0.9), (1, 2, 0.9), (0, 2, 0.9), (3, 4, 0.1)],
    )
}

/// Topology family for generated graphs.
#[derive(Clone, Copy, Debug, Arbitrary)]
pub(crate) enum GraphShape {
    /// Each pair is connected with a fixed probability.
    #[weight(3)]
    Random,
    /// Dense blocks with sparse, weak links between them.
    #[weight(3)]
    Planted,
    /// One hub linked to every other node.
    #[weight(1)]
    Star,
}

fn generate(shape: GraphShape, nodes: u64, seed: u64) -> SimilarityGraph {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut edges = Vec::new();
    match shape {
        GraphShape::Random => {
            for left in 0..nodes {
                for right in (left + 1)..nodes {
                    if rng.gen_bool(0.3) {
                        edges.push((left, right, rng.gen_range(0.0..=1.0)));
                    }
                }
            }
        }
        GraphShape::Planted => {
            let blocks = rng.gen_range(2..=4_u64);
            for left in 0..nodes {
                for right in (left + 1)..nodes {
                    let same = left % blocks == right % blocks;
                    if same && rng.gen_bool(0.8) {
                        edges.push((left, right, rng.gen_range(0.6..=1.0)));
                    } else if !same && rng.gen_bool(0.05) {
                        edges.push((left, right, rng.gen_range(0.0..0.3)));
                    }
                }
            }
        }
        GraphShape::Star => {
            for leaf in 1..nodes {
                edges.push((0, leaf, rng.gen_range(0.1..=1.0)));
            }
        }
    }
    if edges.is_empty() {
        edges.push((0, 1, 0.5));
    }
    graph_from_edges("generated", &edges)
}

/// Small generated graphs across every [`GraphShape`].
pub(crate) fn graph_strategy() -> impl Strategy<Value = SimilarityGraph> {
    (any::<GraphShape>(), 3_u64..24, any::<u64>())
        .prop_map(|(shape, nodes, seed)| generate(shape, nodes, seed))
}
