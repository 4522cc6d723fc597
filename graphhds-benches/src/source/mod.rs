//! Synthetic similarity graphs with planted community structure.
//!
//! Nodes are split into equally sized communities. Pairs inside a community
//! are linked with high similarity and probability `intra_probability`;
//! pairs across communities are linked with low similarity and probability
//! `inter_probability`. Every node carries unit weight.

mod errors;

use graphhds_core::{GraphBuilder, SimilarityGraph};
use rand::{Rng, SeedableRng, rngs::SmallRng};

pub use errors::SyntheticError;

/// Configuration for [`PlantedPartition::generate`].
#[derive(Clone, Debug, PartialEq)]
pub struct PlantedPartitionConfig {
    /// Number of communities.
    pub communities: usize,
    /// Nodes per community.
    pub community_size: usize,
    /// Chance that two nodes of the same community are linked.
    pub intra_probability: f64,
    /// Chance that two nodes of different communities are linked.
    pub inter_probability: f64,
    /// RNG seed.
    pub seed: u64,
}

impl PlantedPartitionConfig {
    /// Dense communities with sparse background noise.
    #[must_use]
    pub const fn new(communities: usize, community_size: usize, seed: u64) -> Self {
        Self {
            communities,
            community_size,
            intra_probability: 0.6,
            inter_probability: 0.02,
            seed,
        }
    }

    fn validate(&self) -> Result<usize, SyntheticError> {
        if self.communities == 0 {
            return Err(SyntheticError::ZeroValue {
                context: "communities",
            });
        }
        if self.community_size < 2 {
            return Err(SyntheticError::CommunityTooSmall {
                size: self.community_size,
            });
        }
        for (parameter, value) in [
            ("intra_probability", self.intra_probability),
            ("inter_probability", self.inter_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SyntheticError::InvalidProbability { parameter, value });
            }
        }
        self.communities
            .checked_mul(self.community_size)
            .ok_or(SyntheticError::Overflow)
    }
}

/// A generated graph with its planted assignment.
#[derive(Clone, Debug)]
pub struct PlantedPartition {
    graph: SimilarityGraph,
    community_size: usize,
}

impl PlantedPartition {
    /// Draws a graph from `config`.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when the configuration is invalid or the
    /// graph cannot be assembled.
    ///
    /// # Examples
    /// ```
    /// use graphhds_benches::source::{PlantedPartition, PlantedPartitionConfig};
    ///
    /// let planted = PlantedPartition::generate(&PlantedPartitionConfig::new(3, 10, 7))?;
    /// assert_eq!(planted.graph().node_count(), 30);
    /// assert_eq!(planted.community_of(12), Some(1));
    /// # Ok::<(), graphhds_benches::source::SyntheticError>(())
    /// ```
    #[expect(
        clippy::integer_division,
        reason = "community membership is the quotient of node index and size"
    )]
    pub fn generate(config: &PlantedPartitionConfig) -> Result<Self, SyntheticError> {
        let nodes = config.validate()?;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let mut builder = GraphBuilder::new("planted");

        for left in 0..nodes {
            let community = left / config.community_size;
            let mut connections = Vec::new();
            for right in (left + 1)..nodes {
                let same = right / config.community_size == community;
                let (probability, similarity) = if same {
                    (config.intra_probability, 0.6..1.0)
                } else {
                    (config.inter_probability, 0.0..0.3)
                };
                if rng.gen_bool(probability) {
                    connections.push((to_id(right)?, rng.gen_range(similarity)));
                }
            }
            builder.add_record(to_id(left)?, connections)?;
        }

        Ok(Self {
            graph: builder.build()?,
            community_size: config.community_size,
        })
    }

    /// The generated graph.
    #[must_use]
    pub const fn graph(&self) -> &SimilarityGraph {
        &self.graph
    }

    /// Community index planted for the node with external id `id`.
    #[must_use]
    #[expect(
        clippy::integer_division,
        reason = "community membership is the quotient of node index and size"
    )]
    pub fn community_of(&self, id: u64) -> Option<usize> {
        let node = usize::try_from(id).ok()?;
        (node < self.graph.node_count()).then(|| node / self.community_size)
    }
}

fn to_id(node: usize) -> Result<u64, SyntheticError> {
    u64::try_from(node).map_err(|_| SyntheticError::Overflow)
}

#[cfg(test)]
mod tests;
