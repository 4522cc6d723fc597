//! Benchmark parameter types.

use std::fmt;

/// Parameters identifying one benchmark input.
#[derive(Clone, Debug)]
pub struct PipelineBenchParams {
    /// Number of planted communities.
    pub communities: usize,
    /// Nodes per community.
    pub community_size: usize,
}

impl fmt::Display for PipelineBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k={},n={}", self.communities, self.community_size)
    }
}
