//! Node weight rescaling and mean normalization.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::GraphError;

/// Policy applied to raw node weights before they are divided by their mean.
///
/// # Examples
/// ```
/// use graphhds_core::WeightScale;
///
/// assert_eq!(WeightScale::from_level(0), WeightScale::Uniform);
/// assert_eq!(WeightScale::from_level(1), WeightScale::Linear);
/// assert_eq!(WeightScale::from_level(10), WeightScale::Log { base: 10.0 });
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum WeightScale {
    /// Every node weighs `1.0` regardless of the supplied weights.
    Uniform,
    /// Raw weights are divided by their mean.
    #[default]
    Linear,
    /// `|log_base(w)|` is taken before dividing by the mean. A base of one or
    /// less disables the transform, leaving the scale linear.
    Log {
        /// Logarithm base.
        base: f64,
    },
}

impl WeightScale {
    /// Maps the numeric command-line level onto a scale: `0` is uniform, `1`
    /// linear, and anything larger the logarithm base.
    #[must_use]
    pub fn from_level(level: u32) -> Self {
        match level {
            0 => Self::Uniform,
            1 => Self::Linear,
            base => Self::Log {
                base: f64::from(base),
            },
        }
    }

    fn rescale(self, raw: f64) -> f64 {
        match self {
            Self::Uniform => 1.0,
            Self::Log { base } if base > 1.0 => raw.log(base).abs(),
            Self::Linear | Self::Log { .. } => raw,
        }
    }
}

/// Produces normalized weights for `nodes` (sorted external ids).
///
/// Entries in `raw` for ids outside the graph are ignored. A zero mean leaves
/// the rescaled weights as they are.
pub(super) fn normalize(
    nodes: &[u64],
    raw: &BTreeMap<u64, f64>,
    scale: WeightScale,
) -> Result<Vec<f64>, GraphError> {
    if scale == WeightScale::Uniform {
        return Ok(vec![1.0; nodes.len()]);
    }

    let mut scaled = Vec::with_capacity(nodes.len());
    for &node in nodes {
        let value = raw
            .get(&node)
            .copied()
            .ok_or(GraphError::MissingNodeWeight { node })?;
        let weight = scale.rescale(value);
        if !weight.is_finite() || weight < 0.0 {
            return Err(GraphError::InvalidNodeWeight { node, weight });
        }
        scaled.push(weight);
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "node counts stay far below 2^52"
    )]
    let mean = scaled.iter().sum::<f64>() / nodes.len() as f64;
    if mean > 0.0 {
        for weight in &mut scaled {
            *weight /= mean;
        }
    }
    debug!(?scale, mean, "normalized node weights");
    Ok(scaled)
}
