//! Builder for configuring [`GraphHds`] runs.
//!
//! All ranges are checked in [`GraphHdsBuilder::build`] so a constructed
//! [`GraphHds`] never fails on configuration mid-run.

use crate::{
    Result, error::GraphHdsError, hds::GraphHds, hierarchy::LevelConfig, level::ClusterPolicy,
    processor::StabilityMeasure,
};

/// Configures and constructs [`GraphHds`] instances.
///
/// # Examples
/// ```
/// use graphhds_core::{ClusterPolicy, GraphHdsBuilder, StabilityMeasure};
///
/// let hds = GraphHdsBuilder::new()
///     .with_min_flow(2.5)
///     .with_policy(ClusterPolicy::Edge)
///     .with_stability_measure(StabilityMeasure::Flow)
///     .build()?;
/// assert_eq!(hds.min_flow(), 2.5);
/// assert_eq!(hds.policy(), ClusterPolicy::Edge);
/// # Ok::<(), graphhds_core::GraphHdsError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GraphHdsBuilder {
    min_flow: f64,
    shave_rate: f64,
    min_shave: f64,
    policy: ClusterPolicy,
    min_stability: f64,
    stability_measure: StabilityMeasure,
}

impl Default for GraphHdsBuilder {
    fn default() -> Self {
        Self {
            min_flow: 10.0,
            shave_rate: 0.05,
            min_shave: 0.3,
            policy: ClusterPolicy::Node,
            min_stability: 0.0,
            stability_measure: StabilityMeasure::LevelCount,
        }
    }
}

impl GraphHdsBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use graphhds_core::GraphHdsBuilder;
    ///
    /// let builder = GraphHdsBuilder::new();
    /// assert_eq!(builder.min_flow(), 10.0);
    /// assert_eq!(builder.shave_rate(), 0.05);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flow a node or pair needs to count as dense.
    #[must_use]
    pub fn with_min_flow(mut self, min_flow: f64) -> Self {
        self.min_flow = min_flow;
        self
    }

    /// Sets the fraction of edges shaved per level.
    #[must_use]
    pub fn with_shave_rate(mut self, shave_rate: f64) -> Self {
        self.shave_rate = shave_rate;
        self
    }

    /// Sets the fraction of points that may remain unclustered when shaving
    /// stops.
    #[must_use]
    pub fn with_min_shave(mut self, min_shave: f64) -> Self {
        self.min_shave = min_shave;
        self
    }

    /// Selects the flood-fill policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ClusterPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the stability below which clusters are dropped from the flat
    /// partition.
    #[must_use]
    pub fn with_min_stability(mut self, min_stability: f64) -> Self {
        self.min_stability = min_stability;
        self
    }

    /// Selects how clusters are ranked during deduplication.
    #[must_use]
    pub fn with_stability_measure(mut self, measure: StabilityMeasure) -> Self {
        self.stability_measure = measure;
        self
    }

    /// Configured `min_flow`.
    #[rustfmt::skip]
    #[must_use]
    pub fn min_flow(&self) -> f64 { self.min_flow }

    /// Configured `shave_rate`.
    #[rustfmt::skip]
    #[must_use]
    pub fn shave_rate(&self) -> f64 { self.shave_rate }

    /// Configured `min_shave`.
    #[rustfmt::skip]
    #[must_use]
    pub fn min_shave(&self) -> f64 { self.min_shave }

    /// Validates the configuration and constructs a [`GraphHds`] instance.
    ///
    /// # Errors
    /// Returns [`GraphHdsError::InvalidMinFlow`] when `min_flow` is negative
    /// or not finite, [`GraphHdsError::InvalidShaveRate`] when `shave_rate` is
    /// outside `(0, 1]`, [`GraphHdsError::InvalidMinShave`] when `min_shave`
    /// is outside `[0, 1)`, and [`GraphHdsError::InvalidMinStability`] when
    /// `min_stability` is NaN.
    ///
    /// # Examples
    /// ```
    /// use graphhds_core::{GraphHdsBuilder, GraphHdsErrorCode};
    ///
    /// let err = GraphHdsBuilder::new().with_shave_rate(0.0).build().unwrap_err();
    /// assert_eq!(err.code(), GraphHdsErrorCode::InvalidShaveRate);
    /// ```
    pub fn build(self) -> Result<GraphHds> {
        if !self.min_flow.is_finite() || self.min_flow < 0.0 {
            return Err(GraphHdsError::InvalidMinFlow { got: self.min_flow });
        }
        if !(self.shave_rate > 0.0 && self.shave_rate <= 1.0) {
            return Err(GraphHdsError::InvalidShaveRate {
                got: self.shave_rate,
            });
        }
        if !(0.0..1.0).contains(&self.min_shave) {
            return Err(GraphHdsError::InvalidMinShave {
                got: self.min_shave,
            });
        }
        if self.min_stability.is_nan() {
            return Err(GraphHdsError::InvalidMinStability);
        }
        Ok(GraphHds::new(
            LevelConfig::new(self.min_flow, self.shave_rate, self.min_shave, self.policy),
            self.min_stability,
            self.stability_measure,
        ))
    }
}
