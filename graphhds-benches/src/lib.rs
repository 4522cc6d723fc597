//! Benchmark support crate for graphhds.
//!
//! Provides a planted-partition graph generator and parameter types used by
//! the Criterion benchmarks of the level, combine, and dedupe stages.

pub mod error;
pub mod params;
pub mod source;
