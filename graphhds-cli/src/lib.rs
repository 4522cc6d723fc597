//! Support library for the graphhds CLI binary.
//!
//! Exposes the command pipeline and logging set-up so doctests and
//! integration tests can drive a run without spawning a subprocess.

pub mod cli;
pub mod logging;
