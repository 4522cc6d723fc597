//! Shared test utilities used across graphhds crates.
//!
//! [`trace`] captures spans and events emitted while a closure runs, and
//! [`proptest_profile`] reads property-test tuning from the environment.

pub mod proptest_profile;
pub mod trace;
