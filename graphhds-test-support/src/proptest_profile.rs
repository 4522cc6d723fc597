//! Environment-driven tuning for property-based suites.
//!
//! `GRAPHHDS_PROPTEST_CASES` overrides the per-suite case count and
//! `GRAPHHDS_PROPTEST_SHRINK` caps shrink iterations. Unparseable values fall
//! back to the suite default with a warning.

use std::env;

/// Environment variable overriding the number of cases per property.
pub const CASES_ENV: &str = "GRAPHHDS_PROPTEST_CASES";
/// Environment variable overriding the maximum shrink iterations.
pub const SHRINK_ENV: &str = "GRAPHHDS_PROPTEST_SHRINK";

const DEFAULT_SHRINK_ITERS: u32 = 1024;

/// Case and shrink budget for a property suite.
///
/// # Examples
/// ```
/// use graphhds_test_support::proptest_profile::ProptestRunProfile;
///
/// let profile = ProptestRunProfile::from_env(48);
/// assert!(profile.cases() > 0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    max_shrink_iters: u32,
}

impl ProptestRunProfile {
    /// Reads the profile, using `default_cases` when no valid override is
    /// set.
    #[must_use]
    pub fn from_env(default_cases: u32) -> Self {
        Self::from_lookup(default_cases, |key| env::var(key).ok())
    }

    /// Builds a profile from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(default_cases: u32, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            cases: positive(CASES_ENV, lookup(CASES_ENV), default_cases),
            max_shrink_iters: positive(SHRINK_ENV, lookup(SHRINK_ENV), DEFAULT_SHRINK_ITERS),
        }
    }

    /// Cases to run per property.
    #[must_use]
    #[rustfmt::skip]
    pub const fn cases(&self) -> u32 { self.cases }

    /// Upper bound on shrink iterations after a failure.
    #[must_use]
    #[rustfmt::skip]
    pub const fn max_shrink_iters(&self) -> u32 { self.max_shrink_iters }
}

fn positive(key: &str, raw: Option<String>, default: u32) -> u32 {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => value,
        Ok(_) => {
            tracing::warn!(env = key, raw = %raw, "override must be positive; using default");
            default
        }
        Err(error) => {
            tracing::warn!(env = key, raw = %raw, %error, "unparseable override; using default");
            default
        }
    }
}
