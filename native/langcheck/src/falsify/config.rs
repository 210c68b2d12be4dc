//! Search budgets and generator tuning.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Budgets and tuning knobs for randomized search.
///
/// Every field has a default, so a TOML override only needs the keys it changes:
///
/// ```toml
/// max_trials = 5000
/// seed = 17
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Candidates generated before giving up.
    pub max_trials: usize,
    /// Accepted shrink steps before the current counterexample is reported.
    pub max_shrinks: usize,
    /// Seed for the default generator.
    pub seed: u64,
    /// Longest generated string, as a multiple of the model's size.
    pub scale_factor: usize,
    /// Lower bound on the longest generated string.
    pub min_max_len: usize,
    /// Share of trials spent enumerating short strings in shortlex order.
    pub exhaustive_fraction: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_trials: 1000,
            max_shrinks: 500,
            seed: 0,
            scale_factor: 5,
            min_max_len: 4,
            exhaustive_fraction: 0.25,
        }
    }
}

impl SearchConfig {
    /// Parse a TOML override; missing keys keep their defaults.
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source).map_err(ConfigError::from)?)
    }

    /// Set the trial budget.
    pub fn with_max_trials(mut self, max_trials: usize) -> Self {
        self.max_trials = max_trials;
        self
    }

    /// Set the shrink step budget.
    pub fn with_max_shrinks(mut self, max_shrinks: usize) -> Self {
        self.max_shrinks = max_shrinks;
        self
    }

    /// Set the generator seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set how many symbols per unit of model size may be generated.
    pub fn with_scale_factor(mut self, scale_factor: usize) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the share of trials spent on shortlex enumeration, clamped to `0..=1`.
    pub fn with_exhaustive_fraction(mut self, fraction: f64) -> Self {
        self.exhaustive_fraction = fraction;
        self
    }

    /// Number of leading trials drawn from the shortlex enumeration.
    pub fn exhaustive_budget(&self) -> usize {
        (self.max_trials as f64 * self.exhaustive_fraction.clamp(0.0, 1.0)) as usize
    }
}
