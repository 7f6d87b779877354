//! Planner tuning knobs.

use serde::{Deserialize, Serialize};

use crate::error::{PlanningError, Result};

/// Search parameters.
///
/// Every field has a default, so a RON document only needs to name the
/// fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Search iterations per planning cycle.
    pub iterations_per_cycle: u32,
    /// Weight of the exploration term in child selection.
    pub exploration: f64,
    /// Magnitude of the random tie-breaking term in child selection.
    pub jitter: f64,
    /// Seed of the tie-breaking RNG.
    pub seed: u64,
    /// Cap on actions taken by one greedy rollout.
    pub max_rollout_actions: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            iterations_per_cycle: 150,
            exploration: 0.5,
            jitter: 1e-6,
            seed: 0,
            max_rollout_actions: 400,
        }
    }
}

impl PlannerConfig {
    /// Parse a RON document.
    ///
    /// # Errors
    ///
    /// [`PlanningError::DataParseError`] on malformed input.
    pub fn from_ron_str(source_name: &str, text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| PlanningError::DataParseError {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })
    }

    /// Set the iteration budget per cycle.
    #[must_use]
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations_per_cycle = iterations;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the exploration weight.
    #[must_use]
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = PlannerConfig::from_ron_str("cfg", "(iterations_per_cycle: 40, seed: 7)").unwrap();
        assert_eq!(config.iterations_per_cycle, 40);
        assert_eq!(config.seed, 7);
        assert_eq!(config.max_rollout_actions, PlannerConfig::default().max_rollout_actions);
    }

    #[test]
    fn test_malformed_ron() {
        let err = PlannerConfig::from_ron_str("cfg", "(iterations_per_cycle: \"many\")").unwrap_err();
        assert!(matches!(err, PlanningError::DataParseError { ref source_name, .. } if source_name == "cfg"));
    }
}
