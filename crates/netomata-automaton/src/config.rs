//! Run configuration.

use serde::{Deserialize, Serialize};

use crate::random::DEFAULT_SEED;

/// Knobs of a single evolve run that are independent of the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolveConfig {
    /// Number of timesteps to compute after the initial conditions.
    pub timesteps: usize,

    /// Record a topology snapshot for every timestep rather than only the latest.
    pub copy_connectivity: bool,

    /// Keep only the trailing window of activity vectors needed by the rule.
    pub compression: bool,

    /// Seed for the run's random source.
    pub seed: u64,
}

impl Default for EvolveConfig {
    fn default() -> Self {
        Self {
            timesteps: 100,
            copy_connectivity: true,
            compression: false,
            seed: DEFAULT_SEED,
        }
    }
}

impl EvolveConfig {
    /// Short run for quick iteration.
    pub fn fast() -> Self {
        Self {
            timesteps: 10,
            ..Default::default()
        }
    }

    /// Long run with bounded memory.
    pub fn archival() -> Self {
        Self {
            timesteps: 10_000,
            copy_connectivity: false,
            compression: true,
            ..Default::default()
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = EvolveConfig::from_json(r#"{"timesteps": 5, "seed": 9}"#).unwrap();
        assert_eq!(config.timesteps, 5);
        assert_eq!(config.seed, 9);
        assert!(config.copy_connectivity);
        assert!(!config.compression);
    }

    #[test]
    fn test_json_roundtrip_of_preset() {
        let config = EvolveConfig::archival();
        let parsed = EvolveConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
