//! CLI configuration management.
//!
//! Values are layered: built-in defaults, then the JSON config file in the
//! platform config directory, then environment variables (a `.env` file is
//! honoured), then command-line flags applied by `main`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

pub const SEED_VAR: &str = "NTM_SEED";
pub const OUTPUT_FORMAT_VAR: &str = "NTM_OUTPUT_FORMAT";
pub const TIMESTEPS_VAR: &str = "NTM_TIMESTEPS";

/// Application-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed forced onto every run; experiments keep their own when unset.
    pub seed: Option<u64>,

    /// How results are printed.
    pub output_format: OutputFormat,

    /// Timesteps for shorthand commands that are not given `--steps`.
    pub default_timesteps: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            output_format: OutputFormat::Text,
            default_timesteps: 100,
        }
    }
}

impl Config {
    /// Load configuration from the config file and the process environment.
    pub fn load() -> Result<Self> {
        // Load .env file if present (silently ignore if missing)
        let _ = dotenvy::dotenv();
        Self::load_layered(Self::config_file_path().as_deref(), |key| {
            std::env::var(key).ok()
        })
    }

    /// Layer `file` (when it exists) and then `env` over the defaults.
    pub fn load_layered(file: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match file {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config from {}", path.display()))?;
                serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?
            }
            _ => Self::default(),
        };

        if let Some(seed) = env(SEED_VAR) {
            config.seed = Some(
                seed.trim()
                    .parse()
                    .with_context(|| format!("{SEED_VAR} must be an unsigned integer"))?,
            );
        }
        if let Some(format) = env(OUTPUT_FORMAT_VAR) {
            config.output_format = format
                .parse()
                .with_context(|| format!("Invalid {OUTPUT_FORMAT_VAR}"))?;
        }
        if let Some(timesteps) = env(TIMESTEPS_VAR) {
            config.default_timesteps = timesteps
                .trim()
                .parse()
                .with_context(|| format!("{TIMESTEPS_VAR} must be an unsigned integer"))?;
        }

        Ok(config)
    }

    /// Get the path to the config file.
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "netomata", "ntm")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}
