//! Experiment description loaded from TOML and refined by command-line flags.

use crate::system::FieldSpec;
use anyhow::{Context, Result};
use lce_core::{RunConfig, State, TangentScheme};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// Everything a single estimation run needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    #[serde(default = "default_initial_state")]
    pub initial_state: [f64; 3],
    #[serde(default)]
    pub field: FieldSpec,
    #[serde(default = "default_run", deserialize_with = "deserialize_run")]
    pub run: RunConfig,
}

fn default_initial_state() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

/// dt = 0.01, 100 transients, 10 steps per pull-back, 1000 pull-backs.
fn default_run() -> RunConfig {
    RunConfig::new(0.01, 100, 10, 1000)
}

/// `[run]` table as written; absent keys fall back to [`default_run`].
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RunTable {
    dt: Option<f64>,
    transients: Option<usize>,
    steps_per_pullback: Option<usize>,
    pullbacks: Option<usize>,
    scheme: Option<TangentScheme>,
    retain_trajectory: Option<bool>,
}

impl RunTable {
    fn into_config(self) -> RunConfig {
        let base = default_run();
        RunConfig {
            dt: self.dt.unwrap_or(base.dt),
            transients: self.transients.unwrap_or(base.transients),
            steps_per_pullback: self.steps_per_pullback.unwrap_or(base.steps_per_pullback),
            pullbacks: self.pullbacks.unwrap_or(base.pullbacks),
            scheme: self.scheme.unwrap_or(base.scheme),
            retain_trajectory: self.retain_trajectory.unwrap_or(base.retain_trajectory),
        }
    }
}

fn deserialize_run<'de, D>(deserializer: D) -> std::result::Result<RunConfig, D::Error>
where
    D: Deserializer<'de>,
{
    RunTable::deserialize(deserializer).map(RunTable::into_config)
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            initial_state: default_initial_state(),
            field: FieldSpec::default(),
            run: default_run(),
        }
    }
}

impl ExperimentConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("Failed to parse experiment configuration.")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}.", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("Invalid config file {}.", path.display()))
    }

    pub fn initial_state(&self) -> State {
        State::from(self.initial_state)
    }
}
