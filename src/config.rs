//! Experiment configuration.
//!
//! Loaded from TOML or taken from one of the stock presets.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{DilemmaError, ParameterSpace, MAX_AGENTS};

/// Starting goodwill in the stock experiments.
pub const DEFAULT_INITIAL_GOODWILL: f64 = 0.8;

/// Population size in the stock experiments.
pub const DEFAULT_AGENTS: usize = 15;

/// Top-level configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub experiment: ExperimentSettings,
    pub parameters: ParameterSpace,
}

/// Population, horizon and repetition settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSettings {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_agents")]
    pub agents: usize,
    pub timesteps: usize,
    pub runs: usize,
    #[serde(default = "default_initial_goodwill")]
    pub initial_goodwill: f64,
    #[serde(default)]
    pub seed: u64,
    /// Record every n-th state; genesis and the final state are always kept.
    #[serde(default = "default_record_interval")]
    pub record_interval: usize,
}

fn default_name() -> String {
    "experiment".into()
}

fn default_agents() -> usize {
    DEFAULT_AGENTS
}

fn default_initial_goodwill() -> f64 {
    DEFAULT_INITIAL_GOODWILL
}

fn default_record_interval() -> usize {
    1
}

impl ExperimentConfig {
    /// 500 steps, 3 runs per parameter set.
    pub fn base_simulation() -> Self {
        Self::stock("base_simulation", 500, 3)
    }

    /// 1000 steps, 10 runs per parameter set.
    pub fn long_simulation() -> Self {
        Self::stock("long_simulation", 1000, 10)
    }

    fn stock(name: &str, timesteps: usize, runs: usize) -> Self {
        Self {
            experiment: ExperimentSettings {
                name: name.into(),
                agents: DEFAULT_AGENTS,
                timesteps,
                runs,
                initial_goodwill: DEFAULT_INITIAL_GOODWILL,
                seed: 0,
                record_interval: 1,
            },
            parameters: ParameterSpace::stock(),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, DilemmaError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DilemmaError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// Rejects configurations that cannot produce a run.
    pub fn validate(&self) -> Result<(), DilemmaError> {
        let settings = &self.experiment;
        for (name, value) in [
            ("agents", settings.agents),
            ("timesteps", settings.timesteps),
            ("runs", settings.runs),
            ("record_interval", settings.record_interval),
        ] {
            if value == 0 {
                return Err(DilemmaError::Config(format!("{name} must be at least 1")));
            }
        }
        if settings.agents > MAX_AGENTS {
            return Err(DilemmaError::Config(format!(
                "agents must be at most {MAX_AGENTS}, got {}",
                settings.agents
            )));
        }
        if !(0.0..=1.0).contains(&settings.initial_goodwill) {
            return Err(DilemmaError::InvalidParameter(format!(
                "initial goodwill must be in [0, 1], got {}",
                settings.initial_goodwill
            )));
        }
        self.parameters.expand().map(|_| ())
    }
}
