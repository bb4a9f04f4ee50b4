use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    config::ModelConfig,
    model::Model,
    results::MONTHS_PER_YEAR,
    rng::RngManager,
};

fn default_years() -> u64 {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_years")]
    pub years: u64,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub params: ModelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .params
            .validate()
            .with_context(|| format!("Invalid parameters in {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    /// Builds an unstarted model; `seed_override` wins over the file's seed.
    pub fn build_model(&self, seed_override: Option<u64>) -> Result<Model> {
        let rng = match seed_override.or(self.seed) {
            Some(seed) => RngManager::new(seed),
            None => RngManager::from_entropy(),
        };
        let model = Model::with_rng(self.params.clone(), rng)
            .with_context(|| format!("Failed to build model for scenario '{}'", self.name))?;
        Ok(model)
    }

    pub fn years(&self, override_years: Option<u64>) -> u64 {
        override_years.unwrap_or(self.years)
    }

    pub fn months(&self, override_years: Option<u64>) -> u64 {
        self.years(override_years) * MONTHS_PER_YEAR
    }
}
