//! Run configuration.
//!
//! Defaults reproduce the classic contest: a 12x12 arena, episodes of
//! `2 * width * height` ticks, and 100 generations bred from 2000 random
//! genomes down to 100 survivors.

use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub width: usize,
    pub height: usize,
    /// Episode budget; `None` means `2 * width * height`.
    pub max_steps: Option<usize>,
    /// Master seed. `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Size of the randomly seeded generation 0.
    pub population_size: usize,
    /// Absolute number kept by truncation selection.
    pub survivors: usize,
    pub generations: usize,
    /// Episodes averaged into one fitness value.
    pub trials: usize,
    /// How many ranked genomes the final report carries.
    pub report_top: usize,
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 12,
            height: 12,
            max_steps: None,
            seed: None,
            training: TrainingConfig::default(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            population_size: 2000,
            survivors: 100,
            generations: 100,
            trials: 3,
            report_top: 10,
            parallel: true,
        }
    }
}

impl Config {
    /// Config for a `width x height` arena with default training settings.
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps.unwrap_or(2 * self.width * self.height)
    }

    pub fn cells(&self) -> usize {
        self.width * self.height
    }

    pub fn validate(&self) -> Result<()> {
        if self.width < 2 || self.height < 2 {
            return Err(SimError::InvalidConfig(format!(
                "grid must be at least 2x2, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > i32::MAX as usize || self.height > i32::MAX as usize {
            return Err(SimError::InvalidConfig("grid dimensions too large".into()));
        }
        let t = &self.training;
        if t.survivors < 2 {
            return Err(SimError::InvalidConfig(format!(
                "need at least 2 survivors to breed, got {}",
                t.survivors
            )));
        }
        if t.population_size < 2 {
            return Err(SimError::InvalidConfig(format!(
                "population of {} cannot breed",
                t.population_size
            )));
        }
        if t.trials == 0 {
            return Err(SimError::InvalidConfig("trials must be at least 1".into()));
        }
        if t.report_top == 0 {
            return Err(SimError::InvalidConfig("report_top must be at least 1".into()));
        }
        Ok(())
    }

    /// Load a JSON config; missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        use anyhow::Context;
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_contest() {
        let c = Config::default();
        assert_eq!((c.width, c.height), (12, 12));
        assert_eq!(c.max_steps(), 288);
        assert_eq!(c.training.population_size, 2000);
        assert_eq!(c.training.survivors, 100);
        assert_eq!(c.training.generations, 100);
        assert_eq!(c.training.trials, 3);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c: Config = serde_json::from_str(r#"{"width": 4, "training": {"trials": 5}}"#).unwrap();
        assert_eq!(c.width, 4);
        assert_eq!(c.height, 12);
        assert_eq!(c.training.trials, 5);
        assert_eq!(c.training.survivors, 100);
    }

    #[test]
    fn rejects_degenerate_settings() {
        assert!(Config::with_size(1, 5).validate().is_err());
        let mut c = Config::default();
        c.training.trials = 0;
        assert!(matches!(c.validate(), Err(SimError::InvalidConfig(_))));
        let mut c = Config::default();
        c.training.survivors = 1;
        assert!(c.validate().is_err());
    }
}
