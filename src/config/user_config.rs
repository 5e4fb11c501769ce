//! User-level configuration for heartcheck
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/heartcheck/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classifier::train::{DEFAULT_SEED, DEFAULT_TEST_FRACTION, DEFAULT_TREES};
use crate::classifier::Algorithm;

pub const MODEL_PATH_ENV: &str = "HEARTCHECK_MODEL";
pub const DEFAULT_MODEL_PATH: &str = "model.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub train: TrainDefaults,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Model artifact used by `check` (default: ./model.json)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TrainDefaults {
    /// Number of trees (default: 200)
    pub trees: Option<usize>,
    /// Seed for the split and the ensemble (default: 42)
    pub seed: Option<u64>,
    /// Held-out fraction (default: 0.2)
    pub test_fraction: Option<f64>,
    /// "forest" (default) or "gbdt"
    pub algorithm: Option<Algorithm>,
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/heartcheck/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = UserConfig::default();

        if let Some(path) = Self::user_config_path().filter(|p| p.exists()) {
            config.merge(Self::load_file(&path)?);
        }

        if let Ok(path) = std::env::var(MODEL_PATH_ENV) {
            if !path.is_empty() {
                config.model.path = Some(PathBuf::from(path));
            }
        }

        Ok(config)
    }

    /// Parse a single config file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("heartcheck").join("config.toml"))
    }

    /// Merge another config into this one (other takes priority)
    fn merge(&mut self, other: UserConfig) {
        if other.model.path.is_some() {
            self.model.path = other.model.path;
        }
        if other.train.trees.is_some() {
            self.train.trees = other.train.trees;
        }
        if other.train.seed.is_some() {
            self.train.seed = other.train.seed;
        }
        if other.train.test_fraction.is_some() {
            self.train.test_fraction = other.train.test_fraction;
        }
        if other.train.algorithm.is_some() {
            self.train.algorithm = other.train.algorithm;
        }
    }

    pub fn model_path(&self) -> PathBuf {
        self.model
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH))
    }

    pub fn trees(&self) -> usize {
        self.train.trees.unwrap_or(DEFAULT_TREES)
    }

    pub fn seed(&self) -> u64 {
        self.train.seed.unwrap_or(DEFAULT_SEED)
    }

    pub fn test_fraction(&self) -> f64 {
        self.train.test_fraction.unwrap_or(DEFAULT_TEST_FRACTION)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.train.algorithm.unwrap_or_default()
    }

    /// Initialize user config directory and create example config
    pub fn init_user_config() -> Result<PathBuf> {
        let config_path = Self::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if !config_path.exists() {
            let example = r#"# heartcheck user configuration

[model]
# Model artifact used by `heartcheck check`
# Can also be set with HEARTCHECK_MODEL
# path = "/path/to/model.json"

[train]
# Defaults for `heartcheck train` (flags override these)
# trees = 200
# seed = 42
# test_fraction = 0.2
# algorithm = "forest"  # or "gbdt"
"#;
            std::fs::write(&config_path, example)?;
        }

        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UserConfig::default();
        assert_eq!(config.model_path(), PathBuf::from("model.json"));
        assert_eq!(config.trees(), 200);
        assert_eq!(config.seed(), 42);
        assert_eq!(config.test_fraction(), 0.2);
        assert_eq!(config.algorithm(), Algorithm::Forest);
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
[model]
path = "/srv/models/heart.json"

[train]
trees = 50
seed = 7
algorithm = "gbdt"
"#;
        let config: UserConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model_path(), PathBuf::from("/srv/models/heart.json"));
        assert_eq!(config.trees(), 50);
        assert_eq!(config.seed(), 7);
        assert_eq!(config.algorithm(), Algorithm::Gbdt);
        // Unset keys fall back to defaults
        assert_eq!(config.test_fraction(), 0.2);
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = UserConfig::default();
        base.train.trees = Some(10);
        base.train.seed = Some(1);

        let mut other = UserConfig::default();
        other.train.trees = Some(99);
        base.merge(other);

        assert_eq!(base.trees(), 99);
        assert_eq!(base.seed(), 1);
    }

    #[test]
    fn test_load_file_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[train]\ntrees = \"many\"\n").unwrap();
        let err = UserConfig::load_file(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
