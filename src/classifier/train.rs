//! Training pipeline
//!
//! Load the labeled CSV, hold out a seeded test split, fit the ensemble on
//! the rest and write the artifact. No evaluation metrics are computed.

use std::path::PathBuf;

use indicatif::ProgressBar;

use super::artifact::{ModelArtifact, TrainedModel};
use super::dataset::Dataset;
use super::forest::{ForestConfig, RandomForest};
use super::gbdt_model::{GbdtConfig, GbdtModel};
use super::{Algorithm, TrainError};

pub const DEFAULT_TREES: usize = 200;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Training configuration
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Labeled CSV dataset
    pub data_path: PathBuf,
    /// Where the artifact is written
    pub output_path: PathBuf,
    pub algorithm: Algorithm,
    /// Number of trees (boosting iterations for GBDT)
    pub n_trees: usize,
    /// Seed for the split and the ensemble
    pub seed: u64,
    /// Held-out fraction (0.0 - 1.0)
    pub test_fraction: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("heart.csv"),
            output_path: PathBuf::from("model.json"),
            algorithm: Algorithm::Forest,
            n_trees: DEFAULT_TREES,
            seed: DEFAULT_SEED,
            test_fraction: DEFAULT_TEST_FRACTION,
        }
    }
}

impl TrainConfig {
    fn validate(&self) -> Result<(), TrainError> {
        if self.n_trees == 0 {
            return Err(TrainError::InvalidConfig("trees must be at least 1".into()));
        }
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(TrainError::InvalidConfig(format!(
                "test fraction must be in [0, 1), got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }
}

/// Training result
#[derive(Debug)]
pub struct TrainResult {
    pub algorithm: Algorithm,
    pub train_samples: usize,
    pub test_samples: usize,
    pub n_trees: usize,
    /// Path to saved model
    pub model_path: PathBuf,
    /// SHA-256 of the artifact bytes
    pub digest: String,
}

/// Fit a model on an in-memory dataset.
///
/// Returns the artifact plus the train/test sizes.
pub fn fit(
    dataset: &Dataset,
    config: &TrainConfig,
    progress: Option<&ProgressBar>,
) -> Result<(ModelArtifact, usize, usize), TrainError> {
    config.validate()?;

    let (train_set, test_set) = dataset.split(config.test_fraction, config.seed);
    if train_set.is_empty() {
        return Err(TrainError::NoSamples);
    }
    tracing::info!(
        "Training: {} examples, held out: {} examples",
        train_set.len(),
        test_set.len()
    );

    let model = match config.algorithm {
        Algorithm::Forest => {
            let forest_config = ForestConfig {
                n_trees: config.n_trees,
                seed: config.seed,
                ..Default::default()
            };
            TrainedModel::RandomForest(RandomForest::fit(
                &train_set.rows,
                &train_set.labels,
                &forest_config,
                progress,
            )?)
        }
        Algorithm::Gbdt => {
            let gbdt_config = GbdtConfig {
                n_trees: config.n_trees,
                ..Default::default()
            };
            let model = GbdtModel::fit(&train_set.rows, &train_set.labels, &gbdt_config)?;
            if let Some(pb) = progress {
                pb.inc(config.n_trees as u64);
            }
            TrainedModel::Gbdt(model)
        }
    };

    let artifact = ModelArtifact::new(model, config.n_trees, config.seed);
    Ok((artifact, train_set.len(), test_set.len()))
}

/// Run the full pipeline: load, split, fit, save.
pub fn train(config: &TrainConfig, progress: Option<&ProgressBar>) -> Result<TrainResult, TrainError> {
    config.validate()?;
    let dataset = Dataset::from_csv(&config.data_path)?;

    let (artifact, train_samples, test_samples) = fit(&dataset, config, progress)?;
    let digest = artifact.save(&config.output_path)?;

    tracing::info!("Model saved to {}", config.output_path.display());

    Ok(TrainResult {
        algorithm: config.algorithm,
        train_samples,
        test_samples,
        n_trees: config.n_trees,
        model_path: config.output_path.clone(),
        digest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{RiskModel, NUM_FEATURES};

    fn synthetic(n: usize) -> Dataset {
        let mut ds = Dataset::default();
        for i in 0..n {
            let positive = i % 3 != 0;
            let mut row = [0.0; NUM_FEATURES];
            row[0] = 35.0 + (i % 40) as f64;
            row[1] = (i % 2) as f64;
            row[4] = if positive { 260.0 } else { 200.0 } + (i % 13) as f64;
            row[7] = if positive { 130.0 } else { 165.0 } - (i % 9) as f64;
            row[9] = if positive { 2.0 } else { 0.4 };
            ds.rows.push(row);
            ds.labels.push(positive);
        }
        ds
    }

    fn config(algorithm: Algorithm) -> TrainConfig {
        TrainConfig {
            algorithm,
            n_trees: 12,
            ..Default::default()
        }
    }

    #[test]
    fn test_train_config_default() {
        let config = TrainConfig::default();
        assert_eq!(config.n_trees, 200);
        assert_eq!(config.seed, 42);
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.algorithm, Algorithm::Forest);
    }

    #[test]
    fn test_fit_reports_split_sizes() {
        let (artifact, train_n, test_n) = fit(&synthetic(50), &config(Algorithm::Forest), None).unwrap();
        assert_eq!(test_n, 10);
        assert_eq!(train_n, 40);
        assert_eq!(artifact.n_trees, 12);
        assert_eq!(artifact.model.algorithm(), Algorithm::Forest);
    }

    #[test]
    fn test_fit_twice_is_byte_identical() {
        let ds = synthetic(60);
        let (a, _, _) = fit(&ds, &config(Algorithm::Forest), None).unwrap();
        let (b, _, _) = fit(&ds, &config(Algorithm::Forest), None).unwrap();
        assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
    }

    #[test]
    fn test_gbdt_fit() {
        let (artifact, _, _) = fit(&synthetic(40), &config(Algorithm::Gbdt), None).unwrap();
        assert_eq!(artifact.model.algorithm(), Algorithm::Gbdt);
        let p = artifact.model.positive_probability(&synthetic(2).rows[1]);
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_invalid_config() {
        let bad = TrainConfig {
            test_fraction: 1.0,
            ..config(Algorithm::Forest)
        };
        assert!(matches!(
            fit(&synthetic(10), &bad, None),
            Err(TrainError::InvalidConfig(_))
        ));

        let bad = TrainConfig {
            n_trees: 0,
            ..config(Algorithm::Forest)
        };
        assert!(matches!(
            fit(&synthetic(10), &bad, None),
            Err(TrainError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_train_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let data_path = dir.path().join("heart.csv");
        let mut csv = crate::classifier::FEATURE_NAMES.join(",");
        csv.push_str(",target\n");
        let ds = synthetic(30);
        for (row, label) in ds.rows.iter().zip(&ds.labels) {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            csv.push_str(&format!("{},{}\n", cells.join(","), u8::from(*label)));
        }
        std::fs::write(&data_path, csv).unwrap();

        let cfg = TrainConfig {
            data_path,
            output_path: dir.path().join("out").join("model.json"),
            ..config(Algorithm::Forest)
        };
        let result = train(&cfg, None).unwrap();
        assert_eq!(result.train_samples + result.test_samples, 30);
        assert!(result.model_path.exists());

        let again = train(&cfg, None).unwrap();
        assert_eq!(result.digest, again.digest);
    }

    #[test]
    fn test_train_missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            data_path: dir.path().join("missing.csv"),
            output_path: dir.path().join("model.json"),
            ..config(Algorithm::Forest)
        };
        let err = train(&cfg, None).unwrap_err();
        assert!(matches!(err, TrainError::Dataset(_)));
        assert!(!cfg.output_path.exists());
    }
}
