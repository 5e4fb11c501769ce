//! Heart disease risk classifier
//!
//! Answers → 13 clinical features → tree ensemble → positive-class
//! probability → risk label.
//!
//! The fitted model is treated as a capability: given the 13 features in
//! schema order, return the probability of heart disease. Training writes
//! it to a JSON artifact and inference loads it back.

pub mod artifact;
pub mod dataset;
pub mod features;
pub mod forest;
pub mod gbdt_model;
pub mod prediction;
pub mod train;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use artifact::{ModelArtifact, TrainedModel};
pub use dataset::{Dataset, DatasetError};
pub use features::{FeatureVector, FEATURE_NAMES, NUM_FEATURES};
pub use forest::{ForestConfig, RandomForest};
pub use gbdt_model::{GbdtConfig, GbdtModel};
pub use prediction::{predict, PredictionResult, RiskLabel, RISK_THRESHOLD};
pub use train::{train, TrainConfig, TrainResult};

/// Anything that can score a feature row
pub trait RiskModel {
    /// Probability in [0, 1] that the row indicates heart disease
    fn positive_probability(&self, row: &[f64; NUM_FEATURES]) -> f64;
}

/// Tree ensemble used for training
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Random forest (bagged CART trees)
    #[default]
    Forest,
    /// Gradient-boosted trees
    Gbdt,
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Forest => write!(f, "random forest"),
            Algorithm::Gbdt => write!(f, "gbdt"),
        }
    }
}

/// Errors loading or writing a model artifact
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model file not found: {path}. Train one with `heartcheck train --data <csv>`")]
    Missing { path: PathBuf },

    #[error("Failed to read model file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Model file {path} is not a valid model artifact: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported model format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Model was trained on features {found:?}, expected {expected:?}", expected = FEATURE_NAMES)]
    SchemaMismatch { found: Vec<String> },

    #[error("Model parameters are incompatible: {0}")]
    Incompatible(String),

    #[error("Failed to serialize model: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to write model file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors during training
#[derive(Error, Debug)]
pub enum TrainError {
    #[error("No training samples provided")]
    NoSamples,

    #[error("Row count ({rows}) does not match label count ({labels})")]
    LengthMismatch { rows: usize, labels: usize },

    #[error("Invalid training configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Model(#[from] ModelError),
}
