//! Serialized model artifact
//!
//! The artifact is the only interface between training and inference. It is
//! plain JSON holding the format version, the feature schema the model was
//! trained on, and the fitted parameters. Nothing time-dependent is stored,
//! so the same data and seed always produce the same bytes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::features::{FEATURE_NAMES, NUM_FEATURES};
use super::forest::RandomForest;
use super::gbdt_model::GbdtModel;
use super::{Algorithm, ModelError, RiskModel};

pub const FORMAT_VERSION: u32 = 1;

/// Fitted parameters, tagged by algorithm
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "algorithm", content = "parameters", rename_all = "snake_case")]
pub enum TrainedModel {
    RandomForest(RandomForest),
    Gbdt(GbdtModel),
}

impl TrainedModel {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            TrainedModel::RandomForest(_) => Algorithm::Forest,
            TrainedModel::Gbdt(_) => Algorithm::Gbdt,
        }
    }
}

impl RiskModel for TrainedModel {
    fn positive_probability(&self, row: &[f64; NUM_FEATURES]) -> f64 {
        match self {
            TrainedModel::RandomForest(m) => m.positive_probability(row),
            TrainedModel::Gbdt(m) => m.positive_probability(row),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub n_trees: usize,
    pub seed: u64,
    pub model: TrainedModel,
}

impl ModelArtifact {
    pub fn new(model: TrainedModel, n_trees: usize, seed: u64) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            n_trees,
            seed,
            model,
        }
    }

    /// Serialize to the on-disk byte representation.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parse and validate an artifact.
    pub fn from_bytes(bytes: &[u8], path: &Path) -> Result<Self, ModelError> {
        let artifact: ModelArtifact =
            serde_json::from_slice(bytes).map_err(|source| ModelError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Load the artifact at `path`. Missing or incompatible files are fatal.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        Self::load_with_digest(path).map(|(artifact, _)| artifact)
    }

    /// Load the artifact and return it with the SHA-256 of the file.
    pub fn load_with_digest(path: &Path) -> Result<(Self, String), ModelError> {
        let bytes = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ModelError::Missing {
                    path: path.to_path_buf(),
                }
            } else {
                ModelError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let artifact = Self::from_bytes(&bytes, path)?;
        tracing::info!(
            "Loaded {} model ({} trees) from {}",
            artifact.model.algorithm(),
            artifact.n_trees,
            path.display()
        );
        Ok((artifact, digest_hex(&bytes)))
    }

    /// Write the artifact to `path`, creating parent directories.
    ///
    /// Returns the SHA-256 digest of the written bytes.
    pub fn save(&self, path: &Path) -> Result<String, ModelError> {
        let write_err = |source: std::io::Error| ModelError::Write {
            path: path.to_path_buf(),
            source,
        };
        let bytes = self.to_bytes().map_err(ModelError::Serialize)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, &bytes).map_err(write_err)?;
        Ok(digest_hex(&bytes))
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.format_version != FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion {
                found: self.format_version,
                expected: FORMAT_VERSION,
            });
        }
        if self.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(ModelError::SchemaMismatch {
                found: self.feature_names.clone(),
            });
        }
        if let TrainedModel::RandomForest(forest) = &self.model {
            forest.validate().map_err(ModelError::Incompatible)?;
        }
        Ok(())
    }
}

/// Lowercase hex SHA-256 of `bytes`
pub fn digest_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
