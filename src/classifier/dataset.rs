//! Labeled training data
//!
//! Reads a CSV with the 13 feature columns (any order) plus a binary
//! `target` column, and splits it into train/test partitions with a seeded
//! shuffle.

use std::io::Read;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use super::features::{FEATURE_NAMES, NUM_FEATURES};

pub const TARGET_COLUMN: &str = "target";

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset is missing column '{0}'")]
    MissingColumn(String),

    #[error("Row {row}: column '{column}' has non-numeric value '{value}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Row {row}: target must be 0 or 1, got '{value}'")]
    InvalidTarget { row: usize, value: String },

    #[error("Dataset has no rows")]
    Empty,
}

/// Feature rows and their labels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub rows: Vec<[f64; NUM_FEATURES]>,
    pub labels: Vec<bool>,
}

impl Dataset {
    /// Load a CSV dataset from disk.
    pub fn from_csv(path: &Path) -> Result<Self, DatasetError> {
        let file = std::fs::File::open(path).map_err(|source| DatasetError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(file)?;
        tracing::info!(
            "Loaded {} rows ({} positive) from {}",
            dataset.len(),
            dataset.positives(),
            path.display()
        );
        Ok(dataset)
    }

    /// Parse CSV from any reader. The header row is required.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
        };

        let mut feature_cols = [0usize; NUM_FEATURES];
        for (slot, name) in feature_cols.iter_mut().zip(FEATURE_NAMES) {
            *slot = column(name)?;
        }
        let target_col = column(TARGET_COLUMN)?;

        let mut dataset = Dataset::default();
        for (i, record) in csv.records().enumerate() {
            let record = record?;
            // Header is line 1
            let row_no = i + 2;
            let cell = |col: usize| record.get(col).unwrap_or("");

            let mut row = [0.0; NUM_FEATURES];
            for (k, &col) in feature_cols.iter().enumerate() {
                let raw = cell(col);
                row[k] = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| DatasetError::InvalidValue {
                        row: row_no,
                        column: FEATURE_NAMES[k].to_string(),
                        value: raw.to_string(),
                    })?;
            }

            let raw = cell(target_col);
            let label = match raw.parse::<f64>() {
                Ok(v) if v == 0.0 => false,
                Ok(v) if v == 1.0 => true,
                _ => {
                    return Err(DatasetError::InvalidTarget {
                        row: row_no,
                        value: raw.to_string(),
                    })
                }
            };

            dataset.rows.push(row);
            dataset.labels.push(label);
        }

        if dataset.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&l| l).count()
    }

    fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            rows: indices.iter().map(|&i| self.rows[i]).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// Shuffle with `seed` and split off `test_fraction` of the rows.
    ///
    /// The test partition gets `ceil(test_fraction * n)` rows; the rest train.
    /// Returns `(train, test)`.
    pub fn split(&self, test_fraction: f64, seed: u64) -> (Dataset, Dataset) {
        let n = self.len();
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let test_n = ((test_fraction.clamp(0.0, 1.0) * n as f64).ceil() as usize).min(n);
        let (test_idx, train_idx) = indices.split_at(test_n);
        (self.subset(train_idx), self.subset(test_idx))
    }
}
