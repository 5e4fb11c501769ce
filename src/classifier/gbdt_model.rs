//! GBDT model wrapper
//!
//! Wraps the `gbdt` crate as an alternative tree ensemble:
//! - Training from the same rows/labels the forest uses
//! - Single-row inference behind `RiskModel`
//!
//! The `LogLikelyhood` loss gives calibrated probabilities, with label 1.0
//! for heart disease present and -1.0 for absent.
//!
//! Note: the gbdt crate internally uses `f32` (`ValueType`), while feature
//! vectors are `f64`. Conversions happen at the crate boundary.

use gbdt::config::Config;
use gbdt::decision_tree::Data;
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};

use super::features::NUM_FEATURES;
use super::{RiskModel, TrainError};

/// Boosting hyperparameters
#[derive(Debug, Clone)]
pub struct GbdtConfig {
    /// Boosting iterations
    pub n_trees: usize,
    pub max_depth: u32,
    /// Shrinkage / step size
    pub learning_rate: f32,
}

impl Default for GbdtConfig {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 4,
            learning_rate: 0.1,
        }
    }
}

#[inline]
fn row_to_f32(row: &[f64; NUM_FEATURES]) -> Vec<f32> {
    row.iter().map(|&v| v as f32).collect()
}

/// Thin wrapper around `gbdt::gradient_boost::GBDT`
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct GbdtModel {
    model: GBDT,
}

impl std::fmt::Debug for GbdtModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GbdtModel").finish_non_exhaustive()
    }
}

impl GbdtModel {
    /// Train a boosted model.
    ///
    /// Data and feature sampling ratios stay at 1.0, which keeps the fit
    /// deterministic for a given input.
    pub fn fit(
        rows: &[[f64; NUM_FEATURES]],
        labels: &[bool],
        config: &GbdtConfig,
    ) -> Result<Self, TrainError> {
        if rows.is_empty() {
            return Err(TrainError::NoSamples);
        }
        if rows.len() != labels.len() {
            return Err(TrainError::LengthMismatch {
                rows: rows.len(),
                labels: labels.len(),
            });
        }
        if config.n_trees == 0 {
            return Err(TrainError::InvalidConfig("n_trees must be at least 1".into()));
        }

        let mut cfg = Config::new();
        cfg.set_feature_size(NUM_FEATURES);
        cfg.set_max_depth(config.max_depth);
        cfg.set_iterations(config.n_trees);
        cfg.set_shrinkage(config.learning_rate);
        cfg.set_loss("LogLikelyhood");
        cfg.set_debug(false);
        cfg.set_training_optimization_level(2);
        cfg.set_min_leaf_size(1);

        let mut gbdt = GBDT::new(&cfg);

        let mut training_data: Vec<Data> = rows
            .iter()
            .zip(labels.iter())
            .map(|(row, &label)| {
                let target = if label { 1.0_f32 } else { -1.0_f32 };
                Data::new_training_data(row_to_f32(row), 1.0_f32, target, None)
            })
            .collect();

        gbdt.fit(&mut training_data);

        Ok(Self { model: gbdt })
    }
}

impl RiskModel for GbdtModel {
    fn positive_probability(&self, row: &[f64; NUM_FEATURES]) -> f64 {
        let data = vec![Data::new_test_data(row_to_f32(row), None)];
        let preds = self.model.predict(&data);
        preds.first().copied().map(f64::from).unwrap_or(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_rows(n: usize) -> (Vec<[f64; NUM_FEATURES]>, Vec<bool>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..n {
            let positive = i < n / 2;
            let mut row = [0.0; NUM_FEATURES];
            row[0] = 40.0 + (i % 10) as f64;
            row[4] = if positive { 290.0 } else { 180.0 } + (i % 5) as f64;
            row[12] = if positive { 3.0 } else { 1.0 };
            rows.push(row);
            labels.push(positive);
        }
        (rows, labels)
    }

    fn small() -> GbdtConfig {
        GbdtConfig {
            n_trees: 10,
            max_depth: 3,
            learning_rate: 0.3,
        }
    }

    #[test]
    fn test_train_and_predict() {
        let (rows, labels) = make_rows(40);
        let model = GbdtModel::fit(&rows, &labels, &small()).expect("training should succeed");

        let p_pos = model.positive_probability(&rows[0]);
        let p_neg = model.positive_probability(&rows[39]);
        assert!((0.0..=1.0).contains(&p_pos), "got {p_pos}");
        assert!((0.0..=1.0).contains(&p_neg), "got {p_neg}");
        assert!(p_pos > p_neg, "{p_pos} should exceed {p_neg}");
    }

    #[test]
    fn test_train_validation_errors() {
        assert!(matches!(
            GbdtModel::fit(&[], &[], &small()),
            Err(TrainError::NoSamples)
        ));

        let (rows, _) = make_rows(2);
        assert!(matches!(
            GbdtModel::fit(&rows, &[true], &small()),
            Err(TrainError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_json_roundtrip_preserves_predictions() {
        let (rows, labels) = make_rows(20);
        let model = GbdtModel::fit(&rows, &labels, &small()).expect("training should succeed");

        let json = serde_json::to_string(&model).expect("serialise should succeed");
        let loaded: GbdtModel = serde_json::from_str(&json).expect("parse should succeed");

        let a = model.positive_probability(&rows[3]);
        let b = loaded.positive_probability(&rows[3]);
        assert!((a - b).abs() < 1e-6, "{a} vs {b}");
    }
}
