//! Risk prediction
//!
//! A single threshold on the positive-class probability. Anything strictly
//! above 0.5 is high risk; exactly 0.5 is still low risk.

use serde::{Deserialize, Serialize};

use super::features::FeatureVector;
use super::RiskModel;

pub const RISK_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    Low,
    High,
}

impl RiskLabel {
    pub fn from_probability(probability: f64) -> Self {
        if probability > RISK_THRESHOLD {
            RiskLabel::High
        } else {
            RiskLabel::Low
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            RiskLabel::Low => "Low Risk",
            RiskLabel::High => "High Risk",
        }
    }

    /// Static lifestyle advice for this label
    pub fn advice(self) -> &'static [&'static str] {
        match self {
            RiskLabel::Low => &[
                "You're doing well! Keep up regular activity, balanced meals, and enough rest.",
            ],
            RiskLabel::High => &[
                "You may be at a higher heart risk. Consider improving diet, exercising more, and managing stress.",
                "Small, steady lifestyle changes make a big difference over time.",
            ],
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Outcome of one prediction pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Positive-class probability (0.0..=1.0)
    pub probability: f64,
    pub label: RiskLabel,
    /// Probability as a percentage, rounded to one decimal
    pub risk_percent: f64,
    /// Remaining share, never negative
    pub safe_percent: f64,
}

impl PredictionResult {
    pub fn from_probability(probability: f64) -> Self {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        let risk_percent = (probability * 1000.0).round() / 10.0;
        Self {
            probability,
            label: RiskLabel::from_probability(probability),
            risk_percent,
            safe_percent: (100.0 - risk_percent).max(0.0),
        }
    }

    pub fn is_high_risk(&self) -> bool {
        self.label == RiskLabel::High
    }
}

/// Score one feature vector.
pub fn predict<M: RiskModel + ?Sized>(model: &M, features: &FeatureVector) -> PredictionResult {
    let probability = model.positive_probability(&features.to_array());
    let result = PredictionResult::from_probability(probability);
    tracing::debug!(probability, label = %result.label, "Prediction");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::UserResponses;
    use crate::classifier::NUM_FEATURES;

    struct Fixed(f64);

    impl RiskModel for Fixed {
        fn positive_probability(&self, _row: &[f64; NUM_FEATURES]) -> f64 {
            self.0
        }
    }

    /// Scores by cholesterol so the row contents matter
    struct CholesterolModel;

    impl RiskModel for CholesterolModel {
        fn positive_probability(&self, row: &[f64; NUM_FEATURES]) -> f64 {
            if row[4] > 220.0 {
                0.8
            } else {
                0.2
            }
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(RiskLabel::from_probability(0.5), RiskLabel::Low);
        assert_eq!(RiskLabel::from_probability(0.500_001), RiskLabel::High);
        assert_eq!(RiskLabel::from_probability(0.0), RiskLabel::Low);
        assert_eq!(RiskLabel::from_probability(1.0), RiskLabel::High);
    }

    #[test]
    fn test_percentages() {
        let r = PredictionResult::from_probability(0.7254);
        assert_eq!(r.risk_percent, 72.5);
        assert_eq!(r.safe_percent, 27.5);
        assert!(r.is_high_risk());

        let r = PredictionResult::from_probability(1.0);
        assert_eq!(r.risk_percent, 100.0);
        assert_eq!(r.safe_percent, 0.0);
    }

    #[test]
    fn test_out_of_range_probability_is_clamped() {
        assert_eq!(PredictionResult::from_probability(1.7).probability, 1.0);
        assert_eq!(PredictionResult::from_probability(-0.2).probability, 0.0);
        assert_eq!(PredictionResult::from_probability(f64::NAN).label, RiskLabel::Low);
    }

    #[test]
    fn test_predict_uses_model() {
        let features = FeatureVector::derive(&UserResponses::default());
        assert_eq!(predict(&Fixed(0.5), &features).label, RiskLabel::Low);
        assert_eq!(predict(&Fixed(0.51), &features).label, RiskLabel::High);

        let mut responses = UserResponses::default();
        responses.clinical.cholesterol = 300;
        let high = FeatureVector::derive(&responses);
        assert!(predict(&CholesterolModel, &high).is_high_risk());

        let dyn_model: &dyn RiskModel = &CholesterolModel;
        responses.clinical.cholesterol = 150;
        let low = FeatureVector::derive(&responses);
        assert!(!predict(dyn_model, &low).is_high_risk());
    }

    #[test]
    fn test_advice_branches_on_label() {
        assert_eq!(RiskLabel::Low.advice().len(), 1);
        assert_eq!(RiskLabel::High.advice().len(), 2);
    }
}
