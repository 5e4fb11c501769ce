//! Feature derivation
//!
//! Converts questionnaire answers into the 13 clinical features the
//! classifier was trained on. Each field is either a supplied clinical
//! value or a deterministic estimate from the answers; `resolve` is the
//! single place where that choice is made.

use serde::{Deserialize, Serialize};

use crate::answers::UserResponses;

/// Number of features in the clinical schema
pub const NUM_FEATURES: usize = 13;

/// Column names in schema order (also the dataset header)
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

/// Use the supplied value if there is one, otherwise derive it.
pub fn resolve<T>(supplied: Option<T>, derive: impl FnOnce() -> T) -> T {
    supplied.unwrap_or_else(derive)
}

/// Model input, one field per schema column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub age: u8,
    pub sex: u8,
    /// Chest pain type
    pub cp: u8,
    /// Resting blood pressure
    pub trestbps: u16,
    /// Serum cholesterol
    pub chol: u16,
    /// Fasting blood sugar > 120 mg/dL
    pub fbs: u8,
    /// Resting ECG result
    pub restecg: u8,
    /// Max heart rate
    pub thalach: u16,
    /// Exercise-induced angina
    pub exang: u8,
    /// ST depression
    pub oldpeak: f64,
    /// ST slope at peak exercise
    pub slope: u8,
    /// Major vessel count
    pub ca: u8,
    /// Thalassemia code
    pub thal: u8,
}

impl FeatureVector {
    /// Derive the full vector from a questionnaire submission.
    pub fn derive(responses: &UserResponses) -> Self {
        let ranks = Ranks::from(responses);
        let clinical = &responses.clinical;

        let features = Self {
            age: ranks.age,
            sex: responses.gender.sex_code(),
            cp: ranks.chest_pain(),
            trestbps: resolve(clinical.resting_bp(), || ranks.resting_bp()),
            chol: resolve(clinical.cholesterol(), || ranks.cholesterol()),
            fbs: resolve(clinical.fasting_blood_sugar(), || ranks.fasting_blood_sugar()),
            restecg: resolve(clinical.resting_ecg(), || ranks.resting_ecg()),
            thalach: resolve(clinical.max_heart_rate(), || ranks.max_heart_rate()),
            exang: resolve(clinical.exercise_angina(), || ranks.exercise_angina()),
            oldpeak: resolve(clinical.st_depression(), || ranks.st_depression()),
            slope: resolve(clinical.st_slope(), || ranks.st_slope()),
            ca: resolve(clinical.vessels(), || ranks.vessels()),
            thal: resolve(clinical.thal(), || ranks.thal()),
        };
        tracing::debug!(?features, "Derived feature vector");
        features
    }

    /// Values in schema order
    pub fn to_array(&self) -> [f64; NUM_FEATURES] {
        [
            f64::from(self.age),
            f64::from(self.sex),
            f64::from(self.cp),
            f64::from(self.trestbps),
            f64::from(self.chol),
            f64::from(self.fbs),
            f64::from(self.restecg),
            f64::from(self.thalach),
            f64::from(self.exang),
            self.oldpeak,
            f64::from(self.slope),
            f64::from(self.ca),
            f64::from(self.thal),
        ]
    }

    /// (name, value) pairs in schema order
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_NAMES.into_iter().zip(self.to_array())
    }
}

/// Ordinal ranks of the answers plus age
#[derive(Debug, Clone, Copy)]
struct Ranks {
    age: u8,
    smoke: usize,
    exercise: usize,
    diet: usize,
    stress: usize,
    weight: usize,
    family: bool,
}

impl From<&UserResponses> for Ranks {
    fn from(r: &UserResponses) -> Self {
        Self {
            age: r.age,
            smoke: r.smoking.rank(),
            exercise: r.exercise.rank(),
            diet: r.diet.rank(),
            stress: r.stress.rank(),
            weight: r.weight.rank(),
            family: r.family_history.is_positive(),
        }
    }
}

const SMOKE_CHOLESTEROL_PENALTY: [f64; 3] = [0.0, 15.0, 30.0];
const DIET_CHOLESTEROL_ADJUST: [f64; 3] = [25.0, 10.0, -10.0];
const EXERCISE_HEART_RATE_BONUS: [f64; 4] = [-10.0, -5.0, 0.0, 5.0];

impl Ranks {
    fn years_over_18(&self) -> f64 {
        f64::from(self.age) - 18.0
    }

    fn resting_bp(&self) -> u16 {
        let base = 110.0 + self.years_over_18() * 0.2;
        (base + self.stress as f64 * 8.0 + self.weight as f64 * 7.0) as u16
    }

    fn cholesterol(&self) -> u16 {
        let base = 160.0 + self.years_over_18() * 0.8;
        (base + SMOKE_CHOLESTEROL_PENALTY[self.smoke] + DIET_CHOLESTEROL_ADJUST[self.diet]) as u16
    }

    fn max_heart_rate(&self) -> u16 {
        let base = 200.0 - f64::from(self.age);
        let estimate =
            base + EXERCISE_HEART_RATE_BONUS[self.exercise] - self.stress as f64 * 5.0;
        estimate.clamp(90.0, 200.0) as u16
    }

    fn st_depression(&self) -> f64 {
        let raw = 0.2 + self.stress as f64 * 0.6 + self.weight.saturating_sub(1) as f64 * 0.3;
        (raw * 10.0).round() / 10.0
    }

    fn chest_pain(&self) -> u8 {
        if self.stress == 2 && self.exercise == 0 {
            2
        } else if self.stress == 2 && self.smoke == 2 {
            1
        } else {
            0
        }
    }

    fn fasting_blood_sugar(&self) -> u8 {
        if self.diet == 0 && self.weight == 3 {
            return 1;
        }
        if self.age >= 60 && self.diet == 0 {
            return 1;
        }
        0
    }

    fn resting_ecg(&self) -> u8 {
        0
    }

    fn exercise_angina(&self) -> u8 {
        u8::from(self.exercise == 0 && self.stress >= 1)
    }

    fn st_slope(&self) -> u8 {
        if self.exercise >= 2 && self.stress == 0 {
            0 // upsloping
        } else if self.stress == 2 {
            2 // downsloping
        } else {
            1 // flat
        }
    }

    fn vessels(&self) -> u8 {
        u8::from(self.age >= 60 && self.smoke == 2)
    }

    fn thal(&self) -> u8 {
        if self.family {
            2
        } else {
            1
        }
    }
}
