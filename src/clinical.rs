//! Optional clinical measurements supplied directly by the user
//!
//! Numeric fields use 0 for "not supplied" and categorical fields use
//! `Unknown`. The accessors turn each field into an explicit `Option` so the
//! feature derivation only ever sees "supplied" or "derive it".

use serde::{Deserialize, Serialize};

use crate::answers::ordinal_enum;

pub const MAX_RESTING_BP: u16 = 300;
pub const MAX_CHOLESTEROL: u16 = 800;
pub const MAX_HEART_RATE: u16 = 230;
pub const MAX_ST_DEPRESSION: f64 = 10.0;
pub const MAX_VESSELS: u8 = 4;

ordinal_enum! {
    /// Fasting blood sugar above 120 mg/dL
    FastingBloodSugar {
        Unknown => ("Unknown", "unknown"),
        No => ("No", "no"),
        Yes => ("Yes", "yes"),
    }
}

ordinal_enum! {
    RestingEcg {
        Unknown => ("Unknown", "unknown"),
        Normal => ("Normal", "normal"),
        StTAbnormality => ("ST-T wave abnormality", "st-t"),
        LvHypertrophy => ("Left ventricular hypertrophy", "lvh"),
    }
}

ordinal_enum! {
    /// Chest pain during exercise
    ExerciseAngina {
        Unknown => ("Unknown", "unknown"),
        No => ("No", "no"),
        Yes => ("Yes", "yes"),
    }
}

ordinal_enum! {
    /// Slope of the ST segment at peak exercise
    StSlope {
        Unknown => ("Unknown", "unknown"),
        Upsloping => ("Upsloping", "upsloping"),
        Flat => ("Flat", "flat"),
        Downsloping => ("Downsloping", "downsloping"),
    }
}

ordinal_enum! {
    /// Thalassemia
    Thal {
        Unknown => ("Unknown", "unknown"),
        Normal => ("Normal", "normal"),
        FixedDefect => ("Fixed defect", "fixed"),
        ReversibleDefect => ("Reversible defect", "reversible"),
    }
}

impl FastingBloodSugar {
    pub fn code(self) -> Option<u8> {
        match self {
            Self::Unknown => None,
            Self::No => Some(0),
            Self::Yes => Some(1),
        }
    }
}

impl RestingEcg {
    pub fn code(self) -> Option<u8> {
        match self {
            Self::Unknown => None,
            Self::Normal => Some(0),
            Self::StTAbnormality => Some(1),
            Self::LvHypertrophy => Some(2),
        }
    }
}

impl ExerciseAngina {
    pub fn code(self) -> Option<u8> {
        match self {
            Self::Unknown => None,
            Self::No => Some(0),
            Self::Yes => Some(1),
        }
    }
}

impl StSlope {
    pub fn code(self) -> Option<u8> {
        match self {
            Self::Unknown => None,
            Self::Upsloping => Some(0),
            Self::Flat => Some(1),
            Self::Downsloping => Some(2),
        }
    }
}

impl Thal {
    // Codes start at 1 in the clinical schema
    pub fn code(self) -> Option<u8> {
        match self {
            Self::Unknown => None,
            Self::Normal => Some(1),
            Self::FixedDefect => Some(2),
            Self::ReversibleDefect => Some(3),
        }
    }
}

/// Serde field helpers that accept any number and saturate it into the
/// field's type. `clamped()` then applies the real bounds.
pub(crate) mod saturating {
    use serde::{Deserialize, Deserializer};

    // `as` from f64 saturates at the type's limits and maps NaN to 0
    pub fn as_u8<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        Ok(f64::deserialize(deserializer)? as u8)
    }

    pub fn as_u16<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
        Ok(f64::deserialize(deserializer)? as u16)
    }
}

/// Directly supplied test values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalOverrides {
    /// Resting blood pressure (mmHg)
    #[serde(deserialize_with = "saturating::as_u16")]
    pub resting_bp: u16,
    /// Serum cholesterol (mg/dL)
    #[serde(deserialize_with = "saturating::as_u16")]
    pub cholesterol: u16,
    pub fasting_blood_sugar: FastingBloodSugar,
    pub resting_ecg: RestingEcg,
    /// Maximum heart rate achieved (bpm)
    #[serde(deserialize_with = "saturating::as_u16")]
    pub max_heart_rate: u16,
    pub exercise_angina: ExerciseAngina,
    /// ST depression induced by exercise (oldpeak)
    pub st_depression: f64,
    pub st_slope: StSlope,
    /// Major vessels colored by fluoroscopy
    #[serde(deserialize_with = "saturating::as_u8")]
    pub vessels: u8,
    pub thal: Thal,
}

/// A numeric field counts as supplied only when strictly positive.
fn supplied<T: PartialOrd + Default>(value: T) -> Option<T> {
    (value > T::default()).then_some(value)
}

impl ClinicalOverrides {
    /// Cap every numeric field at its acquisition bound.
    pub fn clamped(mut self) -> Self {
        self.resting_bp = self.resting_bp.min(MAX_RESTING_BP);
        self.cholesterol = self.cholesterol.min(MAX_CHOLESTEROL);
        self.max_heart_rate = self.max_heart_rate.min(MAX_HEART_RATE);
        // NaN carries no value; infinities clamp like any other number
        self.st_depression = if self.st_depression.is_nan() {
            0.0
        } else {
            self.st_depression.clamp(0.0, MAX_ST_DEPRESSION)
        };
        self.vessels = self.vessels.min(MAX_VESSELS);
        self
    }

    pub fn resting_bp(&self) -> Option<u16> {
        supplied(self.resting_bp)
    }

    pub fn cholesterol(&self) -> Option<u16> {
        supplied(self.cholesterol)
    }

    pub fn fasting_blood_sugar(&self) -> Option<u8> {
        self.fasting_blood_sugar.code()
    }

    pub fn resting_ecg(&self) -> Option<u8> {
        self.resting_ecg.code()
    }

    pub fn max_heart_rate(&self) -> Option<u16> {
        supplied(self.max_heart_rate)
    }

    pub fn exercise_angina(&self) -> Option<u8> {
        self.exercise_angina.code()
    }

    pub fn st_depression(&self) -> Option<f64> {
        supplied(self.st_depression)
    }

    pub fn st_slope(&self) -> Option<u8> {
        self.st_slope.code()
    }

    pub fn vessels(&self) -> Option<u8> {
        supplied(self.vessels)
    }

    pub fn thal(&self) -> Option<u8> {
        self.thal.code()
    }

    /// True when nothing was supplied
    pub fn is_empty(&self) -> bool {
        self.resting_bp().is_none()
            && self.cholesterol().is_none()
            && self.fasting_blood_sugar().is_none()
            && self.resting_ecg().is_none()
            && self.max_heart_rate().is_none()
            && self.exercise_angina().is_none()
            && self.st_depression().is_none()
            && self.st_slope().is_none()
            && self.vessels().is_none()
            && self.thal().is_none()
    }
}
