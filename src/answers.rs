//! Plain-language questionnaire answers
//!
//! Every question is an exhaustive enum whose variants are listed in rank
//! order. The rank of a variant is its zero-based position in that order,
//! so an unrecognised label cannot reach the feature derivation.

use serde::{Deserialize, Serialize};

/// Declare an ordered answer enum.
///
/// Each variant carries its display label (also accepted by serde and
/// `FromStr`) and a short CLI name. The first variant is the default.
macro_rules! ordinal_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($label:literal, $cli:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            serde::Serialize,
            serde::Deserialize,
            clap::ValueEnum,
        )]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $label, alias = $cli)]
                #[value(name = $cli)]
                $variant,
            )+
        }

        impl $name {
            /// All options, in rank order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Zero-based position within the ordered option list
            pub fn rank(self) -> usize {
                self as usize
            }

            /// Display label
            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            /// Short name accepted on the command line
            pub fn cli_name(self) -> &'static str {
                match self {
                    $(Self::$variant => $cli,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ALL[0]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().eq_ignore_ascii_case(s) || v.cli_name().eq_ignore_ascii_case(s))
                    .ok_or_else(|| {
                        let valid: Vec<&str> = Self::ALL.iter().map(|v| v.label()).collect();
                        format!(
                            "Unknown {} '{}'. Valid options: {}",
                            stringify!($name),
                            s,
                            valid.join(", ")
                        )
                    })
            }
        }
    };
}

pub(crate) use ordinal_enum;

ordinal_enum! {
    Gender {
        Male => ("Male", "male"),
        Female => ("Female", "female"),
    }
}

impl Gender {
    /// Binary sex code used by the clinical schema (1 = male)
    pub fn sex_code(self) -> u8 {
        match self {
            Gender::Male => 1,
            Gender::Female => 0,
        }
    }
}

ordinal_enum! {
    /// Smoking habit
    Smoking {
        Never => ("Never", "never"),
        Occasionally => ("Occasionally", "occasionally"),
        Daily => ("Daily", "daily"),
    }
}

ordinal_enum! {
    /// Any activity that raises the heart rate counts
    Exercise {
        Rarely => ("Rarely", "rarely"),
        OneToTwoDays => ("1-2 days/week", "1-2"),
        ThreeToFiveDays => ("3-5 days/week", "3-5"),
        Everyday => ("Everyday", "everyday"),
    }
}

ordinal_enum! {
    /// Balance of fruit and vegetables against fried or processed food
    Diet {
        Poor => ("Poor", "poor"),
        Average => ("Average", "average"),
        Healthy => ("Healthy", "healthy"),
    }
}

ordinal_enum! {
    Stress {
        Low => ("Low", "low"),
        Moderate => ("Moderate", "moderate"),
        High => ("High", "high"),
    }
}

ordinal_enum! {
    /// Family history of heart problems
    FamilyHistory {
        No => ("No", "no"),
        Yes => ("Yes", "yes"),
    }
}

impl FamilyHistory {
    pub fn is_positive(self) -> bool {
        self == FamilyHistory::Yes
    }
}

ordinal_enum! {
    Weight {
        Underweight => ("Underweight", "underweight"),
        Normal => ("Normal", "normal"),
        Overweight => ("Overweight", "overweight"),
        Obese => ("Obese", "obese"),
    }
}

ordinal_enum! {
    Sleep {
        Poor => ("Poor", "poor"),
        Average => ("Average", "average"),
        Good => ("Good", "good"),
    }
}

pub const MIN_AGE: u8 = 18;
pub const MAX_AGE: u8 = 100;
pub const DEFAULT_AGE: u8 = 45;

/// One questionnaire submission
///
/// Created per check and discarded after the prediction. Clinical
/// overrides are optional; anything left at its default is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserResponses {
    #[serde(deserialize_with = "crate::clinical::saturating::as_u8")]
    pub age: u8,
    pub gender: Gender,
    pub smoking: Smoking,
    pub exercise: Exercise,
    pub diet: Diet,
    pub stress: Stress,
    pub family_history: FamilyHistory,
    pub weight: Weight,
    pub sleep: Sleep,
    pub clinical: crate::clinical::ClinicalOverrides,
}

impl Default for UserResponses {
    fn default() -> Self {
        Self {
            age: DEFAULT_AGE,
            gender: Gender::default(),
            smoking: Smoking::default(),
            exercise: Exercise::default(),
            diet: Diet::default(),
            stress: Stress::default(),
            family_history: FamilyHistory::default(),
            weight: Weight::default(),
            sleep: Sleep::default(),
            clinical: Default::default(),
        }
    }
}

impl UserResponses {
    /// Constrain every bounded input to its allowed range.
    pub fn clamped(mut self) -> Self {
        self.age = self.age.clamp(MIN_AGE, MAX_AGE);
        self.clinical = self.clinical.clamped();
        self
    }

    /// Parse an answers file (TOML).
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<UserResponses>(content).map(UserResponses::clamped)
    }

    /// Plain-language summary lines, in question order
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Age", self.age.to_string()),
            ("Gender", self.gender.to_string()),
            ("Smoking", self.smoking.to_string()),
            ("Exercise", self.exercise.to_string()),
            ("Diet", self.diet.to_string()),
            ("Stress", self.stress.to_string()),
            ("Family history", self.family_history.to_string()),
            ("Weight", self.weight.to_string()),
            ("Sleep", self.sleep.to_string()),
        ]
    }
}
