//! Check command - collect answers, derive features, predict, report

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use heartcheck::answers::{
    Diet, Exercise, FamilyHistory, Gender, Sleep, Smoking, Stress, UserResponses, Weight,
    MAX_AGE, MIN_AGE,
};
use heartcheck::classifier::{predict, FeatureVector, ModelArtifact};
use heartcheck::clinical::{ExerciseAngina, FastingBloodSugar, RestingEcg, StSlope, Thal};
use heartcheck::config::UserConfig;
use heartcheck::reporters::{self, RiskReport, TextOptions};

use super::prompt::Prompter;

fn parse_number(s: &str) -> Result<f64, String> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
        .ok_or_else(|| format!("'{}' is not a valid number", s))
}

/// Parse an age, constraining it to the supported range
fn parse_age(s: &str) -> Result<u8, String> {
    parse_number(s).map(|v| v.clamp(f64::from(MIN_AGE), f64::from(MAX_AGE)) as u8)
}

// The integer parsers saturate at the type's limits; `clamped()` applies
// the clinical bounds afterwards.
fn parse_u8(s: &str) -> Result<u8, String> {
    parse_number(s).map(|v| v as u8)
}

fn parse_u16(s: &str) -> Result<u16, String> {
    parse_number(s).map(|v| v as u16)
}

#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Read answers from a TOML file (flags override it)
    #[arg(long, short = 'a', value_name = "FILE")]
    pub answers: Option<PathBuf>,

    /// Ask each question in the terminal
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Output format: text, json
    #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Model file (default: model.path from config, or model.json)
    #[arg(long, short = 'm')]
    pub model: Option<PathBuf>,

    /// Also print the 13 derived clinical features
    #[arg(long)]
    pub show_features: bool,

    #[command(flatten)]
    pub lifestyle: LifestyleArgs,

    #[command(flatten)]
    pub clinical: ClinicalArgs,
}

/// Questionnaire answers
#[derive(Args, Debug, Default)]
#[command(next_help_heading = "Questionnaire")]
pub struct LifestyleArgs {
    /// Age in years (18-100)
    #[arg(long, value_parser = parse_age, allow_negative_numbers = true)]
    pub age: Option<u8>,

    #[arg(long, value_enum)]
    pub gender: Option<Gender>,

    /// Smoking habit
    #[arg(long, value_enum)]
    pub smoking: Option<Smoking>,

    /// Days of exercise per week
    #[arg(long, value_enum)]
    pub exercise: Option<Exercise>,

    /// Overall diet quality
    #[arg(long, value_enum)]
    pub diet: Option<Diet>,

    /// Stress on most days
    #[arg(long, value_enum)]
    pub stress: Option<Stress>,

    /// Heart problems in close family
    #[arg(long, value_enum)]
    pub family_history: Option<FamilyHistory>,

    /// Weight category
    #[arg(long, value_enum)]
    pub weight: Option<Weight>,

    /// Sleep quality
    #[arg(long, value_enum)]
    pub sleep: Option<Sleep>,
}

/// Known test values (0 or `unknown` keeps the estimate)
#[derive(Args, Debug, Default)]
#[command(next_help_heading = "Clinical values")]
pub struct ClinicalArgs {
    /// Resting blood pressure in mmHg (max 300)
    #[arg(long, value_name = "MMHG", value_parser = parse_u16, allow_negative_numbers = true)]
    pub resting_bp: Option<u16>,

    /// Serum cholesterol in mg/dL (max 800)
    #[arg(long, value_name = "MG_DL", value_parser = parse_u16, allow_negative_numbers = true)]
    pub cholesterol: Option<u16>,

    /// Fasting blood sugar above 120 mg/dL
    #[arg(long, value_enum)]
    pub fasting_blood_sugar: Option<FastingBloodSugar>,

    /// Resting ECG result
    #[arg(long, value_enum)]
    pub resting_ecg: Option<RestingEcg>,

    /// Maximum heart rate reached in bpm (max 230)
    #[arg(long, value_name = "BPM", value_parser = parse_u16, allow_negative_numbers = true)]
    pub max_heart_rate: Option<u16>,

    /// Chest pain during exercise
    #[arg(long, value_enum)]
    pub exercise_angina: Option<ExerciseAngina>,

    /// ST depression induced by exercise (max 10.0)
    #[arg(long, value_name = "MM", allow_negative_numbers = true)]
    pub st_depression: Option<f64>,

    /// Slope of the peak exercise ST segment
    #[arg(long, value_enum)]
    pub st_slope: Option<StSlope>,

    /// Major vessels colored by fluoroscopy (max 4)
    #[arg(long, value_name = "COUNT", value_parser = parse_u8, allow_negative_numbers = true)]
    pub vessels: Option<u8>,

    #[arg(long, value_enum)]
    pub thal: Option<Thal>,
}

impl LifestyleArgs {
    fn apply(&self, r: &mut UserResponses) {
        if let Some(v) = self.age {
            r.age = v;
        }
        if let Some(v) = self.gender {
            r.gender = v;
        }
        if let Some(v) = self.smoking {
            r.smoking = v;
        }
        if let Some(v) = self.exercise {
            r.exercise = v;
        }
        if let Some(v) = self.diet {
            r.diet = v;
        }
        if let Some(v) = self.stress {
            r.stress = v;
        }
        if let Some(v) = self.family_history {
            r.family_history = v;
        }
        if let Some(v) = self.weight {
            r.weight = v;
        }
        if let Some(v) = self.sleep {
            r.sleep = v;
        }
    }
}

impl ClinicalArgs {
    fn apply(&self, r: &mut UserResponses) {
        let c = &mut r.clinical;
        if let Some(v) = self.resting_bp {
            c.resting_bp = v;
        }
        if let Some(v) = self.cholesterol {
            c.cholesterol = v;
        }
        if let Some(v) = self.fasting_blood_sugar {
            c.fasting_blood_sugar = v;
        }
        if let Some(v) = self.resting_ecg {
            c.resting_ecg = v;
        }
        if let Some(v) = self.max_heart_rate {
            c.max_heart_rate = v;
        }
        if let Some(v) = self.exercise_angina {
            c.exercise_angina = v;
        }
        if let Some(v) = self.st_depression {
            c.st_depression = v;
        }
        if let Some(v) = self.st_slope {
            c.st_slope = v;
        }
        if let Some(v) = self.vessels {
            c.vessels = v;
        }
        if let Some(v) = self.thal {
            c.thal = v;
        }
    }
}

/// Merge the answers file (if any) with command-line flags.
fn collect_responses(args: &CheckArgs) -> Result<UserResponses> {
    let mut responses = match &args.answers {
        Some(path) => load_answers(path)?,
        None => UserResponses::default(),
    };
    args.lifestyle.apply(&mut responses);
    args.clinical.apply(&mut responses);
    Ok(responses.clamped())
}

fn load_answers(path: &Path) -> Result<UserResponses> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read answers file {}", path.display()))?;
    UserResponses::from_toml(&content)
        .with_context(|| format!("Invalid answers file {}", path.display()))
}

/// Run the check command
pub fn run(args: CheckArgs, config: &UserConfig) -> Result<()> {
    // Load the model first so a missing artifact fails before any questions
    let model_path = args.model.clone().unwrap_or_else(|| config.model_path());
    let artifact = ModelArtifact::load(&model_path)?;

    let mut responses = collect_responses(&args)?;
    if args.interactive {
        let stdin = std::io::stdin();
        let mut prompter = Prompter::new(stdin.lock(), std::io::stderr());
        responses = prompter.ask(responses)?;
    }

    let features = FeatureVector::derive(&responses);

    let prediction = predict(&artifact.model, &features);
    tracing::info!(
        "Predicted {} (p = {:.4})",
        prediction.label,
        prediction.probability
    );

    let report = RiskReport {
        responses,
        features,
        prediction,
    };
    let options = TextOptions {
        show_features: args.show_features,
    };
    let output = reporters::report(&report, &args.format, options)?;
    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_age_clamps() {
        assert_eq!(parse_age("45"), Ok(45));
        assert_eq!(parse_age("12"), Ok(18));
        assert_eq!(parse_age("130"), Ok(100));
        assert!(parse_age("old").is_err());
        assert_eq!(parse_age("-5"), Ok(18));
        assert_eq!(parse_age("256"), Ok(100));
    }

    #[test]
    fn test_clinical_numbers_saturate_then_clamp() {
        assert_eq!(parse_u16("70000"), Ok(u16::MAX));
        assert_eq!(parse_u16("-5"), Ok(0));
        assert_eq!(parse_u8("300"), Ok(u8::MAX));
        assert!(parse_u16("high").is_err());
        assert!(parse_u16("NaN").is_err());

        let args = CheckArgs {
            clinical: ClinicalArgs {
                resting_bp: parse_u16("70000").ok(),
                cholesterol: parse_u16("-5").ok(),
                vessels: parse_u8("300").ok(),
                ..Default::default()
            },
            ..Default::default()
        };
        let c = collect_responses(&args).unwrap().clinical;
        assert_eq!(c.resting_bp, 300);
        assert_eq!(c.cholesterol(), None);
        assert_eq!(c.vessels, 4);
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = CheckArgs {
            lifestyle: LifestyleArgs {
                age: Some(60),
                smoking: Some(Smoking::Daily),
                ..Default::default()
            },
            clinical: ClinicalArgs {
                resting_bp: Some(900),
                thal: Some(Thal::ReversibleDefect),
                ..Default::default()
            },
            ..Default::default()
        };
        let r = collect_responses(&args).unwrap();
        assert_eq!(r.age, 60);
        assert_eq!(r.smoking, Smoking::Daily);
        assert_eq!(r.diet, Diet::default());
        assert_eq!(r.clinical.resting_bp, 300);
        assert_eq!(r.clinical.thal, Thal::ReversibleDefect);
    }

    #[test]
    fn test_flags_override_answers_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.toml");
        std::fs::write(
            &path,
            "age = 70\nsmoking = \"Daily\"\nweight = \"obese\"\n\n[clinical]\ncholesterol = 250\n",
        )
        .unwrap();

        let args = CheckArgs {
            answers: Some(path),
            lifestyle: LifestyleArgs {
                smoking: Some(Smoking::Never),
                ..Default::default()
            },
            ..Default::default()
        };
        let r = collect_responses(&args).unwrap();
        assert_eq!(r.age, 70);
        assert_eq!(r.smoking, Smoking::Never);
        assert_eq!(r.weight, Weight::Obese);
        assert_eq!(r.clinical.cholesterol, 250);
    }

    #[test]
    fn test_bad_answers_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "smoking = \"sometimes\"\n").unwrap();

        let args = CheckArgs {
            answers: Some(path),
            ..Default::default()
        };
        let err = collect_responses(&args).unwrap_err();
        assert!(format!("{err:#}").contains("bad.toml"));
    }
}
