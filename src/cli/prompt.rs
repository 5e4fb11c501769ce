//! Interactive questionnaire
//!
//! Reads one answer per line. An empty line keeps the value shown in
//! brackets, and end of input keeps every remaining value, so piping a
//! partial answer list still completes.

use anyhow::Result;
use console::style;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

use heartcheck::answers::{
    Diet, Exercise, FamilyHistory, Gender, Sleep, Smoking, Stress, UserResponses, Weight,
    MAX_AGE, MIN_AGE,
};
use heartcheck::clinical::{
    ClinicalOverrides, ExerciseAngina, FastingBloodSugar, RestingEcg, StSlope, Thal,
    MAX_CHOLESTEROL, MAX_HEART_RATE, MAX_RESTING_BP, MAX_ST_DEPRESSION, MAX_VESSELS,
};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Walk through every question, starting from `base`.
    pub fn ask(&mut self, base: UserResponses) -> Result<UserResponses> {
        writeln!(
            self.output,
            "\n{}",
            style("💓 Heart Health Risk Checker").bold().cyan()
        )?;
        writeln!(
            self.output,
            "{}",
            style("Answer a few quick questions. Press Enter to keep the value in brackets.").dim()
        )?;

        let mut r = base;
        r.age = self.number("How old are you?", r.age, MIN_AGE, MAX_AGE)?;
        r.gender = self.choose("What is your gender?", None, Gender::ALL, r.gender)?;
        r.smoking = self.choose(
            "Do you smoke?",
            Some("Choose the option that best describes your smoking habit."),
            Smoking::ALL,
            r.smoking,
        )?;
        r.exercise = self.choose(
            "How often do you exercise?",
            Some("Any activity that raises your heart rate counts."),
            Exercise::ALL,
            r.exercise,
        )?;
        r.diet = self.choose(
            "How healthy is your diet?",
            Some("Overall balance of fruit and vegetables against fried or processed food."),
            Diet::ALL,
            r.diet,
        )?;
        r.stress = self.choose(
            "What is your stress level?",
            Some("How stressed do you feel on most days?"),
            Stress::ALL,
            r.stress,
        )?;
        r.family_history = self.choose(
            "Has anyone in your close family had heart problems?",
            None,
            FamilyHistory::ALL,
            r.family_history,
        )?;
        r.weight = self.choose(
            "Which weight category fits you?",
            Some("If unsure, choose what fits best."),
            Weight::ALL,
            r.weight,
        )?;
        r.sleep = self.choose("How well do you sleep?", None, Sleep::ALL, r.sleep)?;

        let knows_values = !r.clinical.is_empty();
        if self.confirm("Do you know any of your clinical test values?", knows_values)? {
            r.clinical = self.ask_clinical(r.clinical)?;
        }

        Ok(r.clamped())
    }

    fn ask_clinical(&mut self, base: ClinicalOverrides) -> Result<ClinicalOverrides> {
        writeln!(
            self.output,
            "\n{}",
            style("Enter 0 or pick Unknown for anything you don't know.").dim()
        )?;

        let mut c = base;
        c.resting_bp = self.number("Resting blood pressure (mmHg)", c.resting_bp, 0, MAX_RESTING_BP)?;
        c.cholesterol = self.number("Cholesterol (mg/dL)", c.cholesterol, 0, MAX_CHOLESTEROL)?;
        c.fasting_blood_sugar = self.choose(
            "Fasting blood sugar above 120 mg/dL?",
            None,
            FastingBloodSugar::ALL,
            c.fasting_blood_sugar,
        )?;
        c.resting_ecg = self.choose("Resting ECG result", None, RestingEcg::ALL, c.resting_ecg)?;
        c.max_heart_rate =
            self.number("Maximum heart rate reached (bpm)", c.max_heart_rate, 0, MAX_HEART_RATE)?;
        c.exercise_angina = self.choose(
            "Chest pain during exercise?",
            None,
            ExerciseAngina::ALL,
            c.exercise_angina,
        )?;
        c.st_depression = self.number(
            "ST depression induced by exercise",
            c.st_depression,
            0.0,
            MAX_ST_DEPRESSION,
        )?;
        c.st_slope = self.choose("Slope of the peak exercise ST segment", None, StSlope::ALL, c.st_slope)?;
        c.vessels = self.number(
            "Major vessels colored by fluoroscopy",
            c.vessels,
            0,
            MAX_VESSELS,
        )?;
        c.thal = self.choose("Thalassemia", None, Thal::ALL, c.thal)?;
        Ok(c)
    }

    /// Next trimmed line, or `None` at end of input
    fn read_answer(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Numbered single choice. Accepts the number or the option's name.
    fn choose<T>(&mut self, question: &str, hint: Option<&str>, options: &[T], current: T) -> Result<T>
    where
        T: Copy + PartialEq + Display + FromStr,
    {
        writeln!(self.output, "\n{}", style(question).bold())?;
        if let Some(hint) = hint {
            writeln!(self.output, "  {}", style(hint).dim())?;
        }
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, option)?;
        }
        let default_index = options.iter().position(|o| *o == current).unwrap_or(0) + 1;

        loop {
            write!(self.output, "Choice [{}]: ", default_index)?;
            self.output.flush()?;
            let answer = match self.read_answer()? {
                None => return Ok(current),
                Some(a) if a.is_empty() => return Ok(current),
                Some(a) => a,
            };
            if let Ok(n) = answer.parse::<usize>() {
                if (1..=options.len()).contains(&n) {
                    return Ok(options[n - 1]);
                }
            } else if let Ok(value) = answer.parse::<T>() {
                if options.contains(&value) {
                    return Ok(value);
                }
            }
            writeln!(
                self.output,
                "  {} Please enter a number from 1 to {}.",
                style("!").yellow(),
                options.len()
            )?;
        }
    }

    /// Numeric answer, constrained to `[min, max]` rather than rejected.
    /// Values beyond what `T` can hold take the nearer bound too.
    fn number<T>(&mut self, question: &str, current: T, min: T, max: T) -> Result<T>
    where
        T: Copy + PartialOrd + Display + FromStr + Into<f64>,
    {
        writeln!(self.output, "\n{} ({}-{})", style(question).bold(), min, max)?;
        loop {
            write!(self.output, "Value [{}]: ", current)?;
            self.output.flush()?;
            let answer = match self.read_answer()? {
                None => return Ok(current),
                Some(a) if a.is_empty() => return Ok(current),
                Some(a) => a,
            };
            let parsed = answer.parse::<f64>().ok().filter(|v| !v.is_nan());
            let bounded = match parsed {
                Some(v) if v < min.into() => min,
                Some(v) if v > max.into() => max,
                Some(_) => {
                    if let Ok(value) = answer.parse::<T>() {
                        return Ok(value);
                    }
                    writeln!(self.output, "  {} Please enter a whole number.", style("!").yellow())?;
                    continue;
                }
                None => {
                    writeln!(self.output, "  {} Please enter a number.", style("!").yellow())?;
                    continue;
                }
            };
            writeln!(self.output, "  Using {} (allowed range {}-{}).", bounded, min, max)?;
            return Ok(bounded);
        }
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            write!(self.output, "\n{} {} ", style(question).bold(), hint)?;
            self.output.flush()?;
            let answer = match self.read_answer()? {
                None => return Ok(default),
                Some(a) => a.to_lowercase(),
            };
            match answer.as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "  Please answer y or n.")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(input: &str, base: UserResponses) -> (UserResponses, String) {
        let mut out = Vec::new();
        let result = {
            let mut prompter = Prompter::new(Cursor::new(input.as_bytes()), &mut out);
            prompter.ask(base).unwrap()
        };
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_empty_input_keeps_everything() {
        let base = UserResponses {
            age: 61,
            smoking: Smoking::Occasionally,
            ..Default::default()
        };
        let (r, out) = run("", base.clone());
        assert_eq!(r, base);
        assert!(out.contains("How old are you?"));
        assert!(out.contains("Choice [2]: "));
    }

    #[test]
    fn test_numbers_names_and_retries() {
        let input = "\
52
2
daily
9
4

3
yes


n
";
        let (r, out) = run(input, UserResponses::default());
        assert_eq!(r.age, 52);
        assert_eq!(r.gender, Gender::Female);
        assert_eq!(r.smoking, Smoking::Daily);
        assert_eq!(r.exercise, Exercise::Everyday);
        assert_eq!(r.diet, Diet::Poor);
        assert_eq!(r.stress, Stress::High);
        assert_eq!(r.family_history, FamilyHistory::Yes);
        assert_eq!(r.weight, Weight::Underweight);
        assert_eq!(r.sleep, Sleep::Poor);
        assert!(r.clinical.is_empty());
        assert!(out.contains("Please enter a number from 1 to 4."));
        assert!(!out.contains("Resting blood pressure"));
    }

    #[test]
    fn test_age_is_constrained() {
        let (r, out) = run("12\n", UserResponses::default());
        assert_eq!(r.age, MIN_AGE);
        assert!(out.contains("Using 18"));

        let (r, _) = run("abc\n130\n", UserResponses::default());
        assert_eq!(r.age, MAX_AGE);
    }

    #[test]
    fn test_numbers_beyond_field_type_take_nearest_bound() {
        let (r, out) = run("-3\n", UserResponses::default());
        assert_eq!(r.age, MIN_AGE);
        assert!(out.contains("Using 18"));

        let (r, out) = run("45.5\n256\n", UserResponses::default());
        assert_eq!(r.age, MAX_AGE);
        assert!(out.contains("Please enter a whole number."));

        let input = "\n\n\n\n\n\n\n\n\ny\n70000\n-20\n";
        let (r, out) = run(input, UserResponses::default());
        assert_eq!(r.clinical.resting_bp, MAX_RESTING_BP);
        assert_eq!(r.clinical.cholesterol, 0);
        assert!(out.contains("Using 300"));
    }

    #[test]
    fn test_clinical_values() {
        // nine lifestyle answers kept, then the clinical section
        let input = "\n\n\n\n\n\n\n\n\ny\n400\n\n3\n\nabc\n150\n\n1.5\n\n9\n3\n";
        let (r, _) = run(input, UserResponses::default());
        let c = &r.clinical;
        assert_eq!(c.resting_bp, MAX_RESTING_BP);
        assert_eq!(c.cholesterol, 0);
        assert_eq!(c.fasting_blood_sugar, FastingBloodSugar::Yes);
        assert_eq!(c.resting_ecg, RestingEcg::Unknown);
        assert_eq!(c.max_heart_rate, 150);
        assert_eq!(c.exercise_angina, ExerciseAngina::Unknown);
        assert_eq!(c.st_depression, 1.5);
        assert_eq!(c.st_slope, StSlope::Unknown);
        assert_eq!(c.vessels, MAX_VESSELS);
        assert_eq!(c.thal, Thal::FixedDefect);
    }
}
