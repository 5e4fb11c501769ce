//! CLI command definitions and handlers

mod check;
mod model_info;
mod prompt;
mod train;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use heartcheck::classifier::Algorithm;
use heartcheck::config::UserConfig;

pub use check::CheckArgs;

/// Parse and validate the held-out fraction (0.0 <= f < 1.0)
fn parse_test_fraction(s: &str) -> Result<f64, String> {
    let f: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if (0.0..1.0).contains(&f) {
        Ok(f)
    } else {
        Err("test fraction must be at least 0 and below 1".to_string())
    }
}

/// heartcheck - heart-disease risk awareness from everyday answers
#[derive(Parser, Debug)]
#[command(name = "heartcheck")]
#[command(
    version,
    about = "Estimate heart-disease risk from a short lifestyle questionnaire",
    long_about = "heartcheck turns nine plain-language answers into the 13 clinical \
features of the classic heart-disease dataset and scores them with a locally \
trained tree ensemble.\n\n\
Awareness tool only. It is not a medical diagnosis.",
    after_help = "\
Examples:
  heartcheck train --data heart.csv              Train model.json from a labeled CSV
  heartcheck check --interactive                 Answer the questions one by one
  heartcheck check --age 52 --smoking daily      Answer with flags
  heartcheck check --answers me.toml -f json     JSON output for scripting
  heartcheck model-info                          Describe the trained model"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate risk from questionnaire answers
    #[command(after_help = "\
Unanswered questions take their first option. Clinical values you know \
(blood pressure, cholesterol, ...) replace the estimated ones; 0 or \
`unknown` keeps the estimate.

Examples:
  heartcheck check --age 45 --smoking daily --exercise rarely --diet poor \\
      --stress high --family-history yes --weight obese --sleep poor
  heartcheck check --answers answers.toml --resting-bp 128
  heartcheck check --interactive --show-features")]
    Check(CheckArgs),

    /// Train the risk model from a labeled CSV dataset
    #[command(after_help = "\
The CSV needs the columns age, sex, cp, trestbps, chol, fbs, restecg, \
thalach, exang, oldpeak, slope, ca, thal and target (any order).

Examples:
  heartcheck train --data heart.csv
  heartcheck train --data heart.csv --output models/heart.json --trees 500
  heartcheck train --data heart.csv --algorithm gbdt")]
    Train {
        /// Labeled CSV dataset
        #[arg(long, short = 'd')]
        data: PathBuf,

        /// Where to write the model (default: model.path from config, or model.json)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Number of trees (default: 200)
        #[arg(long)]
        trees: Option<usize>,

        /// Seed for the split and the ensemble (default: 42)
        #[arg(long)]
        seed: Option<u64>,

        /// Fraction of rows held out (default: 0.2)
        #[arg(long, value_parser = parse_test_fraction)]
        test_fraction: Option<f64>,

        /// Ensemble type
        #[arg(long, value_enum)]
        algorithm: Option<Algorithm>,
    },

    /// Show what a trained model contains
    ModelInfo {
        /// Model file (default: model.path from config, or model.json)
        #[arg(long, short = 'm')]
        model: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Initialize config file with example settings
    Init,
    /// Show current config and paths
    Show,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check(args) => {
            let config = UserConfig::load()?;
            check::run(args, &config)
        }

        Commands::Train {
            data,
            output,
            trees,
            seed,
            test_fraction,
            algorithm,
        } => {
            let config = UserConfig::load()?;
            let train_config = heartcheck::classifier::TrainConfig {
                data_path: data,
                output_path: output.unwrap_or_else(|| config.model_path()),
                algorithm: algorithm.unwrap_or_else(|| config.algorithm()),
                n_trees: trees.unwrap_or_else(|| config.trees()),
                seed: seed.unwrap_or_else(|| config.seed()),
                test_fraction: test_fraction.unwrap_or_else(|| config.test_fraction()),
            };
            train::run(&train_config)
        }

        Commands::ModelInfo { model } => {
            let config = UserConfig::load()?;
            model_info::run(&model.unwrap_or_else(|| config.model_path()))
        }

        Commands::Config { action } => run_config_action(action),
    }
}

fn run_config_action(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = UserConfig::init_user_config()?;
            println!("✅ Config initialized at: {}", path.display());
            println!("\nEdit it to set the default model path and training options.");
            println!("\nOr set the model via environment:");
            println!("  export {}=\"/path/to/model.json\"", heartcheck::config::MODEL_PATH_ENV);
            Ok(())
        }
        ConfigAction::Show => show_config(),
    }
}

fn show_config() -> Result<()> {
    let config = UserConfig::load()?;
    println!("📁 Config paths:");
    match UserConfig::user_config_path() {
        Some(user_path) => {
            let status = if user_path.exists() { "✓" } else { "(not found)" };
            println!("  User:    {} {}", user_path.display(), status);
        }
        None => println!("  User:    (no config directory on this platform)"),
    }

    let env_status = match std::env::var(heartcheck::config::MODEL_PATH_ENV) {
        Ok(v) if !v.is_empty() => "✓ set",
        _ => "not set",
    };
    println!("  Env:     {} {}", heartcheck::config::MODEL_PATH_ENV, env_status);

    println!("\n⚙️  Effective settings:");
    println!("  model.path          {}", config.model_path().display());
    println!("  train.trees         {}", config.trees());
    println!("  train.seed          {}", config.seed());
    println!("  train.test_fraction {}", config.test_fraction());
    println!("  train.algorithm     {}", config.algorithm());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_test_fraction() {
        assert_eq!(parse_test_fraction("0.2"), Ok(0.2));
        assert_eq!(parse_test_fraction("0"), Ok(0.0));
        assert!(parse_test_fraction("1").is_err());
        assert!(parse_test_fraction("-0.1").is_err());
        assert!(parse_test_fraction("abc").is_err());
    }

    #[test]
    fn test_train_args() {
        let cli = Cli::try_parse_from([
            "heartcheck",
            "train",
            "--data",
            "heart.csv",
            "--trees",
            "50",
            "--algorithm",
            "gbdt",
        ])
        .unwrap();
        match cli.command {
            Commands::Train {
                data,
                trees,
                algorithm,
                output,
                ..
            } => {
                assert_eq!(data, PathBuf::from("heart.csv"));
                assert_eq!(trees, Some(50));
                assert_eq!(algorithm, Some(Algorithm::Gbdt));
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_clinical_flags_parse() {
        let cli = Cli::try_parse_from([
            "heartcheck",
            "check",
            "--resting-bp",
            "-5",
            "--cholesterol",
            "70000",
            "--age",
            "-1",
        ])
        .unwrap();
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.clinical.resting_bp, Some(0));
                assert_eq!(args.clinical.cholesterol, Some(u16::MAX));
                assert_eq!(args.lifestyle.age, Some(18));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_log_level_is_global() {
        let cli = Cli::try_parse_from(["heartcheck", "model-info", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level, "debug");
    }
}
