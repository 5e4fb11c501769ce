//! Output reporters for risk check results
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors and bars
//! - `json` - Machine-readable JSON

mod json;
mod text;

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::str::FromStr;

use crate::answers::UserResponses;
use crate::classifier::{FeatureVector, PredictionResult};

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Everything one check produces
#[derive(Debug, Clone, Serialize)]
pub struct RiskReport {
    pub responses: UserResponses,
    pub features: FeatureVector,
    pub prediction: PredictionResult,
}

/// Rendering switches that only affect text output
#[derive(Debug, Clone, Copy, Default)]
pub struct TextOptions {
    /// Print the derived clinical features
    pub show_features: bool,
}

/// Render a report in the specified format
pub fn report(report: &RiskReport, format: &str, options: TextOptions) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(report, fmt, options)
}

/// Render a report using an OutputFormat enum
pub fn report_with_format(
    report: &RiskReport,
    format: OutputFormat,
    options: TextOptions,
) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report, options),
        OutputFormat::Json => json::render(report),
    }
}
