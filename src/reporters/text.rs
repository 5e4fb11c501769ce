//! Text (terminal) reporter with colors and bars

use super::{RiskReport, TextOptions};
use crate::classifier::{RiskLabel, RISK_THRESHOLD};
use anyhow::Result;
use console::style;
use std::fmt::Write;

const BAR_WIDTH: usize = 40;

/// Filled/empty progress bar for a 0-100 percentage
fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round().clamp(0.0, width as f64) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Horizontal bar with a marker at the decision threshold
fn threshold_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round().clamp(0.0, width as f64) as usize;
    let marker = (RISK_THRESHOLD * width as f64).round() as usize;
    (0..width)
        .map(|i| {
            if i == marker {
                '┆'
            } else if i < filled {
                '▇'
            } else {
                ' '
            }
        })
        .collect()
}

/// Render report as formatted terminal output
pub fn render(report: &RiskReport, options: TextOptions) -> Result<String> {
    let mut out = String::new();
    let p = &report.prediction;

    let headline = match p.label {
        RiskLabel::High => style(format!("{} ({:.1}%)", p.label, p.risk_percent)).red().bold(),
        RiskLabel::Low => style(format!("{} ({:.1}%)", p.label, p.risk_percent)).green().bold(),
    };

    writeln!(out, "\n{}", style("Your Estimated Heart Health Risk").bold())?;
    writeln!(out, "{}", style("──────────────────────────────────────").dim())?;
    writeln!(out, "Risk Level: {headline}")?;
    writeln!(out, "[{}] {:.1}%\n", progress_bar(p.risk_percent, BAR_WIDTH), p.risk_percent)?;

    writeln!(out, "{}", style("RISK SHARE").bold())?;
    writeln!(
        out,
        "  {} Risk {:.1}%   {} Safe {:.1}%",
        style("●").red(),
        p.risk_percent,
        style("●").green(),
        p.safe_percent
    )?;
    writeln!(out, "  Risk Percentage (%)")?;
    writeln!(out, "  0 |{}| 100", threshold_bar(p.risk_percent, BAR_WIDTH))?;
    writeln!(
        out,
        "  {}{}",
        " ".repeat(3 + (RISK_THRESHOLD * BAR_WIDTH as f64).round() as usize),
        style("^ 50% threshold").dim()
    )?;
    writeln!(out)?;

    writeln!(out, "{}", style("YOUR INPUT SUMMARY").bold())?;
    for (question, answer) in report.responses.summary() {
        writeln!(out, "  {question}: {answer}")?;
    }
    writeln!(out)?;

    if options.show_features {
        writeln!(out, "{}", style("DERIVED CLINICAL FEATURES").bold())?;
        for (name, value) in report.features.named() {
            writeln!(out, "  {name:<9} {value}")?;
        }
        writeln!(out)?;
    }

    writeln!(out, "{}", style("HEALTH ADVICE").bold())?;
    for line in p.label.advice() {
        writeln!(out, "  {line}")?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "{}",
        style("This tool is for awareness and education only. It is not a medical diagnosis.").dim()
    )?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_render_high_risk() {
        let out = render(&test_report(0.8), TextOptions::default()).unwrap();
        assert!(out.contains("High Risk (80.0%)"), "got: {out}");
        assert!(out.contains("Risk 80.0%"));
        assert!(out.contains("Safe 20.0%"));
        assert!(out.contains("Smoking: Daily"));
        assert!(out.contains("managing stress"));
        assert!(out.contains("not a medical diagnosis"));
        assert!(!out.contains("DERIVED CLINICAL FEATURES"));
    }

    #[test]
    fn test_render_low_risk_with_features() {
        let options = TextOptions {
            show_features: true,
        };
        let out = render(&test_report(0.5), options).unwrap();
        assert!(out.contains("Low Risk (50.0%)"), "got: {out}");
        assert!(out.contains("You're doing well!"));
        assert!(out.contains("DERIVED CLINICAL FEATURES"));
        assert!(out.contains("trestbps"));
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 10), "░".repeat(10));
        assert_eq!(progress_bar(100.0, 10), "█".repeat(10));
        assert_eq!(progress_bar(50.0, 10).chars().filter(|&c| c == '█').count(), 5);
    }

    #[test]
    fn test_threshold_bar_has_marker() {
        let bar = threshold_bar(20.0, 40);
        assert_eq!(bar.chars().count(), 40);
        assert_eq!(bar.chars().nth(20), Some('┆'));
        assert_eq!(bar.chars().filter(|&c| c == '▇').count(), 8);

        let full = threshold_bar(100.0, 40);
        assert_eq!(full.chars().filter(|&c| c == '▇').count(), 39);
    }
}
