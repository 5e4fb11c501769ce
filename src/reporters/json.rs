//! JSON reporter
//!
//! Outputs the full RiskReport as pretty-printed JSON.
//! Useful for machine consumption or piping to jq.

use super::RiskReport;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &RiskReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_json_render_valid() {
        let report = test_report(0.7254);
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["prediction"]["label"], "high");
        assert_eq!(parsed["prediction"]["risk_percent"], 72.5);
        assert_eq!(parsed["features"]["thal"], 2);
        assert_eq!(parsed["responses"]["smoking"], "Daily");
    }

    #[test]
    fn test_json_low_risk() {
        let report = test_report(0.5);
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["prediction"]["label"], "low");
    }
}
