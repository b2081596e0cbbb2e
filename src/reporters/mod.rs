//! Output reporters for commit analysis results
//!
//! Supports two output formats:
//! - `text` - Terminal output with colors and bar charts
//! - `json` - Machine-readable JSON

mod json;
mod text;

use crate::pipeline::AnalysisResult;
use crate::profile::AuthorProfile;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
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

/// Render an analysis result using an OutputFormat enum
pub fn report_with_format(result: &AnalysisResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(result),
        OutputFormat::Json => json::render(result),
    }
}

/// Render author profiles on their own
pub fn report_profiles(profiles: &[AuthorProfile], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_profiles(profiles)),
        OutputFormat::Json => json::render_profiles(profiles),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::classifier::FeatureImportance;
    use crate::dataset::{CommitRecord, FeatureValue};
    use crate::profile::{CategoricalHint, NumericHint};
    use crate::search::Suggestion;

    fn record(lines: f64, dev: &str) -> CommitRecord {
        CommitRecord::new()
            .with("lines_changed", FeatureValue::Numeric(lines))
            .with("developer", FeatureValue::Category(dev.into()))
    }

    /// Create a minimal AnalysisResult for testing
    pub(crate) fn test_result() -> AnalysisResult {
        AnalysisResult {
            accuracy: Some(0.85),
            train_rows: 160,
            test_rows: 40,
            columns: vec!["lines_changed".into(), "developer".into()],
            base: record(100.0, "dev2"),
            original_risk: 0.2345,
            threshold: 0.2,
            suggestions: vec![
                Suggestion {
                    record: record(99.0, "dev1"),
                    risk: 0.1234,
                },
                Suggestion {
                    record: record(99.0, "dev4"),
                    risk: 0.05,
                },
            ],
            evaluated: 10,
            space_size: Some(10),
            truncated: false,
            importances: vec![
                FeatureImportance {
                    name: "lines_changed".into(),
                    weight: 0.75,
                },
                FeatureImportance {
                    name: "developer=dev1".into(),
                    weight: 0.25,
                },
            ],
            feature_importances: vec![
                FeatureImportance {
                    name: "lines_changed".into(),
                    weight: 0.75,
                },
                FeatureImportance {
                    name: "developer".into(),
                    weight: 0.25,
                },
            ],
            profiles: vec![AuthorProfile {
                author: "dev2".into(),
                commits: 12,
                numeric_hints: vec![NumericHint {
                    feature: "lines_changed".into(),
                    p25: 40.0,
                    p75: 120.5,
                }],
                categorical_hints: vec![CategoricalHint {
                    feature: "code_area".into(),
                    mode: "0".into(),
                }],
            }],
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::from_str("sarif").is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_report_dispatch() {
        let result = test_result();
        let json = report_with_format(&result, OutputFormat::Json).unwrap();
        assert!(json.starts_with('{'));
        let text = report_with_format(&result, OutputFormat::Text).unwrap();
        assert!(text.contains("Predicted Risk"));
    }
}
