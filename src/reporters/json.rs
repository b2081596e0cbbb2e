//! JSON reporter
//!
//! Outputs the full AnalysisResult as pretty-printed JSON.
//! Useful for machine consumption, piping to jq, or further processing.

use crate::pipeline::AnalysisResult;
use crate::profile::AuthorProfile;
use anyhow::Result;

/// Render result as JSON
pub fn render(result: &AnalysisResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub fn render_profiles(profiles: &[AuthorProfile]) -> Result<String> {
    Ok(serde_json::to_string_pretty(profiles)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_result;

    #[test]
    fn test_json_render_valid() {
        let result = test_result();
        let json_str = render(&result).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["accuracy"], 0.85);
        assert_eq!(parsed["base"]["developer"], "dev2");
        assert_eq!(parsed["base"]["lines_changed"], 100.0);
        let suggestions = parsed["suggestions"].as_array().expect("suggestions array");
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0]["risk"], 0.1234);
        assert_eq!(parsed["feature_importances"][0]["name"], "lines_changed");
    }

    #[test]
    fn test_json_missing_accuracy_is_null() {
        let mut result = test_result();
        result.accuracy = None;
        let parsed: serde_json::Value =
            serde_json::from_str(&render(&result).expect("render JSON")).expect("parse JSON");
        assert!(parsed["accuracy"].is_null());
    }

    #[test]
    fn test_json_profiles() {
        let json_str = render_profiles(&test_result().profiles).expect("render profiles");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed[0]["author"], "dev2");
        assert_eq!(parsed[0]["numeric_hints"][0]["p75"], 120.5);
        assert_eq!(parsed[0]["categorical_hints"][0]["mode"], "0");
    }
}
