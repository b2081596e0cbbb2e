//! Text (terminal) reporter with colors and formatting

use crate::classifier::FeatureImportance;
use crate::pipeline::AnalysisResult;
use crate::profile::AuthorProfile;
use anyhow::Result;

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Width of a full importance bar
const BAR_WIDTH: usize = 30;

/// Risk colors relative to the threshold
fn risk_color(risk: f64, threshold: f64) -> &'static str {
    if risk <= threshold / 2.0 {
        "\x1b[32m" // Green
    } else if risk <= threshold {
        "\x1b[92m" // Light green
    } else if risk <= threshold * 2.0 {
        "\x1b[33m" // Yellow
    } else {
        "\x1b[31m" // Red
    }
}

/// Risk as a percentage with two decimals
pub fn format_percent(p: f64) -> String {
    format!("{:.2}%", p * 100.0)
}

/// Render an analysis result as formatted terminal output
pub fn render(result: &AnalysisResult) -> Result<String> {
    let mut out = String::new();

    // Header
    out.push_str(&format!("\n{BOLD}Commit Risk Analysis{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    let accuracy = result
        .accuracy
        .map(format_percent)
        .unwrap_or_else(|| "n/a".to_string());
    out.push_str(&format!(
        "Training rows: {}  Test rows: {}  Accuracy: {BOLD}{}{RESET}\n",
        result.train_rows, result.test_rows, accuracy
    ));

    let base_c = risk_color(result.original_risk, result.threshold);
    out.push_str(&format!(
        "Predicted risk: {base_c}{BOLD}{}{RESET}  Threshold: {}\n\n",
        format_percent(result.original_risk),
        format_percent(result.threshold)
    ));

    // Base commit
    out.push_str(&format!("{BOLD}COMMIT{RESET}\n"));
    for column in &result.columns {
        if let Some(value) = result.base.get(column) {
            out.push_str(&format!("  {column}: {value}\n"));
        }
    }
    out.push('\n');

    // Suggestions
    out.push_str(&format!(
        "{BOLD}SUGGESTIONS{RESET} ({} of {} candidates)\n",
        result.suggestions.len(),
        result.evaluated
    ));
    if result.truncated {
        out.push_str(&format!(
            "  {DIM}Search space truncated to the first {} candidates{RESET}\n",
            result.evaluated
        ));
    }
    if result.suggestions.is_empty() {
        out.push_str(&format!(
            "  {DIM}No nearby variant is at or below {}. Try a larger --step or --half-value.{RESET}\n\n",
            format_percent(result.threshold)
        ));
    } else {
        out.push_str(&suggestion_table(result));
        out.push('\n');
    }

    // Importances
    if !result.feature_importances.is_empty() {
        out.push_str(&format!("{BOLD}FEATURE IMPORTANCE{RESET}\n"));
        out.push_str(&importance_chart(&result.feature_importances));
        out.push('\n');
    }

    if !result.profiles.is_empty() {
        out.push_str(&render_profiles(&result.profiles));
    }

    Ok(out)
}

/// Suggested commits with one column per feature plus `Predicted Risk`
fn suggestion_table(result: &AnalysisResult) -> String {
    let mut headers: Vec<String> = result.columns.clone();
    headers.push("Predicted Risk".to_string());

    let rows: Vec<Vec<String>> = result
        .suggestions
        .iter()
        .map(|s| {
            let mut cells: Vec<String> = result
                .columns
                .iter()
                .map(|c| s.record.get(c).map(ToString::to_string).unwrap_or_default())
                .collect();
            cells.push(format_percent(s.risk));
            cells
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{h:>w$}"))
        .collect();
    out.push_str(&format!("{DIM}  {}{RESET}\n", header_line.join("  ")));

    for (row, suggestion) in rows.iter().zip(&result.suggestions) {
        let last = row.len() - 1;
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, &w))| {
                if i == last {
                    let c = risk_color(suggestion.risk, result.threshold);
                    format!("{c}{cell:>w$}{RESET}")
                } else {
                    format!("{cell:>w$}")
                }
            })
            .collect();
        out.push_str(&format!("  {}\n", cells.join("  ")));
    }
    out
}

/// Horizontal bar chart of importance weights
fn importance_chart(importances: &[FeatureImportance]) -> String {
    let name_width = importances
        .iter()
        .map(|i| i.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for imp in importances {
        let filled = (imp.weight.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
        out.push_str(&format!(
            "  {:<name_width$}  {}{DIM}{}{RESET} {:>6.2}%\n",
            imp.name,
            "█".repeat(filled),
            "░".repeat(BAR_WIDTH - filled),
            imp.weight * 100.0
        ));
    }
    out
}

/// Per-author hints for low-risk commits
pub fn render_profiles(profiles: &[AuthorProfile]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{BOLD}AUTHOR PROFILES{RESET}\n"));
    if profiles.is_empty() {
        out.push_str(&format!("  {DIM}No author has a clean commit on record.{RESET}\n"));
        return out;
    }
    for profile in profiles {
        out.push_str(&format!(
            "  {BOLD}{}{RESET} {DIM}({} clean commits){RESET}\n",
            profile.author, profile.commits
        ));
        for line in profile.hint_lines() {
            out.push_str(&format!("    {line}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_result;

    fn plain(s: &str) -> String {
        console::strip_ansi_codes(s).to_string()
    }

    #[test]
    fn test_render_header_and_risk() {
        let out = plain(&render(&test_result()).unwrap());
        assert!(out.contains("Commit Risk Analysis"));
        assert!(out.contains("Accuracy: 85.00%"));
        assert!(out.contains("Predicted risk: 23.45%"));
        assert!(out.contains("Threshold: 20.00%"));
    }

    #[test]
    fn test_suggestion_table() {
        let out = plain(&render(&test_result()).unwrap());
        assert!(out.contains("SUGGESTIONS (2 of 10 candidates)"));
        assert!(out.contains("Predicted Risk"));
        assert!(out.contains("12.34%"));
        assert!(out.contains("5.00%"));
        // Dataset column order
        let header = out.lines().find(|l| l.contains("Predicted Risk")).unwrap();
        assert!(header.find("lines_changed").unwrap() < header.find("developer").unwrap());
    }

    #[test]
    fn test_empty_suggestions() {
        let mut result = test_result();
        result.suggestions.clear();
        let out = plain(&render(&result).unwrap());
        assert!(out.contains("No nearby variant is at or below 20.00%"));
        assert!(!out.contains("Predicted Risk"));
    }

    #[test]
    fn test_importance_bars() {
        let out = plain(&render(&test_result()).unwrap());
        let line = out
            .lines()
            .find(|l| l.contains('█') && l.contains("lines_changed"))
            .unwrap();
        assert_eq!(line.matches('█').count(), 23);
        assert!(line.ends_with("75.00%"));
    }

    #[test]
    fn test_profiles() {
        let out = plain(&render_profiles(&test_result().profiles));
        assert!(out.contains("dev2 (12 clean commits)"));
        assert!(out.contains("lines_changed between 40 and 120.5."));
        assert!(out.contains("code_area = 0."));

        let empty = plain(&render_profiles(&[]));
        assert!(empty.contains("No author has a clean commit"));
    }
}
