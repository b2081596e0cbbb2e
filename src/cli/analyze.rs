//! Analyze and profiles command implementation
//!
//! `analyze` runs the whole pipeline:
//! 1. Load the commit history CSV
//! 2. Train the risk model and measure accuracy
//! 3. Score the commit built from defaults and `--set` overrides
//! 4. Search its neighborhood for lower-risk variants
//! 5. Output results (text, json)

use crate::config::AdvisorConfig;
use crate::dataset::Dataset;
use crate::pipeline::{run_analysis, UserInput};
use crate::profile::summarize_profiles;
use crate::reporters::{self, OutputFormat};

use super::SearchArgs;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use std::str::FromStr;

/// Run the analyze command
pub fn run(
    mut config: AdvisorConfig,
    data: &Path,
    assignments: &[String],
    search: &SearchArgs,
    format: &str,
    output_path: Option<&Path>,
) -> Result<()> {
    search.apply(&mut config);
    let format = OutputFormat::from_str(format)?;

    let mut input = UserInput::new();
    for assignment in assignments {
        let (feature, value) = UserInput::parse_assignment(assignment)?;
        input = input.set(feature, value);
    }

    let dataset = load_dataset(data, &config)?;
    let result = run_analysis(&dataset, &input, &config)
        .with_context(|| format!("Analysis of {} failed", data.display()))?;

    let output = reporters::report_with_format(&result, format)?;
    emit(&output, format, output_path)
}

/// Run the profiles command
pub fn run_profiles(
    config: &AdvisorConfig,
    data: &Path,
    format: &str,
    output_path: Option<&Path>,
) -> Result<()> {
    let format = OutputFormat::from_str(format)?;
    let Some(author) = config.dataset.author_column.as_deref() else {
        anyhow::bail!("No author column configured. Set [dataset] author_column in commit-advisor.toml");
    };

    let dataset = load_dataset(data, config)?;
    let profiles = summarize_profiles(&dataset, author)?;

    let output = reporters::report_profiles(&profiles, format)?;
    emit(&output, format, output_path)
}

fn load_dataset(path: &Path, config: &AdvisorConfig) -> Result<Dataset> {
    Dataset::from_csv_path(path, &config.dataset)
        .with_context(|| format!("Failed to load dataset {}", path.display()))
}

/// Print to stdout, or write to a file without terminal colors
fn emit(output: &str, format: OutputFormat, output_path: Option<&Path>) -> Result<()> {
    match output_path {
        Some(path) => {
            let content = match format {
                OutputFormat::Text => console::strip_ansi_codes(output).to_string(),
                OutputFormat::Json => output.to_string(),
            };
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            // Use stderr to keep stdout clean
            eprintln!(
                "{} Report written to: {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
        None => println!("{}", output),
    }
    Ok(())
}
