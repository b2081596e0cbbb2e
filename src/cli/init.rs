//! Init command - write an example commit-advisor.toml

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::config::{AdvisorConfig, CONFIG_FILENAME};

/// Run the init command
pub fn run(path: &Path) -> Result<()> {
    if !path.is_dir() {
        anyhow::bail!("Path is not a directory: {}", path.display());
    }

    let config_path = path.join(CONFIG_FILENAME);
    let created = AdvisorConfig::write_example(&config_path)
        .with_context(|| format!("Failed to create {}", config_path.display()))?;

    if created {
        println!(
            "{} Created {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
    } else {
        println!(
            "{} Already exists: {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
    }

    println!("\n{}", style("Next steps:").bold());
    println!(
        "  1. Run {} to create a sample dataset",
        style("commit-advisor generate").cyan()
    );
    println!(
        "  2. Run {} to analyze it",
        style("commit-advisor analyze synthetic_commits_low_risk.csv").cyan()
    );
    Ok(())
}
