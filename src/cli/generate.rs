//! Generate command - write a synthetic commit history

use anyhow::{Context, Result};
use console::style;
use std::path::PathBuf;

use crate::config::GeneratorConfig;
use crate::generator;

/// Run the generate command; flags override the `[generator]` section
pub fn run(
    mut config: GeneratorConfig,
    rows: Option<usize>,
    seed: Option<u64>,
    output: Option<PathBuf>,
) -> Result<()> {
    if let Some(rows) = rows {
        config.rows = rows;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }
    if let Some(output) = output {
        config.output = output;
    }

    let written = generator::generate_to_file(&config, &config.output)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;

    println!(
        "{} Synthetic commits CSV created: {} ({} rows)",
        style("✓").green(),
        style(config.output.display()).cyan(),
        written
    );
    Ok(())
}
