//! Advisor configuration
//!
//! Supports loading config from (first match wins):
//! - an explicit `--config` path
//! - ./commit-advisor.toml
//! - ~/.config/commit-advisor/config.toml
//!
//! Every field has a default, so partial files are fine.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Project config file name looked up in the working directory
pub const CONFIG_FILENAME: &str = "commit-advisor.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub dataset: DatasetConfig,
    pub model: ModelConfig,
    pub search: SearchConfig,
    pub generator: GeneratorConfig,
}

/// How to interpret the columns of the input CSV
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Binary target column (0 = clean, 1 = introduced a bug)
    pub label_column: String,
    /// Columns holding category labels; all others must be numeric
    pub categorical_columns: Vec<String>,
    /// Column identifying the commit author, used for profiles
    pub author_column: Option<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            label_column: "label".to_string(),
            categorical_columns: vec![
                "developer".to_string(),
                "commit_type".to_string(),
                "code_area".to_string(),
            ],
            author_column: Some("developer".to_string()),
        }
    }
}

/// Gradient-boosted tree training parameters
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of boosting iterations
    pub trees: usize,
    pub max_depth: u32,
    pub learning_rate: f64,
    pub min_leaf_size: usize,
    /// Seed for the train/test split and permutation importances
    pub seed: u64,
    /// Share of rows held out for the accuracy estimate
    pub test_fraction: f64,
    /// Weight classes so each carries the same total weight
    pub balance_classes: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: 6,
            learning_rate: 0.1,
            min_leaf_size: 1,
            seed: 42,
            test_fraction: 0.2,
            balance_classes: false,
        }
    }
}

/// Rules for generating numeric candidate values around a base commit
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CandidatePolicy {
    /// Distance of the step-down / step-up candidates
    pub step: f64,
    /// Include `value - step`, clamped to the historical minimum
    pub step_down: bool,
    /// Include `value / 2`, clamped to the historical minimum
    pub half_value: bool,
    /// Include `value + step`, clamped to the historical maximum
    pub step_up: bool,
}

impl Default for CandidatePolicy {
    fn default() -> Self {
        Self {
            step: 1.0,
            step_down: true,
            half_value: false,
            step_up: false,
        }
    }
}

/// What to do when the candidate space exceeds `max_combinations`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Refuse with `SearchSpaceTooLarge`
    #[default]
    Fail,
    /// Score only the first `max_combinations` candidates
    Truncate,
}

/// Neighborhood search parameters
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum predicted risk for a suggestion to be kept
    pub threshold: f64,
    pub max_combinations: u64,
    pub on_overflow: OverflowPolicy,
    pub candidates: CandidatePolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            max_combinations: 100_000,
            on_overflow: OverflowPolicy::Fail,
            candidates: CandidatePolicy::default(),
        }
    }
}

/// Base bug rate for one synthetic developer
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DeveloperRate {
    pub name: String,
    pub bug_rate: f64,
}

/// Synthetic dataset generator parameters
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub rows: usize,
    pub seed: u64,
    pub output: PathBuf,
    pub developers: Vec<DeveloperRate>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let developers = [
            ("dev1", 0.05),
            ("dev2", 0.10),
            ("dev3", 0.08),
            ("dev4", 0.03),
            ("dev5", 0.12),
        ]
        .into_iter()
        .map(|(name, bug_rate)| DeveloperRate {
            name: name.to_string(),
            bug_rate,
        })
        .collect();

        Self {
            rows: 200,
            seed: 42,
            output: PathBuf::from("synthetic_commits_low_risk.csv"),
            developers,
        }
    }
}

impl AdvisorConfig {
    /// Load config with priority:
    /// 1. Explicit path (errors are fatal)
    /// 2. ./commit-advisor.toml
    /// 3. User config (~/.config/commit-advisor/config.toml)
    /// 4. Defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let config = Self::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            debug!("Loaded config from {}", path.display());
            return Ok(config);
        }

        let candidates = std::iter::once(PathBuf::from(CONFIG_FILENAME))
            .chain(Self::user_config_path());
        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    debug!("Loaded config from {}", path.display());
                    return Ok(config);
                }
                Err(e) => {
                    warn!("Failed to load {}: {}", path.display(), e);
                }
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AdvisorConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the ranges the CLI flags enforce on values read from a file
    pub fn validate(&self) -> Result<()> {
        let threshold = self.search.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            bail!("search.threshold must be between 0 and 1, got {}", threshold);
        }
        let step = self.search.candidates.step;
        if !(step.is_finite() && step > 0.0) {
            bail!("search.candidates.step must be a positive number, got {}", step);
        }
        let fraction = self.model.test_fraction;
        if !(0.0..1.0).contains(&fraction) {
            bail!("model.test_fraction must be in [0, 1), got {}", fraction);
        }
        Ok(())
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("commit-advisor").join("config.toml"))
    }

    /// Write an example config file, leaving an existing one untouched.
    ///
    /// Returns `true` when a new file was written.
    pub fn write_example(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, EXAMPLE_CONFIG)?;
        Ok(true)
    }
}

const EXAMPLE_CONFIG: &str = r#"# commit-advisor configuration

[dataset]
label_column = "label"
categorical_columns = ["developer", "commit_type", "code_area"]
author_column = "developer"

[model]
trees = 100
max_depth = 6
learning_rate = 0.1
seed = 42
test_fraction = 0.2
# balance_classes = true

[search]
# Keep variants whose predicted risk is at or below this value
threshold = 0.2
max_combinations = 100000
# "fail" or "truncate"
on_overflow = "fail"

[search.candidates]
step = 1.0
step_down = true
half_value = false
step_up = false

[generator]
rows = 200
seed = 42
output = "synthetic_commits_low_risk.csv"
"#;
