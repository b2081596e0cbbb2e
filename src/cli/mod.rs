//! CLI command definitions and handlers

mod analyze;
mod generate;
mod init;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{AdvisorConfig, OverflowPolicy};

/// Parse and validate a risk threshold (0.0-1.0)
fn parse_probability(s: &str) -> Result<f64, String> {
    let p: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(0.0..=1.0).contains(&p) {
        Err("threshold must be between 0 and 1".to_string())
    } else {
        Ok(p)
    }
}

/// Parse and validate a candidate step (> 0)
fn parse_step(s: &str) -> Result<f64, String> {
    let step: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if step.is_finite() && step > 0.0 {
        Ok(step)
    } else {
        Err("step must be a positive number".to_string())
    }
}

/// Commit Advisor - predict whether a commit is likely to introduce a bug
/// and suggest nearby, lower-risk variants.
#[derive(Parser, Debug)]
#[command(name = "commit-advisor")]
#[command(
    version,
    about = "Predict commit bug risk from history and suggest lower-risk variants",
    long_about = "Commit Advisor trains a gradient-boosted tree model on a CSV of historical \
commits labelled as bug-introducing or clean, scores a proposed commit, and searches \
its neighborhood for variants whose predicted risk is at or below a threshold.\n\n\
It also summarizes what each author's clean commits typically look like.",
    after_help = "\
Examples:
  commit-advisor generate                                Write a synthetic dataset
  commit-advisor analyze synthetic_commits_low_risk.csv  Analyze the median commit
  commit-advisor analyze data.csv --set lines_changed=150 --set developer=dev5
  commit-advisor analyze data.csv --format json          JSON output for scripting
  commit-advisor profiles data.csv                       Per-author hints"
)]
pub struct Cli {
    /// Config file (default: ./commit-advisor.toml, then the user config dir)
    #[arg(long, global = true, env = "COMMIT_ADVISOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Search settings that override the `[search]` and `[model]` config sections
#[derive(Args, Debug, Clone, Default)]
pub struct SearchArgs {
    /// Maximum predicted risk for a suggestion (0.0-1.0)
    #[arg(long, value_parser = parse_probability)]
    pub threshold: Option<f64>,

    /// Distance of the step-down / step-up candidates
    #[arg(long, value_parser = parse_step)]
    pub step: Option<f64>,

    /// Also try half of each numeric value
    #[arg(long)]
    pub half_value: bool,

    /// Also try each numeric value plus one step
    #[arg(long)]
    pub step_up: bool,

    /// Do not try each numeric value minus one step
    #[arg(long)]
    pub no_step_down: bool,

    /// Refuse (or truncate) when the candidate space exceeds this size
    #[arg(long)]
    pub max_combinations: Option<u64>,

    /// Score only the first --max-combinations candidates instead of failing
    #[arg(long)]
    pub truncate: bool,

    /// Seed for the train/test split and permutation importances
    #[arg(long)]
    pub seed: Option<u64>,
}

impl SearchArgs {
    /// Apply flags on top of file configuration (flags win)
    pub fn apply(&self, config: &mut AdvisorConfig) {
        let search = &mut config.search;
        if let Some(t) = self.threshold {
            search.threshold = t;
        }
        if let Some(step) = self.step {
            search.candidates.step = step;
        }
        if self.half_value {
            search.candidates.half_value = true;
        }
        if self.step_up {
            search.candidates.step_up = true;
        }
        if self.no_step_down {
            search.candidates.step_down = false;
        }
        if let Some(cap) = self.max_combinations {
            search.max_combinations = cap;
        }
        if self.truncate {
            search.on_overflow = OverflowPolicy::Truncate;
        }
        if let Some(seed) = self.seed {
            config.model.seed = seed;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train on a commit history and suggest lower-risk variants of a commit
    #[command(after_help = "\
Examples:
  commit-advisor analyze data.csv                          Evaluate the median commit
  commit-advisor analyze data.csv --set files_changed=6    Fix one feature
  commit-advisor analyze data.csv --threshold 0.1          Stricter risk cut-off
  commit-advisor analyze data.csv --half-value --step-up   Wider neighborhood
  commit-advisor analyze data.csv --format json -o out.json")]
    Analyze {
        /// CSV of historical commits with a 0/1 label column
        data: PathBuf,

        /// Fix a feature of the evaluated commit (repeatable)
        #[arg(long = "set", value_name = "FEATURE=VALUE")]
        set: Vec<String>,

        #[command(flatten)]
        search: SearchArgs,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Summarize each author's low-risk commits
    Profiles {
        /// CSV of historical commits with a 0/1 label column
        data: PathBuf,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Write a synthetic labelled commit history
    Generate {
        /// Number of commits (default from config: 200)
        #[arg(long)]
        rows: Option<usize>,

        /// Random seed (default from config: 42)
        #[arg(long)]
        seed: Option<u64>,

        /// Output CSV (default from config: synthetic_commits_low_risk.csv)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Write an example commit-advisor.toml
    Init {
        /// Directory to write the config into
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Show version information
    Version,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    let load_config = || AdvisorConfig::load(config_path.as_deref());

    match cli.command {
        Commands::Analyze {
            data,
            set,
            search,
            format,
            output,
        } => analyze::run(load_config()?, &data, &set, &search, &format, output.as_deref()),

        Commands::Profiles {
            data,
            format,
            output,
        } => analyze::run_profiles(&load_config()?, &data, &format, output.as_deref()),

        Commands::Generate { rows, seed, output } => {
            generate::run(load_config()?.generator, rows, seed, output)
        }

        Commands::Init { path } => init::run(&path),

        Commands::Version => {
            println!("commit-advisor {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probability() {
        assert_eq!(parse_probability("0.2"), Ok(0.2));
        assert!(parse_probability("1.5").is_err());
        assert!(parse_probability("abc").is_err());
    }

    #[test]
    fn test_parse_step() {
        assert_eq!(parse_step("5"), Ok(5.0));
        assert!(parse_step("0").is_err());
        assert!(parse_step("-1").is_err());
    }

    #[test]
    fn test_init_and_version_skip_config_loading() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let missing = missing.to_str().unwrap();
        let target = dir.path().to_str().unwrap();

        let cli = Cli::try_parse_from(["commit-advisor", "--config", missing, "init", target]).unwrap();
        run(cli).unwrap();
        assert!(dir.path().join(crate::config::CONFIG_FILENAME).exists());

        let cli = Cli::try_parse_from(["commit-advisor", "--config", missing, "version"]).unwrap();
        run(cli).unwrap();
    }

    #[test]
    fn test_generate_loads_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let cli = Cli::try_parse_from([
            "commit-advisor",
            "--config",
            missing.to_str().unwrap(),
            "generate",
        ])
        .unwrap();
        assert!(run(cli).is_err());
    }

    #[test]
    fn test_search_args_override_config() {
        let mut config = AdvisorConfig::default();
        let args = SearchArgs {
            threshold: Some(0.1),
            step: Some(5.0),
            half_value: true,
            no_step_down: true,
            truncate: true,
            seed: Some(7),
            ..Default::default()
        };
        args.apply(&mut config);
        assert_eq!(config.search.threshold, 0.1);
        assert_eq!(config.search.candidates.step, 5.0);
        assert!(config.search.candidates.half_value);
        assert!(!config.search.candidates.step_down);
        assert!(!config.search.candidates.step_up);
        assert_eq!(config.search.on_overflow, OverflowPolicy::Truncate);
        assert_eq!(config.model.seed, 7);
    }

    #[test]
    fn test_unset_flags_keep_config() {
        let mut config = AdvisorConfig::default();
        config.search.threshold = 0.3;
        SearchArgs::default().apply(&mut config);
        assert_eq!(config.search.threshold, 0.3);
        assert!(config.search.candidates.step_down);
    }

    #[test]
    fn test_cli_parses_analyze() {
        let cli = Cli::try_parse_from([
            "commit-advisor",
            "analyze",
            "data.csv",
            "--set",
            "lines_changed=10",
            "--set",
            "developer=dev1",
            "--threshold",
            "0.15",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze {
                set, search, format, ..
            } => {
                assert_eq!(set, vec!["lines_changed=10", "developer=dev1"]);
                assert_eq!(search.threshold, Some(0.15));
                assert_eq!(format, "json");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
