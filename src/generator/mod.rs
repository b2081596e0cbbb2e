//! Synthetic commit history generator
//!
//! Produces a labelled CSV in the layout `analyze` expects, with a known
//! relationship between features and bug risk:
//!
//! ```text
//! risk = bug_rate(developer) + 0.0002·lines + 0.001·files
//!      + 0.01·code_area + 0.005·[commit_type == 0] + U(-0.01, 0.01)
//! ```
//!
//! clipped to `[0, 0.4]`, then `label = 1` with probability `risk`.
//! A fixed seed reproduces the output byte for byte.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::config::GeneratorConfig;
use crate::dataset::{csv, format_number};
use crate::error::{AdvisorError, AdvisorResult};

pub const COLUMNS: [&str; 8] = [
    "lines_changed",
    "files_changed",
    "message_length",
    "developer",
    "developer_bug_rate",
    "commit_type",
    "code_area",
    "label",
];

/// Upper bound for both the per-developer rate and the final risk
const MAX_RISK: f64 = 0.4;

/// One generated commit
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticCommit {
    pub lines_changed: u32,
    pub files_changed: u32,
    pub message_length: u32,
    pub developer: String,
    pub developer_bug_rate: f64,
    pub commit_type: u8,
    pub code_area: u8,
    pub label: bool,
}

impl SyntheticCommit {
    fn fields(&self) -> [String; 8] {
        [
            self.lines_changed.to_string(),
            self.files_changed.to_string(),
            self.message_length.to_string(),
            self.developer.clone(),
            format_number(self.developer_bug_rate),
            self.commit_type.to_string(),
            self.code_area.to_string(),
            u8::from(self.label).to_string(),
        ]
    }
}

/// Generate `config.rows` commits
pub fn generate(config: &GeneratorConfig) -> AdvisorResult<Vec<SyntheticCommit>> {
    if config.developers.is_empty() {
        return Err(AdvisorError::SchemaMismatch(
            "generator needs at least one developer".to_string(),
        ));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut commits = Vec::with_capacity(config.rows);

    for _ in 0..config.rows {
        let lines_changed: u32 = rng.random_range(1..200);
        let files_changed: u32 = rng.random_range(1..10);
        let message_length: u32 = rng.random_range(10..300);
        let dev = &config.developers[rng.random_range(0..config.developers.len())];
        let commit_type: u8 = rng.random_range(0..2);
        let code_area: u8 = rng.random_range(0..2);

        let developer_bug_rate = dev.bug_rate.min(MAX_RISK);

        let mut risk = developer_bug_rate;
        risk += 0.0002 * f64::from(lines_changed);
        risk += 0.001 * f64::from(files_changed);
        risk += 0.01 * f64::from(code_area);
        if commit_type == 0 {
            risk += 0.005;
        }
        risk += rng.random_range(-0.01..0.01);
        let risk = risk.clamp(0.0, MAX_RISK);

        let label = rng.random::<f64>() < risk;

        commits.push(SyntheticCommit {
            lines_changed,
            files_changed,
            message_length,
            developer: dev.name.clone(),
            developer_bug_rate,
            commit_type,
            code_area,
            label,
        });
    }

    Ok(commits)
}

/// Write commits as CSV (header first)
pub fn write_csv<W: Write>(out: &mut W, commits: &[SyntheticCommit]) -> AdvisorResult<()> {
    csv::write_record(out, &COLUMNS)?;
    for commit in commits {
        csv::write_record(out, &commit.fields())?;
    }
    Ok(())
}

/// Generate a dataset and return it as CSV text
pub fn generate_csv(config: &GeneratorConfig) -> AdvisorResult<String> {
    let commits = generate(config)?;
    let mut buf = Vec::new();
    write_csv(&mut buf, &commits)?;
    String::from_utf8(buf).map_err(|e| AdvisorError::SchemaMismatch(e.to_string()))
}

/// Generate a dataset and write it to `path`
pub fn generate_to_file(config: &GeneratorConfig, path: &Path) -> AdvisorResult<usize> {
    let commits = generate(config)?;
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_csv(&mut file, &commits)?;
    file.flush()?;

    let bugs = commits.iter().filter(|c| c.label).count();
    info!(
        "Wrote {} synthetic commits ({} bug-introducing) to {}",
        commits.len(),
        bugs,
        path.display()
    );
    Ok(commits.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatasetConfig;
    use crate::dataset::Dataset;

    #[test]
    fn test_fixed_seed_is_byte_identical() {
        let config = GeneratorConfig::default();
        assert_eq!(generate_csv(&config).unwrap(), generate_csv(&config).unwrap());

        let other = GeneratorConfig {
            seed: 7,
            ..Default::default()
        };
        assert_ne!(generate_csv(&config).unwrap(), generate_csv(&other).unwrap());
    }

    #[test]
    fn test_values_in_range() {
        let commits = generate(&GeneratorConfig::default()).unwrap();
        assert_eq!(commits.len(), 200);
        for c in &commits {
            assert!((1..200).contains(&c.lines_changed));
            assert!((1..10).contains(&c.files_changed));
            assert!((10..300).contains(&c.message_length));
            assert!(c.commit_type <= 1 && c.code_area <= 1);
            assert!(c.developer_bug_rate <= MAX_RISK);
        }
    }

    #[test]
    fn test_bug_rate_follows_developer() {
        let commits = generate(&GeneratorConfig::default()).unwrap();
        for c in commits.iter().filter(|c| c.developer == "dev4") {
            assert_eq!(c.developer_bug_rate, 0.03);
        }
    }

    #[test]
    fn test_rate_is_capped() {
        let config = GeneratorConfig {
            rows: 20,
            developers: vec![crate::config::DeveloperRate {
                name: "risky".into(),
                bug_rate: 0.9,
            }],
            ..Default::default()
        };
        let commits = generate(&config).unwrap();
        assert!(commits.iter().all(|c| c.developer_bug_rate == MAX_RISK));
    }

    #[test]
    fn test_output_loads_as_dataset() {
        let csv = generate_csv(&GeneratorConfig::default()).unwrap();
        assert!(csv.starts_with(
            "lines_changed,files_changed,message_length,developer,developer_bug_rate,commit_type,code_area,label\n"
        ));
        let ds = Dataset::from_csv_str(&csv, &DatasetConfig::default()).unwrap();
        assert_eq!(ds.len(), 200);
        assert!(ds.is_categorical("developer"));
        assert!(!ds.is_categorical("developer_bug_rate"));
    }

    #[test]
    fn test_no_developers_is_error() {
        let config = GeneratorConfig {
            developers: Vec::new(),
            ..Default::default()
        };
        assert!(generate(&config).is_err());
    }
}
