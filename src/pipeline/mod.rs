//! Commit analysis pipeline
//!
//! Orchestrates one full analysis run:
//! 1. Freeze the encoding schema from the whole dataset
//! 2. Split, train the risk model and measure held-out accuracy
//! 3. Compute permutation importances on the training rows
//! 4. Build the base commit from dataset defaults and user overrides
//! 5. Score it, search its neighborhood, summarize author profiles
//!
//! Every call rebuilds everything; nothing is cached between runs.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::classifier::{
    aggregate_by_feature, permutation_importance, train, EncodingSchema, FeatureImportance,
    FeatureKind, RiskScorer,
};
use crate::config::AdvisorConfig;
use crate::dataset::{CommitRecord, Dataset, FeatureValue};
use crate::error::{AdvisorError, AdvisorResult};
use crate::profile::{summarize_profiles, AuthorProfile};
use crate::search::{ExhaustiveSearch, SearchStrategy, Suggestion};

/// Feature values the user fixed for the commit being evaluated.
///
/// Values are kept as raw text and typed against the schema when the
/// analysis runs. Features left unset take the dataset default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserInput {
    overrides: BTreeMap<String, String>,
}

impl UserInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, feature: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(feature.into(), value.into());
        self
    }

    /// Parse a `FEATURE=VALUE` assignment
    pub fn parse_assignment(assignment: &str) -> AdvisorResult<(String, String)> {
        match assignment.split_once('=') {
            Some((feature, value)) if !feature.trim().is_empty() => {
                Ok((feature.trim().to_string(), value.trim().to_string()))
            }
            _ => Err(AdvisorError::SchemaMismatch(format!(
                "expected FEATURE=VALUE, got '{assignment}'"
            ))),
        }
    }

    pub fn overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.overrides.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlay the overrides on the schema's default record
    pub fn base_record(&self, schema: &EncodingSchema) -> AdvisorResult<CommitRecord> {
        let mut record = schema.default_record();
        for (feature, raw) in &self.overrides {
            let spec = schema.feature(feature).ok_or_else(|| {
                AdvisorError::SchemaMismatch(format!("unknown feature '{feature}'"))
            })?;
            let value = match &spec.kind {
                FeatureKind::Numeric { .. } => {
                    let v = raw.parse::<f64>().ok().filter(|v| v.is_finite()).ok_or_else(|| {
                        AdvisorError::SchemaMismatch(format!(
                            "feature '{feature}' expects a number, got '{raw}'"
                        ))
                    })?;
                    FeatureValue::Numeric(v)
                }
                FeatureKind::Categorical { categories, .. } => {
                    if !categories.contains(raw) {
                        warn!(
                            "'{}' was never seen for '{}'; it will encode as no category",
                            raw, feature
                        );
                    }
                    FeatureValue::Category(raw.clone())
                }
            };
            record.insert(feature.clone(), value);
        }
        Ok(record)
    }
}

/// Everything one analysis run produces
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// Held-out accuracy, `None` when the dataset was too small to hold out
    pub accuracy: Option<f64>,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Feature columns in dataset order
    pub columns: Vec<String>,
    /// The commit being evaluated (defaults plus overrides)
    pub base: CommitRecord,
    pub original_risk: f64,
    pub threshold: f64,
    pub suggestions: Vec<Suggestion>,
    pub evaluated: u64,
    pub space_size: Option<u128>,
    pub truncated: bool,
    /// Per encoded component, descending
    pub importances: Vec<FeatureImportance>,
    /// Per source feature (one-hot blocks summed), descending
    pub feature_importances: Vec<FeatureImportance>,
    pub profiles: Vec<AuthorProfile>,
}

/// Run the full analysis on a dataset.
///
/// Uses [`ExhaustiveSearch`] for the neighborhood search.
pub fn run_analysis(
    dataset: &Dataset,
    input: &UserInput,
    config: &AdvisorConfig,
) -> AdvisorResult<AnalysisResult> {
    run_analysis_with(dataset, input, config, &ExhaustiveSearch)
}

/// Run the full analysis with a custom search strategy
pub fn run_analysis_with(
    dataset: &Dataset,
    input: &UserInput,
    config: &AdvisorConfig,
    strategy: &dyn SearchStrategy,
) -> AdvisorResult<AnalysisResult> {
    info!(
        "Analyzing {} commits ({} bug-introducing)",
        dataset.len(),
        dataset.positive_count()
    );

    let trained = train(dataset, &config.model)?;

    let importances = permutation_importance(
        &trained.model,
        &trained.schema,
        &trained.train_vectors,
        config.model.seed,
    )?;
    let feature_importances = aggregate_by_feature(&trained.schema, &importances);

    let base = input.base_record(&trained.schema)?;
    let original_risk = trained.model.predict(&trained.schema.encode(&base)?)?;
    debug!("Base commit risk: {:.4}", original_risk);

    let outcome = strategy.search(&base, &trained.schema, &trained.model, &config.search)?;
    info!(
        "{} of {} candidates at or below {:.2}%",
        outcome.suggestions.len(),
        outcome.evaluated,
        config.search.threshold * 100.0
    );

    let profiles = match config.dataset.author_column.as_deref() {
        Some(author) if dataset.has_column(author) => summarize_profiles(dataset, author)?,
        Some(author) => {
            debug!("Author column '{}' not in dataset, skipping profiles", author);
            Vec::new()
        }
        None => Vec::new(),
    };

    Ok(AnalysisResult {
        accuracy: trained.accuracy,
        train_rows: trained.train_rows,
        test_rows: trained.test_rows,
        columns: dataset.columns().to_vec(),
        base,
        original_risk,
        threshold: config.search.threshold,
        suggestions: outcome.suggestions,
        evaluated: outcome.evaluated,
        space_size: outcome.space_size,
        truncated: outcome.truncated,
        importances,
        feature_importances,
        profiles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatasetConfig, GeneratorConfig, ModelConfig};
    use crate::generator::generate_csv;

    fn small_config() -> AdvisorConfig {
        AdvisorConfig {
            model: ModelConfig {
                trees: 10,
                max_depth: 3,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn synthetic(rows: usize) -> Dataset {
        let settings = GeneratorConfig {
            rows,
            ..Default::default()
        };
        let csv = generate_csv(&settings).unwrap();
        Dataset::from_csv_str(&csv, &DatasetConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            UserInput::parse_assignment("lines_changed = 40").unwrap(),
            ("lines_changed".to_string(), "40".to_string())
        );
        assert!(UserInput::parse_assignment("lines_changed").is_err());
        assert!(UserInput::parse_assignment("=4").is_err());
    }

    #[test]
    fn test_base_record_overlays_defaults() {
        let ds = crate::classifier::schema::tests::sample_dataset();
        let schema = EncodingSchema::from_dataset(&ds);
        let base = UserInput::new()
            .set("developer", "dev3")
            .base_record(&schema)
            .unwrap();
        assert_eq!(base.get("lines_changed"), Some(&FeatureValue::Numeric(25.0)));
        assert_eq!(base.get("developer"), Some(&FeatureValue::Category("dev3".into())));
    }

    #[test]
    fn test_unknown_override_is_mismatch() {
        let ds = crate::classifier::schema::tests::sample_dataset();
        let schema = EncodingSchema::from_dataset(&ds);
        let err = UserInput::new()
            .set("mood", "happy")
            .base_record(&schema)
            .unwrap_err();
        assert!(matches!(err, AdvisorError::SchemaMismatch(msg) if msg.contains("mood")));

        let err = UserInput::new()
            .set("lines_changed", "lots")
            .base_record(&schema)
            .unwrap_err();
        assert!(matches!(err, AdvisorError::SchemaMismatch(_)));
    }

    #[test]
    fn test_run_analysis_end_to_end() {
        let ds = synthetic(120);
        let mut config = small_config();
        config.search.threshold = 1.0;

        let input = UserInput::new().set("lines_changed", "150").set("developer", "dev5");
        let result = run_analysis(&ds, &input, &config).unwrap();

        assert_eq!(result.train_rows + result.test_rows, 120);
        assert_eq!(result.test_rows, 24);
        assert!(result.accuracy.is_some());
        assert!((0.0..=1.0).contains(&result.original_risk));
        // Threshold 1.0 keeps every candidate
        assert_eq!(result.suggestions.len() as u64, result.evaluated);
        assert!(!result.truncated);

        let total: f64 = result.importances.iter().map(|i| i.weight).sum();
        assert!(total == 0.0 || (total - 1.0).abs() < 1e-9);
        assert_eq!(result.feature_importances.len(), ds.columns().len());

        assert!(!result.profiles.is_empty());
        assert!(result
            .profiles
            .iter()
            .all(|p| p.categorical_hints.iter().all(|h| h.feature != "developer")));
    }

    #[test]
    fn test_run_analysis_is_deterministic() {
        let ds = synthetic(80);
        let config = small_config();
        let input = UserInput::new().set("files_changed", "6");

        let a = run_analysis(&ds, &input, &config).unwrap();
        let b = run_analysis(&ds, &input, &config).unwrap();
        assert_eq!(a.original_risk, b.original_risk);
        assert_eq!(a.suggestions, b.suggestions);
        assert_eq!(a.importances, b.importances);
    }

    #[test]
    fn test_profiles_skipped_without_author_column() {
        let ds = synthetic(60);
        let mut config = small_config();
        config.dataset.author_column = None;
        let result = run_analysis(&ds, &UserInput::new(), &config).unwrap();
        assert!(result.profiles.is_empty());
    }
}
