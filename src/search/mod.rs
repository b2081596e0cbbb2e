//! Neighborhood search for lower-risk commit variants
//!
//! A [`SearchStrategy`] takes a base commit and returns every variant in its
//! neighborhood whose predicted risk is at or below a threshold. The
//! exhaustive strategy walks the full [`CandidateSpace`], bounded by
//! `max_combinations` since the product grows with every categorical feature.

mod candidates;

pub use candidates::{numeric_candidates, CandidateIter, CandidateSpace};

use crate::classifier::{EncodingSchema, RiskScorer};
use crate::config::{OverflowPolicy, SearchConfig};
use crate::dataset::CommitRecord;
use crate::error::{AdvisorError, AdvisorResult};
use serde::Serialize;
use tracing::{debug, warn};

/// Number of candidates encoded and scored per model call
const SCORE_BATCH: usize = 1024;

/// A commit variant with its predicted risk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub record: CommitRecord,
    pub risk: f64,
}

/// Result of one search invocation
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchOutcome {
    /// Qualifying variants in enumeration order
    pub suggestions: Vec<Suggestion>,
    /// Candidates actually scored
    pub evaluated: u64,
    /// Full size of the space (`None` if it overflowed `u128`)
    pub space_size: Option<u128>,
    /// Whether enumeration stopped at `max_combinations`
    pub truncated: bool,
}

/// Strategy for finding low-risk variants of a commit.
///
/// Callers only depend on this trait, so smarter searches can replace the
/// exhaustive walk without touching them.
pub trait SearchStrategy {
    fn search(
        &self,
        base: &CommitRecord,
        schema: &EncodingSchema,
        model: &dyn RiskScorer,
        config: &SearchConfig,
    ) -> AdvisorResult<SearchOutcome>;
}

/// Score every combination of the candidate space
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveSearch;

impl SearchStrategy for ExhaustiveSearch {
    fn search(
        &self,
        base: &CommitRecord,
        schema: &EncodingSchema,
        model: &dyn RiskScorer,
        config: &SearchConfig,
    ) -> AdvisorResult<SearchOutcome> {
        let space = CandidateSpace::build(base, schema, &config.candidates)?;
        let size = space.size();
        let cap = config.max_combinations;

        let over_cap = size.map_or(true, |s| s > cap as u128);
        let limit = if over_cap {
            match config.on_overflow {
                OverflowPolicy::Fail => {
                    return Err(AdvisorError::SearchSpaceTooLarge { size, cap });
                }
                OverflowPolicy::Truncate => {
                    warn!(
                        "Candidate space ({}) exceeds {}; scoring only the first {}",
                        size.map_or_else(|| "overflow".to_string(), |s| s.to_string()),
                        cap,
                        cap
                    );
                    cap
                }
            }
        } else {
            // Fits in u64 because it is at most `cap`.
            size.unwrap_or(0) as u64
        };

        debug!("Scoring {} candidates at threshold {}", limit, config.threshold);

        let mut outcome = SearchOutcome {
            space_size: size,
            truncated: over_cap,
            ..Default::default()
        };
        let mut candidates = space.iter().take(limit as usize);

        loop {
            let batch: Vec<CommitRecord> = candidates.by_ref().take(SCORE_BATCH).collect();
            if batch.is_empty() {
                break;
            }
            let vectors = schema.encode_all(&batch)?;
            let risks = model.predict_batch(&vectors)?;
            outcome.evaluated += batch.len() as u64;

            outcome.suggestions.extend(
                batch
                    .into_iter()
                    .zip(risks)
                    .filter(|(_, risk)| *risk <= config.threshold)
                    .map(|(record, risk)| Suggestion { record, risk }),
            );
        }

        debug!(
            "{} of {} candidates at or below {}",
            outcome.suggestions.len(),
            outcome.evaluated,
            config.threshold
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{EncodedVector, FeatureKind, FeatureSpec, NumericKind};
    use crate::config::CandidatePolicy;
    use crate::dataset::FeatureValue;

    /// risk = x / 10, the only feature
    struct LinearX;

    impl RiskScorer for LinearX {
        fn predict(&self, vector: &EncodedVector) -> AdvisorResult<f64> {
            Ok((vector.0[0] / 10.0).clamp(0.0, 1.0))
        }
    }

    /// risk = x / 10, lowered by 0.3 in the "docs" area
    struct XWithArea;

    impl RiskScorer for XWithArea {
        fn predict(&self, vector: &EncodedVector) -> AdvisorResult<f64> {
            let docs = vector.0[2];
            Ok((vector.0[0] / 10.0 - 0.3 * docs).clamp(0.0, 1.0))
        }
    }

    fn x_spec() -> FeatureSpec {
        FeatureSpec {
            name: "x".into(),
            kind: FeatureKind::Numeric {
                kind: NumericKind::Integer,
                min: 0.0,
                max: 10.0,
                median: 5.0,
            },
        }
    }

    fn area_spec(categories: &[&str]) -> FeatureSpec {
        FeatureSpec {
            name: "area".into(),
            kind: FeatureKind::Categorical {
                categories: categories.iter().map(|c| c.to_string()).collect(),
                most_frequent: categories[0].to_string(),
            },
        }
    }

    fn x_record(x: f64) -> CommitRecord {
        CommitRecord::new().with("x", FeatureValue::Numeric(x))
    }

    fn config(threshold: f64) -> SearchConfig {
        SearchConfig {
            threshold,
            ..Default::default()
        }
    }

    #[test]
    fn test_min_step_near_miss_is_empty() {
        // Base x=8 gives {7, 8}; 0.7 and 0.8 both exceed 0.5.
        let schema = EncodingSchema::new(vec![x_spec()]);
        let outcome = ExhaustiveSearch
            .search(&x_record(8.0), &schema, &LinearX, &config(0.5))
            .unwrap();
        assert!(outcome.suggestions.is_empty());
        assert_eq!(outcome.evaluated, 2);
        assert_eq!(outcome.space_size, Some(2));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let schema = EncodingSchema::new(vec![x_spec()]);
        let outcome = ExhaustiveSearch
            .search(&x_record(5.0), &schema, &LinearX, &config(0.4))
            .unwrap();
        assert_eq!(outcome.suggestions.len(), 1);
        assert_eq!(
            outcome.suggestions[0].record.get("x"),
            Some(&FeatureValue::Numeric(4.0))
        );
    }

    #[test]
    fn test_returns_all_and_only_qualifying() {
        let schema = EncodingSchema::new(vec![x_spec(), area_spec(&["core", "docs"])]);
        let base = x_record(6.0).with("area", FeatureValue::Category("core".into()));
        let cfg = SearchConfig {
            threshold: 0.3,
            candidates: CandidatePolicy {
                half_value: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let outcome = ExhaustiveSearch
            .search(&base, &schema, &XWithArea, &cfg)
            .unwrap();

        // Space: x ∈ {3, 5, 6} × area ∈ {core, docs}
        assert_eq!(outcome.evaluated, 6);
        let got: Vec<(f64, &str)> = outcome
            .suggestions
            .iter()
            .map(|s| {
                (
                    s.record.get("x").and_then(FeatureValue::as_f64).unwrap(),
                    s.record.get("area").and_then(FeatureValue::as_category).unwrap(),
                )
            })
            .collect();
        assert_eq!(got, vec![(3.0, "core"), (3.0, "docs"), (5.0, "docs"), (6.0, "docs")]);
        assert!(outcome.suggestions.iter().all(|s| s.risk <= 0.3));
    }

    #[test]
    fn test_threshold_below_minimum_is_empty() {
        let schema = EncodingSchema::new(vec![x_spec()]);
        let outcome = ExhaustiveSearch
            .search(&x_record(3.0), &schema, &LinearX, &config(0.1))
            .unwrap();
        assert!(outcome.suggestions.is_empty());
    }

    #[test]
    fn test_space_over_cap_fails() {
        let schema = EncodingSchema::new(vec![x_spec(), area_spec(&["a", "b", "c"])]);
        let base = x_record(5.0).with("area", FeatureValue::Category("a".into()));
        let cfg = SearchConfig {
            threshold: 1.0,
            max_combinations: 4,
            ..Default::default()
        };
        let err = ExhaustiveSearch
            .search(&base, &schema, &XWithArea, &cfg)
            .unwrap_err();
        assert!(matches!(
            err,
            AdvisorError::SearchSpaceTooLarge { size: Some(6), cap: 4 }
        ));
    }

    #[test]
    fn test_space_over_cap_truncates_deterministically() {
        let schema = EncodingSchema::new(vec![x_spec(), area_spec(&["a", "b", "c"])]);
        let base = x_record(5.0).with("area", FeatureValue::Category("a".into()));
        let cfg = SearchConfig {
            threshold: 1.0,
            max_combinations: 4,
            on_overflow: OverflowPolicy::Truncate,
            ..Default::default()
        };
        let first = ExhaustiveSearch
            .search(&base, &schema, &XWithArea, &cfg)
            .unwrap();
        let second = ExhaustiveSearch
            .search(&base, &schema, &XWithArea, &cfg)
            .unwrap();
        assert!(first.truncated);
        assert_eq!(first.evaluated, 4);
        assert_eq!(first.suggestions, second.suggestions);
    }
}
