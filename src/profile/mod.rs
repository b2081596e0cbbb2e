//! Per-author summaries of low-risk commits
//!
//! For every author with at least one clean (label = 0) commit, records the
//! interquartile range of each numeric feature and the most common value of
//! each categorical feature. Hints are descriptive only.

use crate::dataset::{format_number, mode, Dataset, FeatureValue};
use crate::error::{AdvisorError, AdvisorResult};
use crate::stats;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Typical range of a numeric feature in an author's clean commits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericHint {
    pub feature: String,
    pub p25: f64,
    pub p75: f64,
}

impl fmt::Display for NumericHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} between {} and {}.",
            self.feature,
            format_number(self.p25),
            format_number(self.p75)
        )
    }
}

/// Most common value of a categorical feature in an author's clean commits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalHint {
    pub feature: String,
    pub mode: String,
}

impl fmt::Display for CategoricalHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}.", self.feature, self.mode)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorProfile {
    pub author: String,
    /// Number of clean commits the hints were computed from
    pub commits: usize,
    pub numeric_hints: Vec<NumericHint>,
    pub categorical_hints: Vec<CategoricalHint>,
}

impl AuthorProfile {
    /// Hint lines in column order (numeric first, then categorical)
    pub fn hint_lines(&self) -> Vec<String> {
        self.numeric_hints
            .iter()
            .map(ToString::to_string)
            .chain(self.categorical_hints.iter().map(ToString::to_string))
            .collect()
    }
}

/// Summarize every author's low-risk commits.
///
/// Authors appear in the order they first occur in the dataset. An author
/// with no clean commits gets no profile.
pub fn summarize_profiles(
    dataset: &Dataset,
    author_column: &str,
) -> AdvisorResult<Vec<AuthorProfile>> {
    if !dataset.has_column(author_column) {
        return Err(AdvisorError::MissingFeature {
            feature: author_column.to_string(),
        });
    }

    let mut authors: Vec<String> = Vec::new();
    for row in dataset.rows() {
        if let Some(value) = row.get(author_column) {
            let name = value.to_string();
            if !authors.contains(&name) {
                authors.push(name);
            }
        }
    }

    let mut profiles = Vec::with_capacity(authors.len());
    for author in authors {
        let clean: Vec<_> = dataset
            .rows()
            .iter()
            .zip(dataset.labels())
            .filter(|(row, label)| {
                !**label && row.get(author_column).is_some_and(|v| v.to_string() == author)
            })
            .map(|(row, _)| row)
            .collect();

        if clean.is_empty() {
            debug!("No clean commits for {}, skipping profile", author);
            continue;
        }

        let mut numeric_hints = Vec::new();
        let mut categorical_hints = Vec::new();

        for column in dataset.columns() {
            if column == author_column {
                continue;
            }
            if dataset.is_categorical(column) {
                let most = mode(
                    clean
                        .iter()
                        .filter_map(|r| r.get(column).and_then(FeatureValue::as_category)),
                );
                if let Some(mode) = most {
                    categorical_hints.push(CategoricalHint {
                        feature: column.clone(),
                        mode,
                    });
                }
            } else {
                let mut values: Vec<f64> = clean
                    .iter()
                    .filter_map(|r| r.get(column).and_then(FeatureValue::as_f64))
                    .collect();
                stats::sort_values(&mut values);
                numeric_hints.push(NumericHint {
                    feature: column.clone(),
                    p25: stats::percentile(&values, 25.0),
                    p75: stats::percentile(&values, 75.0),
                });
            }
        }

        profiles.push(AuthorProfile {
            author,
            commits: clean.len(),
            numeric_hints,
            categorical_hints,
        });
    }

    Ok(profiles)
}
