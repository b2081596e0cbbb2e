//! Commit history dataset
//!
//! Loads a CSV of historical commits into typed rows. Columns listed in
//! `[dataset] categorical_columns` are kept as category labels, the label
//! column is split off as a boolean, and every other column must be numeric.

pub mod csv;

use crate::config::DatasetConfig;
use crate::error::{AdvisorError, AdvisorResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// A single feature value in a commit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Numeric(f64),
    Category(String),
}

impl FeatureValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Numeric(v) => Some(*v),
            FeatureValue::Category(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            FeatureValue::Numeric(_) => None,
            FeatureValue::Category(c) => Some(c),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Numeric(v) => write!(f, "{}", format_number(*v)),
            FeatureValue::Category(c) => write!(f, "{c}"),
        }
    }
}

/// Format a number without a trailing `.0` for integral values.
///
/// Other values use the shortest representation that round-trips.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

/// Feature name → value mapping for one commit (label excluded)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitRecord {
    values: BTreeMap<String, FeatureValue>,
}

impl CommitRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, feature: impl Into<String>, value: FeatureValue) -> Self {
        self.insert(feature, value);
        self
    }

    pub fn insert(&mut self, feature: impl Into<String>, value: FeatureValue) {
        self.values.insert(feature.into(), value);
    }

    pub fn get(&self, feature: &str) -> Option<&FeatureValue> {
        self.values.get(feature)
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Historical commits with binary bug labels
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    categorical: BTreeSet<String>,
    rows: Vec<CommitRecord>,
    labels: Vec<bool>,
}

impl Dataset {
    /// Build a dataset from already-typed rows.
    ///
    /// Every row must carry every column, with categorical columns holding
    /// categories and the rest holding numbers.
    pub fn from_parts(
        columns: Vec<String>,
        categorical: BTreeSet<String>,
        rows: Vec<CommitRecord>,
        labels: Vec<bool>,
    ) -> AdvisorResult<Self> {
        if rows.is_empty() {
            return Err(AdvisorError::EmptyDataset);
        }
        if rows.len() != labels.len() {
            return Err(AdvisorError::SchemaMismatch(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        for (i, row) in rows.iter().enumerate() {
            for column in &columns {
                let value = row.get(column).ok_or_else(|| AdvisorError::MissingFeature {
                    feature: column.clone(),
                })?;
                let expected_category = categorical.contains(column);
                if expected_category != value.as_category().is_some() {
                    return Err(AdvisorError::SchemaMismatch(format!(
                        "row {i}: column '{column}' has the wrong value type"
                    )));
                }
            }
        }
        Ok(Self {
            columns,
            categorical,
            rows,
            labels,
        })
    }

    /// Load a dataset from a CSV file on disk
    pub fn from_csv_path(path: &Path, config: &DatasetConfig) -> AdvisorResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let dataset = Self::from_csv_str(&text, config)?;
        debug!(
            "Loaded {} commits with {} features from {}",
            dataset.len(),
            dataset.columns.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Parse a dataset from CSV text
    pub fn from_csv_str(text: &str, config: &DatasetConfig) -> AdvisorResult<Self> {
        let table = csv::parse(text)?;

        let label_idx = table
            .header
            .iter()
            .position(|h| h == &config.label_column)
            .ok_or_else(|| AdvisorError::MissingFeature {
                feature: config.label_column.clone(),
            })?;

        let columns: Vec<String> = table
            .header
            .iter()
            .filter(|h| *h != &config.label_column)
            .cloned()
            .collect();

        let categorical: BTreeSet<String> = config
            .categorical_columns
            .iter()
            .filter(|c| {
                let present = columns.contains(c);
                if !present {
                    debug!("Categorical column '{}' not in dataset, ignoring", c);
                }
                present
            })
            .cloned()
            .collect();

        let mut rows = Vec::with_capacity(table.rows.len());
        let mut labels = Vec::with_capacity(table.rows.len());

        for (line, fields) in &table.rows {
            let mut record = CommitRecord::new();
            for (idx, (name, raw)) in table.header.iter().zip(fields).enumerate() {
                let raw = raw.trim();
                if idx == label_idx {
                    labels.push(parse_label(raw, *line)?);
                } else if categorical.contains(name) {
                    record.insert(name.clone(), FeatureValue::Category(raw.to_string()));
                } else {
                    let value = raw.parse::<f64>().ok().filter(|v| v.is_finite()).ok_or_else(|| {
                        AdvisorError::MalformedInput {
                            line: *line,
                            message: format!(
                                "column '{name}' expects a number, found '{raw}' \
                                 (list it under categorical_columns if it is a label)"
                            ),
                        }
                    })?;
                    record.insert(name.clone(), FeatureValue::Numeric(value));
                }
            }
            rows.push(record);
        }

        Self::from_parts(columns, categorical, rows, labels)
    }

    /// Feature columns in file order (label excluded)
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_categorical(&self, feature: &str) -> bool {
        self.categorical.contains(feature)
    }

    pub fn has_column(&self, feature: &str) -> bool {
        self.columns.iter().any(|c| c == feature)
    }

    pub fn rows(&self) -> &[CommitRecord] {
        &self.rows
    }

    pub fn labels(&self) -> &[bool] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows labelled as bug-introducing
    pub fn positive_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l).count()
    }

    /// All values of a numeric column, in row order
    pub fn numeric_values(&self, feature: &str) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|r| r.get(feature).and_then(FeatureValue::as_f64))
            .collect()
    }

    /// Distinct categories of a categorical column, sorted
    pub fn categories(&self, feature: &str) -> Vec<String> {
        let set: BTreeSet<&str> = self
            .rows
            .iter()
            .filter_map(|r| r.get(feature).and_then(FeatureValue::as_category))
            .collect();
        set.into_iter().map(str::to_string).collect()
    }

    /// Most frequent category, ties broken by first appearance
    pub fn most_frequent(&self, feature: &str) -> Option<String> {
        mode(
            self.rows
                .iter()
                .filter_map(|r| r.get(feature).and_then(FeatureValue::as_category)),
        )
    }
}

/// Most frequent item of a sequence, ties broken by first appearance
pub fn mode<'a>(items: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, item) in items.enumerate() {
        counts.entry(item).or_insert((0, pos)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
        .map(|(item, _)| item.to_string())
}

fn parse_label(raw: &str, line: usize) -> AdvisorResult<bool> {
    match raw.parse::<f64>() {
        Ok(v) if v == 0.0 => Ok(false),
        Ok(v) if v == 1.0 => Ok(true),
        _ => Err(AdvisorError::MalformedInput {
            line,
            message: format!("label must be 0 or 1, found '{raw}'"),
        }),
    }
}
