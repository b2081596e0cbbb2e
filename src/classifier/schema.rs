//! One-hot encoding schema for commit records
//!
//! The schema is frozen from the training dataset: numeric features keep a
//! single component, categorical features expand to one component per
//! category seen at training time (sorted, so the layout is stable).
//!
//! Layout follows dataset column order:
//!   lines_changed | files_changed | developer=dev1 | developer=dev2 | ...

use crate::dataset::{CommitRecord, Dataset, FeatureValue};
use crate::error::{AdvisorError, AdvisorResult};
use crate::stats;
use serde::Serialize;
use std::collections::HashSet;

/// Whether a numeric feature only ever held whole numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericKind {
    Integer,
    Float,
}

/// Per-feature encoding rule plus the statistics the search needs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureKind {
    Numeric {
        kind: NumericKind,
        min: f64,
        max: f64,
        median: f64,
    },
    Categorical {
        categories: Vec<String>,
        most_frequent: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSpec {
    pub name: String,
    pub kind: FeatureKind,
}

impl FeatureSpec {
    /// Number of encoded components this feature occupies
    pub fn width(&self) -> usize {
        match &self.kind {
            FeatureKind::Numeric { .. } => 1,
            FeatureKind::Categorical { categories, .. } => categories.len(),
        }
    }

    /// Value used when the caller does not supply one
    pub fn default_value(&self) -> FeatureValue {
        match &self.kind {
            FeatureKind::Numeric { kind, median, .. } => {
                let v = match kind {
                    NumericKind::Integer => median.trunc(),
                    NumericKind::Float => *median,
                };
                FeatureValue::Numeric(v)
            }
            FeatureKind::Categorical { most_frequent, .. } => {
                FeatureValue::Category(most_frequent.clone())
            }
        }
    }
}

/// Numeric vector laid out according to an [`EncodingSchema`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EncodedVector(pub Vec<f64>);

impl EncodedVector {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Frozen mapping from raw features to encoded vector positions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodingSchema {
    features: Vec<FeatureSpec>,
    width: usize,
}

impl EncodingSchema {
    pub fn new(features: Vec<FeatureSpec>) -> Self {
        let width = features.iter().map(FeatureSpec::width).sum();
        Self { features, width }
    }

    /// Capture the schema from every column of a dataset
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let features = dataset
            .columns()
            .iter()
            .map(|name| {
                let kind = if dataset.is_categorical(name) {
                    FeatureKind::Categorical {
                        categories: dataset.categories(name),
                        most_frequent: dataset.most_frequent(name).unwrap_or_default(),
                    }
                } else {
                    let mut values = dataset.numeric_values(name);
                    stats::sort_values(&mut values);
                    let kind = if values.iter().all(|v| v.fract() == 0.0) {
                        NumericKind::Integer
                    } else {
                        NumericKind::Float
                    };
                    FeatureKind::Numeric {
                        kind,
                        min: values.first().copied().unwrap_or(0.0),
                        max: values.last().copied().unwrap_or(0.0),
                        median: stats::percentile(&values, 50.0),
                    }
                };
                FeatureSpec {
                    name: name.clone(),
                    kind,
                }
            })
            .collect();
        Self::new(features)
    }

    pub fn features(&self) -> &[FeatureSpec] {
        &self.features
    }

    pub fn feature(&self, name: &str) -> Option<&FeatureSpec> {
        self.features.iter().find(|f| f.name == name)
    }

    /// Total encoded vector length
    pub fn width(&self) -> usize {
        self.width
    }

    /// Name of every encoded component, in vector order.
    ///
    /// Numeric components use the feature name, one-hot components use
    /// `feature=category`.
    pub fn component_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.width);
        for spec in &self.features {
            match &spec.kind {
                FeatureKind::Numeric { .. } => names.push(spec.name.clone()),
                FeatureKind::Categorical { categories, .. } => {
                    names.extend(categories.iter().map(|c| format!("{}={}", spec.name, c)));
                }
            }
        }
        names
    }

    /// Encode a record into a vector of `width()` components.
    ///
    /// Unseen categories encode to an all-zero block. A schema feature absent
    /// from the record is a `MissingFeature`; an unknown feature or a value of
    /// the wrong type is a `SchemaMismatch`.
    pub fn encode(&self, record: &CommitRecord) -> AdvisorResult<EncodedVector> {
        let mut out = Vec::with_capacity(self.width);

        for spec in &self.features {
            let value = record
                .get(&spec.name)
                .ok_or_else(|| AdvisorError::MissingFeature {
                    feature: spec.name.clone(),
                })?;

            match (&spec.kind, value) {
                (FeatureKind::Numeric { .. }, FeatureValue::Numeric(v)) => out.push(*v),
                (FeatureKind::Categorical { categories, .. }, FeatureValue::Category(c)) => {
                    out.extend(categories.iter().map(|k| if k == c { 1.0 } else { 0.0 }));
                }
                (FeatureKind::Numeric { .. }, FeatureValue::Category(c)) => {
                    return Err(AdvisorError::SchemaMismatch(format!(
                        "feature '{}' is numeric but got category '{}'",
                        spec.name, c
                    )));
                }
                (FeatureKind::Categorical { .. }, FeatureValue::Numeric(v)) => {
                    return Err(AdvisorError::SchemaMismatch(format!(
                        "feature '{}' is categorical but got number {}",
                        spec.name, v
                    )));
                }
            }
        }

        if record.len() != self.features.len() {
            let known: HashSet<&str> = self.features.iter().map(|f| f.name.as_str()).collect();
            let unknown: Vec<&str> = record.features().filter(|f| !known.contains(f)).collect();
            return Err(AdvisorError::SchemaMismatch(format!(
                "unknown features: {}",
                unknown.join(", ")
            )));
        }

        Ok(EncodedVector(out))
    }

    /// Encode many records, failing on the first error
    pub fn encode_all(&self, records: &[CommitRecord]) -> AdvisorResult<Vec<EncodedVector>> {
        records.iter().map(|r| self.encode(r)).collect()
    }

    /// Map a vector back to a record.
    ///
    /// Each one-hot block decodes to its hot category; an all-zero block
    /// decodes to the empty category, which re-encodes to all zeros.
    pub fn decode(&self, vector: &EncodedVector) -> AdvisorResult<CommitRecord> {
        self.check_width(vector)?;

        let mut record = CommitRecord::new();
        let mut offset = 0;
        for spec in &self.features {
            let value = match &spec.kind {
                FeatureKind::Numeric { .. } => FeatureValue::Numeric(vector.0[offset]),
                FeatureKind::Categorical { categories, .. } => {
                    let block = &vector.0[offset..offset + categories.len()];
                    let hot = block.iter().position(|&v| v > 0.5);
                    FeatureValue::Category(
                        hot.map(|i| categories[i].clone()).unwrap_or_default(),
                    )
                }
            };
            record.insert(spec.name.clone(), value);
            offset += spec.width();
        }
        Ok(record)
    }

    /// Fail with `SchemaMismatch` when a vector has the wrong length
    pub fn check_width(&self, vector: &EncodedVector) -> AdvisorResult<()> {
        if vector.len() != self.width {
            return Err(AdvisorError::SchemaMismatch(format!(
                "expected {} components, got {}",
                self.width,
                vector.len()
            )));
        }
        Ok(())
    }

    /// Record filled with each feature's default (median / most frequent)
    pub fn default_record(&self) -> CommitRecord {
        let mut record = CommitRecord::new();
        for spec in &self.features {
            record.insert(spec.name.clone(), spec.default_value());
        }
        record
    }
}
