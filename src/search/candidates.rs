//! Candidate space around a base commit
//!
//! Each feature contributes a small ordered set of candidate values; the
//! space is their Cartesian product, walked lazily like an odometer (the
//! last feature varies fastest). Calling [`CandidateSpace::iter`] again
//! restarts the walk from the first combination.

use crate::classifier::{EncodingSchema, FeatureKind, NumericKind};
use crate::config::CandidatePolicy;
use crate::dataset::{CommitRecord, FeatureValue};
use crate::error::{AdvisorError, AdvisorResult};

/// Finite product of per-feature candidate values
#[derive(Debug, Clone)]
pub struct CandidateSpace {
    names: Vec<String>,
    options: Vec<Vec<FeatureValue>>,
}

impl CandidateSpace {
    /// Build the space for `base` under `policy`.
    ///
    /// Numeric features vary around the base value; categorical features
    /// enumerate every category seen in the training data.
    pub fn build(
        base: &CommitRecord,
        schema: &EncodingSchema,
        policy: &CandidatePolicy,
    ) -> AdvisorResult<Self> {
        let mut names = Vec::with_capacity(schema.features().len());
        let mut options = Vec::with_capacity(schema.features().len());

        for spec in schema.features() {
            let value = base
                .get(&spec.name)
                .ok_or_else(|| AdvisorError::MissingFeature {
                    feature: spec.name.clone(),
                })?;

            let values = match &spec.kind {
                FeatureKind::Numeric { kind, min, max, .. } => {
                    let v = value.as_f64().ok_or_else(|| {
                        AdvisorError::SchemaMismatch(format!(
                            "feature '{}' is numeric but got '{}'",
                            spec.name, value
                        ))
                    })?;
                    numeric_candidates(v, *kind, *min, *max, policy)
                        .into_iter()
                        .map(FeatureValue::Numeric)
                        .collect()
                }
                FeatureKind::Categorical { categories, .. } => {
                    if value.as_category().is_none() {
                        return Err(AdvisorError::SchemaMismatch(format!(
                            "feature '{}' is categorical but got '{}'",
                            spec.name, value
                        )));
                    }
                    categories
                        .iter()
                        .map(|c| FeatureValue::Category(c.clone()))
                        .collect()
                }
            };

            names.push(spec.name.clone());
            options.push(values);
        }

        Ok(Self { names, options })
    }

    /// Number of combinations, `None` if it does not fit in a `u128`
    pub fn size(&self) -> Option<u128> {
        self.options
            .iter()
            .try_fold(1u128, |acc, o| acc.checked_mul(o.len() as u128))
    }

    pub fn iter(&self) -> CandidateIter<'_> {
        let cursor = if self.options.iter().any(Vec::is_empty) {
            None
        } else {
            Some(vec![0; self.options.len()])
        };
        CandidateIter {
            space: self,
            cursor,
        }
    }
}

/// Lazy walk over a [`CandidateSpace`]
pub struct CandidateIter<'a> {
    space: &'a CandidateSpace,
    cursor: Option<Vec<usize>>,
}

impl Iterator for CandidateIter<'_> {
    type Item = CommitRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.as_mut()?;

        let mut record = CommitRecord::new();
        for ((name, opts), &i) in self.space.names.iter().zip(&self.space.options).zip(cursor.iter()) {
            record.insert(name.clone(), opts[i].clone());
        }

        // Advance the odometer; exhausted once every digit wraps.
        let mut exhausted = true;
        for pos in (0..cursor.len()).rev() {
            cursor[pos] += 1;
            if cursor[pos] < self.space.options[pos].len() {
                exhausted = false;
                break;
            }
            cursor[pos] = 0;
        }
        if exhausted {
            self.cursor = None;
        }

        Some(record)
    }
}

/// Candidate values for one numeric feature, ascending and deduplicated
pub fn numeric_candidates(
    value: f64,
    kind: NumericKind,
    min: f64,
    max: f64,
    policy: &CandidatePolicy,
) -> Vec<f64> {
    let step = policy.step.abs();
    let integral = kind == NumericKind::Integer;
    let mut out = vec![value];

    if policy.step_down {
        let mut down = value - step;
        if integral {
            down = down.floor();
        }
        out.push(down.max(min).min(value));
    }
    if policy.half_value {
        let mut half = value / 2.0;
        if integral {
            half = half.floor();
        }
        out.push(half.max(min).min(value));
    }
    if policy.step_up {
        let mut up = value + step;
        if integral {
            up = up.ceil();
        }
        out.push(up.min(max).max(value));
    }

    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    out.dedup();
    out
}
