//! Permutation feature importance
//!
//! For each encoded component the column is shuffled across rows and the
//! mean absolute change in predicted risk is recorded. Works against any
//! [`RiskScorer`], so it treats the model as a black box.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::HashMap;

use super::gbdt_model::RiskScorer;
use super::schema::{EncodedVector, EncodingSchema};
use crate::error::AdvisorResult;

/// Normalized weight of one encoded component (or feature)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub name: String,
    pub weight: f64,
}

/// Compute permutation importances for every component of `schema`.
///
/// Weights are non-negative and sum to 1.0, or are all zero when no
/// component moves the prediction (e.g. a constant model). Sorted by weight
/// descending; ties keep schema order.
pub fn permutation_importance(
    model: &dyn RiskScorer,
    schema: &EncodingSchema,
    vectors: &[EncodedVector],
    seed: u64,
) -> AdvisorResult<Vec<FeatureImportance>> {
    let names = schema.component_names();
    let mut raw = vec![0.0_f64; names.len()];

    if vectors.len() > 1 {
        let baseline = model.predict_batch(vectors)?;

        for (j, slot) in raw.iter_mut().enumerate() {
            let mut column: Vec<f64> = vectors.iter().map(|v| v.0[j]).collect();
            let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(j as u64));
            column.shuffle(&mut rng);

            let permuted: Vec<EncodedVector> = vectors
                .iter()
                .zip(&column)
                .map(|(v, &value)| {
                    let mut p = v.clone();
                    p.0[j] = value;
                    p
                })
                .collect();

            let preds = model.predict_batch(&permuted)?;
            let delta: f64 = preds
                .iter()
                .zip(&baseline)
                .map(|(a, b)| (a - b).abs())
                .sum();
            *slot = delta / vectors.len() as f64;
        }
    }

    Ok(normalize(names, raw))
}

fn normalize(names: Vec<String>, raw: Vec<f64>) -> Vec<FeatureImportance> {
    let total: f64 = raw.iter().sum();
    let mut out: Vec<FeatureImportance> = names
        .into_iter()
        .zip(raw)
        .map(|(name, w)| FeatureImportance {
            name,
            weight: if total > 0.0 { w / total } else { 0.0 },
        })
        .collect();
    out.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out
}

/// Sum one-hot component weights back into their source features.
///
/// Keeps the descending order of the input's feature totals.
pub fn aggregate_by_feature(
    schema: &EncodingSchema,
    components: &[FeatureImportance],
) -> Vec<FeatureImportance> {
    let mut owner: HashMap<String, &str> = HashMap::new();
    for spec in schema.features() {
        owner.insert(spec.name.clone(), &spec.name);
    }
    for name in schema.component_names() {
        if let Some((feature, _)) = name.split_once('=') {
            if let Some(spec) = schema.feature(feature) {
                owner.insert(name.clone(), &spec.name);
            }
        }
    }

    let mut totals: Vec<FeatureImportance> = schema
        .features()
        .iter()
        .map(|f| FeatureImportance {
            name: f.name.clone(),
            weight: 0.0,
        })
        .collect();
    for c in components {
        if let Some(feature) = owner.get(&c.name) {
            if let Some(t) = totals.iter_mut().find(|t| t.name == *feature) {
                t.weight += c.weight;
            }
        }
    }
    totals.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    totals
}
