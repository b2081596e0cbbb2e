//! GBDT risk model
//!
//! Wraps the `gbdt` crate to provide:
//! - Training from encoded commit vectors and bug labels
//! - Single and batch risk prediction behind the [`RiskScorer`] trait
//! - A constant fallback when the training data holds a single class
//!
//! The `LogLikelyhood` loss interprets label 1.0 as "introduced a bug" and
//! -1.0 as "clean"; its output is the probability of the bug label.
//!
//! Note: the gbdt crate internally uses `f32` (`ValueType`), while encoded
//! vectors store `f64`. Conversions happen transparently at the crate
//! boundary.

use gbdt::config::Config;
use gbdt::decision_tree::Data;
use gbdt::gradient_boost::GBDT;
use tracing::{debug, warn};

use super::schema::EncodedVector;
use crate::config::ModelConfig;
use crate::error::{AdvisorError, AdvisorResult};

#[inline]
fn vector_to_f32(vector: &EncodedVector) -> Vec<f32> {
    vector.as_slice().iter().map(|&v| v as f32).collect()
}

/// Clamp a raw model output into a probability
#[inline]
fn to_probability(raw: f32) -> f64 {
    let p = raw as f64;
    if p.is_nan() {
        0.5
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Probability-of-bug scorer over encoded vectors.
///
/// Implementations must return values in `[0, 1]` and reject vectors whose
/// length differs from the width they were trained on.
pub trait RiskScorer {
    fn predict(&self, vector: &EncodedVector) -> AdvisorResult<f64>;

    fn predict_batch(&self, vectors: &[EncodedVector]) -> AdvisorResult<Vec<f64>> {
        vectors.iter().map(|v| self.predict(v)).collect()
    }
}

enum Inner {
    Trees(GBDT),
    /// Single-class training set: always predict that class
    Constant(f64),
}

/// Gradient-boosted risk model, immutable once trained
pub struct GbdtRiskModel {
    inner: Inner,
    width: usize,
}

impl GbdtRiskModel {
    /// Train a model from encoded vectors and labels (`true` = bug).
    ///
    /// Training is deterministic: gbdt samples every row and feature.
    pub fn train(
        vectors: &[EncodedVector],
        labels: &[bool],
        config: &ModelConfig,
    ) -> AdvisorResult<Self> {
        if vectors.is_empty() {
            return Err(AdvisorError::EmptyDataset);
        }
        if vectors.len() != labels.len() {
            return Err(AdvisorError::Training(format!(
                "vector count ({}) does not match label count ({})",
                vectors.len(),
                labels.len()
            )));
        }

        let width = vectors[0].len();
        if width == 0 {
            return Err(AdvisorError::SchemaMismatch(
                "no feature columns to train on".to_string(),
            ));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != width) {
            return Err(AdvisorError::SchemaMismatch(format!(
                "expected {} components, got {}",
                width,
                bad.len()
            )));
        }

        let positives = labels.iter().filter(|&&l| l).count();
        let negatives = labels.len() - positives;
        if positives == 0 || negatives == 0 {
            let constant = if positives == 0 { 0.0 } else { 1.0 };
            warn!(
                "Training data has a single class; predicting a constant risk of {}",
                constant
            );
            return Ok(Self {
                inner: Inner::Constant(constant),
                width,
            });
        }

        let (pos_weight, neg_weight) = if config.balance_classes {
            let n = labels.len() as f32;
            (n / (2.0 * positives as f32), n / (2.0 * negatives as f32))
        } else {
            (1.0, 1.0)
        };

        let mut cfg = Config::new();
        cfg.set_feature_size(width);
        cfg.set_max_depth(config.max_depth);
        cfg.set_iterations(config.trees);
        cfg.set_shrinkage(config.learning_rate as f32);
        cfg.set_loss("LogLikelyhood");
        cfg.set_debug(false);
        cfg.set_training_optimization_level(2);
        cfg.set_min_leaf_size(config.min_leaf_size.max(1));
        cfg.set_data_sample_ratio(1.0);
        cfg.set_feature_sample_ratio(1.0);

        let mut gbdt = GBDT::new(&cfg);

        let mut training_data: Vec<Data> = vectors
            .iter()
            .zip(labels.iter())
            .map(|(v, &bug)| {
                let (label, weight) = if bug {
                    (1.0_f32, pos_weight)
                } else {
                    (-1.0_f32, neg_weight)
                };
                Data::new_training_data(vector_to_f32(v), weight, label, None)
            })
            .collect();

        debug!(
            "Fitting {} trees on {} rows ({} bug, {} clean), {} components",
            config.trees,
            vectors.len(),
            positives,
            negatives,
            width
        );
        gbdt.fit(&mut training_data);

        Ok(Self {
            inner: Inner::Trees(gbdt),
            width,
        })
    }

    /// Encoded vector width this model accepts
    pub fn width(&self) -> usize {
        self.width
    }

    /// `Some(p)` when the model degenerated to a constant predictor
    pub fn constant(&self) -> Option<f64> {
        match self.inner {
            Inner::Constant(p) => Some(p),
            Inner::Trees(_) => None,
        }
    }

    /// Fraction of rows where `(risk >= 0.5) == label`.
    ///
    /// `None` for an empty test set. Diagnostic only.
    pub fn accuracy(
        &self,
        vectors: &[EncodedVector],
        labels: &[bool],
    ) -> AdvisorResult<Option<f64>> {
        if vectors.is_empty() {
            return Ok(None);
        }
        let preds = self.predict_batch(vectors)?;
        let correct = preds
            .iter()
            .zip(labels)
            .filter(|(&p, &bug)| (p >= 0.5) == bug)
            .count();
        Ok(Some(correct as f64 / vectors.len() as f64))
    }

    fn check_width(&self, vector: &EncodedVector) -> AdvisorResult<()> {
        if vector.len() != self.width {
            return Err(AdvisorError::SchemaMismatch(format!(
                "model expects {} components, got {}",
                self.width,
                vector.len()
            )));
        }
        Ok(())
    }
}

impl RiskScorer for GbdtRiskModel {
    fn predict(&self, vector: &EncodedVector) -> AdvisorResult<f64> {
        self.check_width(vector)?;
        match &self.inner {
            Inner::Constant(p) => Ok(*p),
            Inner::Trees(model) => {
                let data = vec![Data::new_test_data(vector_to_f32(vector), None)];
                let preds = model.predict(&data);
                Ok(preds.first().copied().map(to_probability).unwrap_or(0.5))
            }
        }
    }

    fn predict_batch(&self, vectors: &[EncodedVector]) -> AdvisorResult<Vec<f64>> {
        if vectors.is_empty() {
            return Ok(Vec::new());
        }
        for v in vectors {
            self.check_width(v)?;
        }
        match &self.inner {
            Inner::Constant(p) => Ok(vec![*p; vectors.len()]),
            Inner::Trees(model) => {
                let data: Vec<Data> = vectors
                    .iter()
                    .map(|v| Data::new_test_data(vector_to_f32(v), None))
                    .collect();
                Ok(model.predict(&data).into_iter().map(to_probability).collect())
            }
        }
    }
}
