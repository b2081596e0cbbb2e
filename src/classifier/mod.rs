//! Commit risk classifier
//!
//! Encodes commit records into fixed-width vectors and trains a
//! gradient-boosted tree model that estimates the probability a commit
//! introduces a bug.
//!
//! Architecture: CSV rows → one-hot schema → GBDT (LogLikelyhood) → risk
//!
//! The model is treated as a black box behind [`RiskScorer`]; everything
//! downstream (importances, neighborhood search) only needs `predict`.

pub mod gbdt_model;
pub mod importance;
pub mod schema;
pub mod split;
pub mod train;

pub use gbdt_model::{GbdtRiskModel, RiskScorer};
pub use importance::{aggregate_by_feature, permutation_importance, FeatureImportance};
pub use schema::{EncodedVector, EncodingSchema, FeatureKind, FeatureSpec, NumericKind};
pub use split::{train_test_split, Split};
pub use train::{train, TrainResult};
