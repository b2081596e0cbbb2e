//! Training for the commit risk model
//!
//! Freezes the encoding schema, splits the dataset, fits the model on the
//! training side and measures accuracy on the held-out side.

use super::gbdt_model::GbdtRiskModel;
use super::schema::{EncodedVector, EncodingSchema};
use super::split::train_test_split;
use crate::config::ModelConfig;
use crate::dataset::Dataset;
use crate::error::AdvisorResult;
use tracing::info;

/// Training result
pub struct TrainResult {
    /// Schema frozen from the full dataset
    pub schema: EncodingSchema,
    pub model: GbdtRiskModel,
    /// Encoded training rows (reused for importances)
    pub train_vectors: Vec<EncodedVector>,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Held-out accuracy, `None` when nothing was held out
    pub accuracy: Option<f64>,
}

/// Train a risk model on a dataset
pub fn train(dataset: &Dataset, config: &ModelConfig) -> AdvisorResult<TrainResult> {
    let schema = EncodingSchema::from_dataset(dataset);
    let vectors = schema.encode_all(dataset.rows())?;
    let labels = dataset.labels();

    let split = train_test_split(dataset.len(), config.test_fraction, config.seed);
    let pick = |idx: &[usize]| -> (Vec<EncodedVector>, Vec<bool>) {
        idx.iter().map(|&i| (vectors[i].clone(), labels[i])).unzip()
    };
    let (train_vectors, train_labels) = pick(&split.train);
    let (test_vectors, test_labels) = pick(&split.test);

    info!(
        "Training: {} rows, Test: {} rows, {} encoded components",
        train_vectors.len(),
        test_vectors.len(),
        schema.width()
    );

    let model = GbdtRiskModel::train(&train_vectors, &train_labels, config)?;
    let accuracy = model.accuracy(&test_vectors, &test_labels)?;

    if let Some(acc) = accuracy {
        info!("Held-out accuracy: {:.2}%", acc * 100.0);
    }

    Ok(TrainResult {
        schema,
        train_rows: train_vectors.len(),
        test_rows: test_vectors.len(),
        train_vectors,
        model,
        accuracy,
    })
}
