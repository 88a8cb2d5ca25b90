use crate::dataset::Partition;
use crate::error::ModelError;
use crate::metric::correct_count;
use crate::neural_network::{LossFunction, Sequential};
use serde::Serialize;

/// Aggregated loss and accuracy of a network over a whole partition
///
/// # Fields
///
/// - `loss` - Sample-weighted mean loss
/// - `accuracy` - Correctly classified samples divided by `samples`
/// - `samples` - Number of samples evaluated
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub loss: f32,
    pub accuracy: f32,
    pub samples: usize,
}

/// Forward-only sweep shared by `Evaluator` and the trainer's validation phase.
///
/// Batch losses are weighted by batch size so a smaller final batch does not skew
/// the mean. Nothing is cached in the layers.
pub(crate) fn evaluate_partition<L: LossFunction + ?Sized>(
    network: &Sequential,
    partition: &Partition,
    loss_fn: &L,
    batch_size: usize,
) -> Result<Evaluation, ModelError> {
    if partition.is_empty() {
        return Err(ModelError::ShapeError(
            "cannot evaluate an empty partition".to_string(),
        ));
    }

    let mut weighted_loss = 0.0_f64;
    let mut correct = 0_usize;
    for batch in partition.batches(batch_size) {
        let probabilities = network.predict(&batch.images)?;
        let batch_loss = loss_fn.compute_loss(&batch.labels, &probabilities)?;
        if !batch_loss.is_finite() {
            return Err(ModelError::numeric(format!(
                "loss is {} on evaluation batch {}",
                batch_loss, batch.index
            )));
        }
        weighted_loss += batch_loss as f64 * batch.len() as f64;
        correct += correct_count(&batch.labels, &probabilities)?;
    }

    let samples = partition.len();
    Ok(Evaluation {
        loss: (weighted_loss / samples as f64) as f32,
        accuracy: correct as f32 / samples as f32,
        samples,
    })
}

/// Scores a trained network on a held-out partition.
///
/// Predictions run in batches of `batch_size` through `Sequential::predict`, so evaluating
/// never changes the network and repeated calls give identical results.
///
/// # Example
/// ```rust
/// use mlp_trainer::prelude::*;
/// use ndarray::{Array1, Array3};
///
/// let mut model = Sequential::new();
/// model
///     .add(Flatten::new(vec![2, 2]).unwrap())
///     .unwrap()
///     .add(Dense::from_parameters(
///         ndarray::Array2::zeros((4, 3)),
///         ndarray::Array2::zeros((1, 3)),
///         Activation::Softmax,
///     ).unwrap())
///     .unwrap();
///
/// let test = Partition::from_raw_pixels(
///     &Array3::<u8>::zeros((5, 2, 2)),
///     Array1::from(vec![0usize; 5]),
/// ).unwrap();
///
/// let evaluator = Evaluator::new(SparseCategoricalCrossEntropy::new(), 2).unwrap();
/// let result = evaluator.evaluate(&model, &test).unwrap();
/// assert_eq!(result.samples, 5);
/// assert!((result.loss - 3.0_f32.ln()).abs() < 1e-5);
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator<L: LossFunction> {
    loss: L,
    batch_size: usize,
}

impl<L: LossFunction> Evaluator<L> {
    /// Creates an evaluator.
    ///
    /// # Parameters
    ///
    /// - `loss` - Loss function reported alongside accuracy
    /// - `batch_size` - Number of samples predicted at once
    ///
    /// # Returns
    ///
    /// - `Ok(Evaluator)` - The evaluator
    /// - `Err(ModelError::ConfigError)` - If `batch_size` is zero
    pub fn new(loss: L, batch_size: usize) -> Result<Self, ModelError> {
        if batch_size == 0 {
            return Err(ModelError::ConfigError(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        Ok(Self { loss, batch_size })
    }

    /// Computes loss and accuracy of `network` over `partition`.
    ///
    /// # Returns
    ///
    /// - `Ok(Evaluation)` - Aggregated metrics
    /// - `Err(ModelError::ShapeError)` - If the partition is empty or does not match the network
    /// - `Err(ModelError::NumericError)` - If the network produces NaN or infinite values
    pub fn evaluate(
        &self,
        network: &Sequential,
        partition: &Partition,
    ) -> Result<Evaluation, ModelError> {
        let evaluation = evaluate_partition(network, partition, &self.loss, self.batch_size)?;
        log::info!(
            "Evaluated {} samples: loss {:.4}, accuracy {:.4}",
            evaluation.samples,
            evaluation.loss,
            evaluation.accuracy
        );
        Ok(evaluation)
    }
}
