use super::{EPSILON, validate_predictions};
use crate::error::ModelError;
use crate::neural_network::{LossFunction, Tensor};
use ndarray::{Array1, Array2};

/// Sparse Categorical Cross Entropy loss function for multi-class classification
/// where true labels are class indices instead of one-hot vectors.
///
/// `loss = -mean_i(ln p[i, label_i])`, with probabilities clipped to
/// `[1e-7, 1 - 1e-7]` so the logarithm is always finite.
///
/// # Example
/// ```rust
/// use mlp_trainer::prelude::*;
/// use ndarray::{array, Array1};
///
/// let probs = array![[0.9, 0.1], [0.2, 0.8]].into_dyn();
/// let labels = Array1::from(vec![0usize, 1]);
///
/// let loss = SparseCategoricalCrossEntropy::new()
///     .compute_loss(&labels, &probs)
///     .unwrap();
/// assert!(loss > 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseCategoricalCrossEntropy;

impl SparseCategoricalCrossEntropy {
    /// Creates a new instance of SparseCategoricalCrossEntropy
    pub fn new() -> Self {
        Self
    }
}

impl LossFunction for SparseCategoricalCrossEntropy {
    fn compute_loss(&self, y_true: &Array1<usize>, y_pred: &Tensor) -> Result<f32, ModelError> {
        let pred = validate_predictions(y_true, y_pred)?;
        let batch_size = pred.nrows();

        // Sequential sum keeps the result bit-identical across runs
        let total_loss: f32 = y_true
            .iter()
            .enumerate()
            .map(|(i, &class_idx)| -pred[[i, class_idx]].clamp(EPSILON, 1.0 - EPSILON).ln())
            .sum();

        Ok(total_loss / batch_size as f32)
    }

    fn compute_grad(&self, y_true: &Array1<usize>, y_pred: &Tensor) -> Result<Tensor, ModelError> {
        let pred = validate_predictions(y_true, y_pred)?;
        let batch_size = pred.nrows() as f32;

        let mut grad = Array2::<f32>::zeros(pred.raw_dim());
        for (i, &class_idx) in y_true.iter().enumerate() {
            let p = pred[[i, class_idx]].clamp(EPSILON, 1.0 - EPSILON);
            grad[[i, class_idx]] = -1.0 / (p * batch_size);
        }

        Ok(grad.into_dyn())
    }

    /// `(p - one_hot(label)) / batch_size`, the gradient of softmax followed by
    /// cross entropy with respect to the softmax input.
    fn softmax_logits_grad(
        &self,
        y_true: &Array1<usize>,
        y_pred: &Tensor,
    ) -> Option<Result<Tensor, ModelError>> {
        Some(validate_predictions(y_true, y_pred).map(|pred| {
            let batch_size = pred.nrows() as f32;
            let mut grad = pred.to_owned();
            for (i, &class_idx) in y_true.iter().enumerate() {
                grad[[i, class_idx]] -= 1.0;
            }
            grad.mapv_inplace(|g| g / batch_size);
            grad.into_dyn()
        }))
    }

    fn expects_probabilities(&self) -> bool {
        true
    }
}
