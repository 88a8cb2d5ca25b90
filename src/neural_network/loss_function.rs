use crate::error::ModelError;
use crate::neural_network::Tensor;
use ndarray::{Array1, ArrayView2, Ix2};

/// Sparse Categorical Cross Entropy loss function for multi-class classification
pub mod sparse_categorical_cross_entropy;

pub use sparse_categorical_cross_entropy::*;

/// Probabilities are clipped into `[EPSILON, 1 - EPSILON]` before taking logarithms
pub const EPSILON: f32 = 1e-7;

/// Validates a batch of class probabilities against its labels.
///
/// # Returns
///
/// - `Ok(ArrayView2<f32>)` - The predictions viewed as `[batch_size, num_classes]`
/// - `Err(ModelError::ShapeError)` - On rank, batch size or label range mismatch
/// - `Err(ModelError::NumericError)` - If any prediction is NaN or infinite
fn validate_predictions<'a>(
    y_true: &Array1<usize>,
    y_pred: &'a Tensor,
) -> Result<ArrayView2<'a, f32>, ModelError> {
    let pred = y_pred.view().into_dimensionality::<Ix2>().map_err(|_| {
        ModelError::ShapeError(format!(
            "predictions must have shape [batch_size, num_classes], got {:?}",
            y_pred.shape()
        ))
    })?;

    let (batch_size, num_classes) = pred.dim();
    if batch_size == 0 {
        return Err(ModelError::ShapeError(
            "cannot compute a loss over an empty batch".to_string(),
        ));
    }
    if y_true.len() != batch_size {
        return Err(ModelError::ShapeError(format!(
            "Batch size mismatch: predictions have {} samples, labels have {}",
            batch_size,
            y_true.len()
        )));
    }
    if let Some(&label) = y_true.iter().find(|&&label| label >= num_classes) {
        return Err(ModelError::ShapeError(format!(
            "label {} is out of range for {} classes",
            label, num_classes
        )));
    }
    if pred.iter().any(|p| !p.is_finite()) {
        return Err(ModelError::numeric(
            "predictions contain NaN or infinite values",
        ));
    }

    Ok(pred)
}
