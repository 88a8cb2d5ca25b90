use crate::error::ModelError;
use crate::neural_network::Tensor;
use ndarray::prelude::*;
use rayon::prelude::*;

/// Row count above which `argmax_rows` scans rows in parallel
const ARGMAX_PARALLEL_THRESHOLD: usize = 256;

fn scores_2d(scores: &Tensor) -> Result<ArrayView2<'_, f32>, ModelError> {
    scores
        .view()
        .into_dimensionality::<Ix2>()
        .map_err(|_| {
            ModelError::ShapeError(format!(
                "expected scores of shape [batch_size, num_classes], got {:?}",
                scores.shape()
            ))
        })
}

fn argmax(row: ArrayView1<f32>) -> usize {
    // strict `>` keeps the first index on ties
    let mut best = 0;
    for (i, &value) in row.iter().enumerate() {
        if value > row[best] {
            best = i;
        }
    }
    best
}

/// Returns the index of the largest score in every row.
///
/// Ties resolve to the lowest index.
///
/// # Parameters
///
/// * `scores` - Class scores or probabilities with shape `[batch_size, num_classes]`
///
/// # Examples
/// ```rust
/// use mlp_trainer::metric::argmax_rows;
/// use ndarray::array;
///
/// let probabilities = array![[0.1_f32, 0.7, 0.2], [0.5, 0.5, 0.0]].into_dyn();
/// let classes = argmax_rows(&probabilities).unwrap();
/// assert_eq!(classes, array![1, 0]);
/// ```
///
/// # Returns
///
/// - `Ok(Array1<usize>)` - Predicted class per row
/// - `Err(ModelError::ShapeError)` - If `scores` is not 2D or has no columns
pub fn argmax_rows(scores: &Tensor) -> Result<Array1<usize>, ModelError> {
    let scores = scores_2d(scores)?;
    if scores.ncols() == 0 {
        return Err(ModelError::ShapeError(
            "scores must have at least one class column".to_string(),
        ));
    }

    let classes: Vec<usize> = if scores.nrows() > ARGMAX_PARALLEL_THRESHOLD {
        scores
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(argmax)
            .collect()
    } else {
        scores.axis_iter(Axis(0)).map(argmax).collect()
    };
    Ok(Array1::from(classes))
}

/// Counts the rows whose argmax equals the label.
///
/// # Returns
///
/// - `Ok(usize)` - Number of correctly classified samples
/// - `Err(ModelError::ShapeError)` - If the batch sizes differ or `y_pred` is not 2D
pub fn correct_count(y_true: &Array1<usize>, y_pred: &Tensor) -> Result<usize, ModelError> {
    let predicted = argmax_rows(y_pred)?;
    if predicted.len() != y_true.len() {
        return Err(ModelError::ShapeError(format!(
            "predictions have {} rows but there are {} labels",
            predicted.len(),
            y_true.len()
        )));
    }
    Ok(predicted
        .iter()
        .zip(y_true.iter())
        .filter(|(p, t)| p == t)
        .count())
}

/// Calculate the classification accuracy of a batch of predictions.
///
/// Accuracy is the proportion of rows whose most probable class equals the label.
///
/// # Parameters
///
/// - `y_true` - Ground-truth class index per sample
/// - `y_pred` - Predicted probabilities with shape `[batch_size, num_classes]`
///
/// # Examples
/// ```rust
/// use mlp_trainer::metric::accuracy;
/// use ndarray::array;
///
/// let labels = array![1, 0, 2];
/// let probabilities = array![[0.1_f32, 0.9, 0.0], [0.8, 0.1, 0.1], [0.6, 0.2, 0.2]].into_dyn();
/// let acc = accuracy(&labels, &probabilities).unwrap();
/// assert!((acc - 2.0 / 3.0).abs() < 1e-6);
/// ```
///
/// # Returns
///
/// - `Ok(f32)` - Accuracy in the range \[0.0, 1.0\]
/// - `Err(ModelError::ShapeError)` - If the batch is empty or the batch sizes differ
pub fn accuracy(y_true: &Array1<usize>, y_pred: &Tensor) -> Result<f32, ModelError> {
    if y_true.is_empty() {
        return Err(ModelError::ShapeError(
            "cannot compute accuracy of an empty batch".to_string(),
        ));
    }
    let correct = correct_count(y_true, y_pred)?;
    Ok(correct as f32 / y_true.len() as f32)
}
