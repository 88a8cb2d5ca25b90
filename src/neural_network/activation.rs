use ndarray::{Array2, ArrayViewMut1, Axis, Zip};
use rayon::prelude::*;

/// Threshold for parallel computation (in number of elements)
/// For tensors with fewer elements, sequential computation is faster due to overhead
const ACTIVATION_PARALLEL_THRESHOLD: usize = 10_000;

/// Softmax rows are processed in parallel once the batch has more rows than this
const SOFTMAX_PARALLEL_ROWS: usize = 8;

/// Activation function applied by a dense layer after its affine transformation
///
/// # Variants
///
/// - `Linear` - Identity, `f(x) = x`
/// - `ReLU` - Rectified linear unit, `f(x) = max(0, x)`
/// - `Softmax` - Row-wise normalised exponential, turns logits into class probabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Linear,
    ReLU,
    Softmax,
}

impl Activation {
    /// Returns the lowercase name used in summaries (e.g. "relu").
    pub fn name(&self) -> &'static str {
        match self {
            Activation::Linear => "linear",
            Activation::ReLU => "relu",
            Activation::Softmax => "softmax",
        }
    }

    /// Forward application of activation functions
    ///
    /// # Parameters
    ///
    /// - `z` - Pre-activation values with shape \[batch_size, units\]
    /// - `activation` - The activation function to apply
    ///
    /// # Returns
    ///
    /// * `Array2<f32>` - A new tensor with the activation function applied
    pub fn apply_activation(z: &Array2<f32>, activation: &Activation) -> Array2<f32> {
        match activation {
            Activation::Linear => z.clone(),
            Activation::ReLU => {
                let mut result = z.clone();
                // NaN passes through unchanged
                if result.len() >= ACTIVATION_PARALLEL_THRESHOLD {
                    result.par_mapv_inplace(|x| if x < 0.0 { 0.0 } else { x });
                } else {
                    result.mapv_inplace(|x| if x < 0.0 { 0.0 } else { x });
                }
                result
            }
            Activation::Softmax => {
                let mut out = z.clone();
                // exp(x - max) keeps the largest exponent at 1
                let softmax_row = |mut row: ArrayViewMut1<f32>| {
                    let max_val = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
                    row.mapv_inplace(|x| (x - max_val).exp());
                    let sum = row.sum();
                    row.mapv_inplace(|x| x / sum);
                };

                if out.nrows() > SOFTMAX_PARALLEL_ROWS {
                    out.axis_iter_mut(Axis(0))
                        .into_par_iter()
                        .for_each(softmax_row);
                } else {
                    out.axis_iter_mut(Axis(0)).for_each(softmax_row);
                }
                out
            }
        }
    }

    /// Computes element-wise derivatives for Linear and ReLU given the activated output.
    ///
    /// Softmax has no element-wise derivative; its gradient is handled by
    /// `softmax_backward`, so ones are returned for it.
    ///
    /// # Parameters
    ///
    /// - `activation_output` - The output after activation function has been applied
    /// - `activation` - The activation function whose derivative to compute
    ///
    /// # Returns
    ///
    /// * `Array2<f32>` - A tensor containing the derivative values
    pub fn activation_derivative(
        activation_output: &Array2<f32>,
        activation: &Activation,
    ) -> Array2<f32> {
        match activation {
            Activation::ReLU => activation_output.mapv(|a| if a > 0.0 { 1.0 } else { 0.0 }),
            Activation::Linear | Activation::Softmax => Array2::ones(activation_output.dim()),
        }
    }

    /// Backward propagation for Softmax activation
    ///
    /// For each row, computes:
    /// new_grad\[i\] = a\[i\] * (upstream\[i\] - sum_j(a\[j\]*upstream\[j\]))
    ///
    /// # Parameters
    ///
    /// - `a` - The output from the softmax activation
    /// - `upstream` - The gradient flowing from the next layer
    ///
    /// # Returns
    ///
    /// * `Array2<f32>` - The gradient with respect to the input of the softmax function
    pub fn softmax_backward(a: &Array2<f32>, upstream: &Array2<f32>) -> Array2<f32> {
        let mut result = Array2::<f32>::zeros(a.raw_dim());

        Zip::from(result.axis_iter_mut(Axis(0)))
            .and(a.axis_iter(Axis(0)))
            .and(upstream.axis_iter(Axis(0)))
            .par_for_each(|mut out_row, a_row, up_row| {
                let dot = a_row
                    .iter()
                    .zip(up_row.iter())
                    .map(|(&ai, &gi)| ai * gi)
                    .sum::<f32>();

                for (j, r) in out_row.iter_mut().enumerate() {
                    *r = a_row[j] * (up_row[j] - dot);
                }
            });

        result
    }
}

impl std::fmt::Display for Activation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
