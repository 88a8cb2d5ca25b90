use ndarray::Array2;

/// Container for the weights of the different layer kinds
///
/// # Variants
///
/// - `Dense` - Contains weights for dense (fully connected) layers
/// - `Empty` - Represents a layer with no trainable parameters
pub enum LayerWeight<'a> {
    Dense(DenseLayerWeight<'a>),
    Empty,
}

/// Weights for a dense (fully connected) neural network layer
///
/// # Fields
///
/// - `weight` - Weight matrix with shape (input_features, output_features)
/// - `bias` - Bias vector with shape (1, output_features)
pub struct DenseLayerWeight<'a> {
    pub weight: &'a Array2<f32>,
    pub bias: &'a Array2<f32>,
}

/// A trainable parameter together with the gradient from the last backward pass
///
/// # Fields
///
/// - `name` - Slot name inside the layer (e.g. "kernel", "bias")
/// - `value` - The parameter, mutated in place by the optimizer
/// - `grad` - Gradient of the loss with respect to `value`, `None` before the first backward pass
pub struct Parameter<'a> {
    pub name: &'static str,
    pub value: &'a mut Array2<f32>,
    pub grad: Option<&'a Array2<f32>>,
}

impl Parameter<'_> {
    /// Returns `false` only when a gradient exists and holds NaN or infinity.
    pub fn grad_is_finite(&self) -> bool {
        self.grad
            .map(|g| g.iter().all(|v| v.is_finite()))
            .unwrap_or(true)
    }
}
