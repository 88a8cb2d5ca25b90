use crate::error::ModelError;
use crate::neural_network::Tensor;

/// Dense (fully connected) layer
pub mod dense;
/// Flatten layer collapsing per-sample dimensions
pub mod flatten;
/// Weight initialisation schemes for dense layers
pub mod initializer;
/// Borrowed views of layer weights and trainable parameters
pub mod layer_weight;

pub use dense::*;
pub use flatten::*;
pub use initializer::*;
pub use layer_weight::*;

/// Number of parameters held by a layer, split by whether the optimizer updates them
///
/// # Variants
///
/// - `Trainable` - Parameters updated by the optimizer
/// - `NonTrainable` - Parameters held by the layer but never updated
/// - `NoTrainable` - The layer holds no parameters at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingParameters {
    Trainable(usize),
    NonTrainable(usize),
    NoTrainable,
}

impl TrainingParameters {
    /// Returns the raw parameter count regardless of trainability.
    pub fn count(&self) -> usize {
        match self {
            TrainingParameters::Trainable(n) | TrainingParameters::NonTrainable(n) => *n,
            TrainingParameters::NoTrainable => 0,
        }
    }
}

/// Formats a per-sample shape Keras-style with an unknown batch axis, e.g. `(None, 784)`.
pub fn format_output_shape(sample_shape: &[usize]) -> String {
    let dims = sample_shape
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("(None, {})", dims)
}

/// Checks that `input` is a batch of samples with shape `expected`.
///
/// # Returns
///
/// - `Ok(usize)` - The batch size
/// - `Err(ModelError::ShapeError)` - If the rank or any per-sample dimension differs
fn validate_input_shape(
    layer_type: &str,
    expected: &[usize],
    input: &Tensor,
) -> Result<usize, ModelError> {
    let shape = input.shape();
    if shape.len() != expected.len() + 1 {
        return Err(ModelError::ShapeError(format!(
            "{} layer expects rank {} input [batch, {:?}], got shape {:?}",
            layer_type,
            expected.len() + 1,
            expected,
            shape
        )));
    }
    if &shape[1..] != expected {
        return Err(ModelError::ShapeError(format!(
            "{} layer expects per-sample shape {:?}, got {:?}",
            layer_type,
            expected,
            &shape[1..]
        )));
    }
    if shape[0] == 0 {
        return Err(ModelError::ShapeError(format!(
            "{} layer received an empty batch",
            layer_type
        )));
    }
    Ok(shape[0])
}
