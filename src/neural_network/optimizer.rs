use crate::error::ModelError;
use ndarray::Array2;

/// AdaGrad (Adaptive Gradient Algorithm) optimizer
pub mod ada_grad;
/// Adam (Adaptive Moment Estimation) optimizer
pub mod adam;
/// Hyper-parameter validation shared by all optimizers
pub(crate) mod input_validation_function;
/// RMSprop (Root Mean Square Propagation) optimizer
pub mod rms_prop;
/// SGD (Stochastic Gradient Descent) optimizer
pub mod sgd;

pub use ada_grad::*;
pub use adam::*;
pub use rms_prop::*;
pub use sgd::*;

/// Threshold for switching between sequential and parallel computation.
/// For arrays smaller than this threshold, sequential computation is used
/// to avoid parallelization overhead.
const OPTIMIZER_PARALLEL_THRESHOLD: usize = 1024;

/// Identifies one trainable parameter inside a network
///
/// # Fields
///
/// - `layer` - Index of the layer in the network
/// - `slot` - Index of the parameter inside the layer (0 = kernel, 1 = bias for dense layers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParameterKey {
    pub layer: usize,
    pub slot: usize,
}

impl ParameterKey {
    pub fn new(layer: usize, slot: usize) -> Self {
        Self { layer, slot }
    }
}

/// Checks that a gradient matches its parameter before an update.
///
/// # Returns
///
/// - `Ok(())` - Shapes agree
/// - `Err(ModelError::DimensionError)` - Shapes differ
fn validate_gradient_shape(
    key: ParameterKey,
    param: &Array2<f32>,
    grad: &Array2<f32>,
) -> Result<(), ModelError> {
    if param.dim() != grad.dim() {
        return Err(ModelError::DimensionError(format!(
            "gradient shape {:?} does not match parameter shape {:?} (layer {}, slot {})",
            grad.shape(),
            param.shape(),
            key.layer,
            key.slot
        )));
    }
    Ok(())
}
