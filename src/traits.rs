use crate::error::ModelError;
use crate::neural_network::Tensor;
use crate::neural_network::activation::Activation;
use crate::neural_network::layer::TrainingParameters;
use crate::neural_network::layer::layer_weight::{LayerWeight, Parameter};
use crate::neural_network::optimizer::ParameterKey;
use ndarray::{Array1, Array2};

/// Defines the interface for neural network layers.
///
/// This trait provides the core functionality that all neural network layers must implement:
/// a caching forward pass used during training, a non-caching forward pass used for inference,
/// backward propagation, and access to trainable parameters for the optimizer.
pub trait Layer: Send + Sync {
    /// Performs forward propagation through the layer.
    ///
    /// Intermediate values needed by `backward` are cached and overwritten on every call.
    ///
    /// # Parameters
    ///
    /// - `input` - The input tensor to the layer, batch axis first
    ///
    /// # Returns
    ///
    /// - `Ok(Tensor)` - The output tensor after forward computation
    /// - `Err(ModelError::ShapeError)` - If the input does not match the layer's input shape
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, ModelError>;

    /// Performs forward propagation without caching anything.
    ///
    /// # Parameters
    ///
    /// - `input` - The input tensor to the layer, batch axis first
    ///
    /// # Returns
    ///
    /// - `Ok(Tensor)` - The output tensor after forward computation
    /// - `Err(ModelError::ShapeError)` - If the input does not match the layer's input shape
    fn predict(&self, input: &Tensor) -> Result<Tensor, ModelError>;

    /// Performs backward propagation through the layer.
    ///
    /// # Parameters
    ///
    /// - `grad_output` - The gradient of the loss with respect to this layer's output
    ///
    /// # Returns
    ///
    /// - `Ok(Tensor)` - The gradient tensor to be passed to the previous layer
    /// - `Err(ModelError)` - If the layer encountered an error during processing
    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, ModelError>;

    /// Performs backward propagation given the gradient with respect to the
    /// pre-activation values of a softmax output layer.
    ///
    /// Only layers ending in a softmax activation support this; the default
    /// implementation returns `ModelError::ProcessingError`.
    ///
    /// # Parameters
    ///
    /// - `grad_logits` - Gradient of the loss with respect to the softmax input
    ///
    /// # Returns
    ///
    /// - `Ok(Tensor)` - The gradient tensor to be passed to the previous layer
    /// - `Err(ModelError)` - If the layer does not end in a softmax
    fn backward_from_logits(&mut self, _grad_logits: &Tensor) -> Result<Tensor, ModelError> {
        Err(ModelError::ProcessingError(format!(
            "{} layer does not end in a softmax activation",
            self.layer_type()
        )))
    }

    /// Returns the type name of the layer (e.g. "Dense").
    fn layer_type(&self) -> &str;

    /// Returns the per-sample shape this layer expects (batch axis excluded).
    fn input_shape(&self) -> &[usize];

    /// Returns the per-sample shape this layer produces (batch axis excluded).
    fn output_shape(&self) -> Vec<usize>;

    /// Returns the activation applied by the layer, if it has one.
    fn activation(&self) -> Option<Activation> {
        None
    }

    /// Returns the total number of parameters in the layer.
    ///
    /// # Returns
    ///
    /// - `TrainingParameters` - The count of parameters as an enum variant
    fn param_count(&self) -> TrainingParameters;

    /// Returns every trainable parameter paired with its most recent gradient.
    ///
    /// Gradients are `None` until `backward` has run.
    fn parameters(&mut self) -> Vec<Parameter<'_>> {
        Vec::new()
    }

    /// Returns a reference to all weights in the layer.
    ///
    /// # Returns
    ///
    /// - `LayerWeight<'_>` - `LayerWeight::Dense` for dense layers, `LayerWeight::Empty` otherwise
    fn get_weights(&self) -> LayerWeight<'_>;
}

/// Defines the interface for classification loss functions used in training.
///
/// Labels are class indices; predictions are per-class probabilities with shape
/// `[batch_size, num_classes]`.
pub trait LossFunction: Send + Sync {
    /// Computes the mean loss over the batch.
    ///
    /// # Parameters
    ///
    /// - `y_true` - Class index of every sample in the batch
    /// - `y_pred` - Predicted class probabilities
    ///
    /// # Returns
    ///
    /// - `Ok(f32)` - The scalar loss value
    /// - `Err(ModelError)` - On shape mismatch or non-finite predictions
    fn compute_loss(&self, y_true: &Array1<usize>, y_pred: &Tensor) -> Result<f32, ModelError>;

    /// Computes the gradient of the loss with respect to the predicted probabilities.
    ///
    /// # Parameters
    ///
    /// - `y_true` - Class index of every sample in the batch
    /// - `y_pred` - Predicted class probabilities
    ///
    /// # Returns
    ///
    /// - `Ok(Tensor)` - Gradient with the same shape as `y_pred`
    /// - `Err(ModelError)` - On shape mismatch or non-finite predictions
    fn compute_grad(&self, y_true: &Array1<usize>, y_pred: &Tensor) -> Result<Tensor, ModelError>;

    /// Computes the gradient with respect to the logits of a softmax output, when the
    /// loss has a closed form for it.
    ///
    /// Returns `None` when no such closed form exists.
    fn softmax_logits_grad(
        &self,
        _y_true: &Array1<usize>,
        _y_pred: &Tensor,
    ) -> Option<Result<Tensor, ModelError>> {
        None
    }

    /// Returns `true` when every row of `y_pred` must be a probability distribution,
    /// i.e. the network should end in a softmax.
    fn expects_probabilities(&self) -> bool {
        false
    }
}

/// Defines the interface for optimization algorithms.
///
/// An optimizer receives one (parameter, gradient) pair at a time and mutates the
/// parameter in place. Any per-parameter state is keyed by `ParameterKey`.
pub trait Optimizer: Send {
    /// Updates one parameter from its gradient.
    ///
    /// # Parameters
    ///
    /// - `key` - Identifies the parameter so stateful optimizers can keep per-parameter state
    /// - `param` - The parameter to update in place
    /// - `grad` - The gradient of the loss with respect to `param`
    /// - `learning_rate` - Step size for this update
    ///
    /// # Returns
    ///
    /// - `Ok(())` - The parameter was updated
    /// - `Err(ModelError::DimensionError)` - If `grad` and `param` shapes differ
    fn update(
        &mut self,
        key: ParameterKey,
        param: &mut Array2<f32>,
        grad: &Array2<f32>,
        learning_rate: f32,
    ) -> Result<(), ModelError>;

    /// Returns the name of the optimizer (e.g. "SGD").
    fn name(&self) -> &str;
}
