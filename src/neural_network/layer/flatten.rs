use super::validate_input_shape;
use crate::error::ModelError;
use crate::neural_network::layer::{LayerWeight, TrainingParameters};
use crate::neural_network::{Layer, Tensor};
use ndarray::IxDyn;

/// A layer that flattens every sample into a single feature vector.
///
/// Typically the first layer of an image classifier, turning a batch of `H×W`
/// images into the 2D input a `Dense` layer consumes. It has no parameters.
///
/// # Input shape
///
/// \[batch_size, d1, d2, ...\], where `[d1, d2, ...]` is the shape given to `new`
///
/// # Output shape
///
/// \[batch_size, d1 * d2 * ...\]
///
/// # Example
///
/// ```rust
/// use mlp_trainer::prelude::*;
/// use ndarray::Array3;
///
/// // Two 28x28 images
/// let x = Array3::<f32>::zeros((2, 28, 28)).into_dyn();
///
/// let mut flatten = Flatten::new(vec![28, 28]).unwrap();
/// let out = flatten.forward(&x).unwrap();
/// assert_eq!(out.shape(), &[2, 784]);
/// ```
pub struct Flatten {
    input_shape: Vec<usize>,
    features: usize,
    input_cache: Option<Vec<usize>>,
}

impl Flatten {
    /// Creates a new Flatten layer.
    ///
    /// # Parameters
    ///
    /// * `input_shape` - Per-sample input shape, batch axis excluded (e.g. `vec![28, 28]`)
    ///
    /// # Returns
    ///
    /// - `Ok(Flatten)` - A new `Flatten` layer instance
    /// - `Err(ModelError::ShapeError)` - If the shape is empty or has a zero dimension
    pub fn new(input_shape: Vec<usize>) -> Result<Self, ModelError> {
        if input_shape.is_empty() || input_shape.contains(&0) {
            return Err(ModelError::ShapeError(format!(
                "Flatten input shape must be non-empty with positive dimensions, got {:?}",
                input_shape
            )));
        }
        let features = input_shape.iter().product();
        Ok(Flatten {
            input_shape,
            features,
            input_cache: None,
        })
    }

    fn reshape(&self, input: &Tensor) -> Result<Tensor, ModelError> {
        let batch_size = validate_input_shape(self.layer_type(), &self.input_shape, input)?;
        input
            .as_standard_layout()
            .into_owned()
            .into_shape_with_order(IxDyn(&[batch_size, self.features]))
            .map_err(|e| ModelError::ShapeError(e.to_string()))
    }
}

impl Layer for Flatten {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, ModelError> {
        let output = self.reshape(input)?;
        self.input_cache = Some(input.shape().to_vec());
        Ok(output)
    }

    fn predict(&self, input: &Tensor) -> Result<Tensor, ModelError> {
        self.reshape(input)
    }

    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, ModelError> {
        let input_shape = self.input_cache.as_ref().ok_or_else(|| {
            ModelError::ProcessingError("Forward pass has not been run".to_string())
        })?;

        grad_output
            .as_standard_layout()
            .into_owned()
            .into_shape_with_order(IxDyn(input_shape))
            .map_err(|e| {
                ModelError::ShapeError(format!(
                    "Cannot reshape gradient {:?} back to {:?}: {}",
                    grad_output.shape(),
                    input_shape,
                    e
                ))
            })
    }

    fn layer_type(&self) -> &str {
        "Flatten"
    }

    fn input_shape(&self) -> &[usize] {
        &self.input_shape
    }

    fn output_shape(&self) -> Vec<usize> {
        vec![self.features]
    }

    fn param_count(&self) -> TrainingParameters {
        TrainingParameters::NoTrainable
    }

    fn get_weights(&self) -> LayerWeight<'_> {
        LayerWeight::Empty
    }
}
