use super::validate_input_shape;
use crate::error::ModelError;
use crate::neural_network::layer::{
    DenseLayerWeight, Initializer, LayerWeight, Parameter, TrainingParameters,
};
use crate::neural_network::{Activation, Layer, Tensor};
use ndarray::{Array2, Axis, Ix2};
use ndarray_rand::rand::Rng;

/// Dense (Fully Connected) layer implementation for neural networks.
///
/// This layer performs a linear transformation of the input data using a weight matrix and bias vector,
/// followed by an activation function: `output = activation(input · weights + bias)`.
///
/// Weights are initialised with the chosen `Initializer` (Glorot uniform by default) from an
/// explicitly supplied random number generator; biases start at zero.
///
/// # Dimensions
///
/// - Input shape: (batch_size, input_dim)
/// - Output shape: (batch_size, output_dim)
///
/// # Fields
/// ## Core fields
/// - `input_dim` - Input dimension size
/// - `output_dim` - Output dimension size
/// - `weights` - Weight matrix with shape (input_dim, output_dim)
/// - `bias` - Bias vector with shape (1, output_dim)
/// - `activation` - Activation function for the layer
///
/// ## Cache
/// - `input_cache` - Input from the last forward pass, used in backward pass
/// - `activation_output` - Output after activation from the last forward pass
/// - `grad_weights` - Stored weight gradients
/// - `grad_bias` - Stored bias gradients
///
/// # Example
/// ```rust
/// use mlp_trainer::prelude::*;
/// use ndarray::Array;
/// use ndarray_rand::rand::SeedableRng;
/// use ndarray_rand::rand::rngs::StdRng;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let mut dense = Dense::new(4, 3, Activation::ReLU, &mut rng).unwrap();
///
/// let x = Array::ones((2, 4)).into_dyn();
/// let y = dense.forward(&x).unwrap();
/// assert_eq!(y.shape(), &[2, 3]);
/// ```
pub struct Dense {
    input_dim: usize,
    output_dim: usize,
    input_shape: [usize; 1],
    weights: Array2<f32>,
    bias: Array2<f32>,
    activation: Activation,
    input_cache: Option<Array2<f32>>,
    activation_output: Option<Array2<f32>>,
    grad_weights: Option<Array2<f32>>,
    grad_bias: Option<Array2<f32>>,
}

impl Dense {
    /// Creates a new dense layer with Glorot uniform weights.
    ///
    /// # Parameters
    ///
    /// - `input_dim` - Number of input features
    /// - `output_dim` - Number of units
    /// - `activation` - Activation applied after the affine transformation
    /// - `rng` - Random number generator used for the weights
    ///
    /// # Returns
    ///
    /// - `Ok(Dense)` - A new Dense layer instance
    /// - `Err(ModelError::ConfigError)` - If either dimension is zero
    pub fn new<R: Rng + ?Sized>(
        input_dim: usize,
        output_dim: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        Self::with_initializer(
            input_dim,
            output_dim,
            activation,
            Initializer::GlorotUniform,
            rng,
        )
    }

    /// Creates a new dense layer using the given weight initializer.
    ///
    /// # Parameters
    ///
    /// - `input_dim` - Number of input features
    /// - `output_dim` - Number of units
    /// - `activation` - Activation applied after the affine transformation
    /// - `initializer` - Scheme used to fill the weight matrix
    /// - `rng` - Random number generator used for the weights
    ///
    /// # Returns
    ///
    /// - `Ok(Dense)` - A new Dense layer instance
    /// - `Err(ModelError::ConfigError)` - If either dimension is zero or the initializer is invalid
    pub fn with_initializer<R: Rng + ?Sized>(
        input_dim: usize,
        output_dim: usize,
        activation: Activation,
        initializer: Initializer,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        if input_dim == 0 || output_dim == 0 {
            return Err(ModelError::ConfigError(format!(
                "Dense layer dimensions must be positive, got input_dim={}, output_dim={}",
                input_dim, output_dim
            )));
        }
        let weights = initializer.kernel(input_dim, output_dim, rng)?;
        let bias = Array2::zeros((1, output_dim));
        Ok(Self::assemble(weights, bias, activation))
    }

    /// Creates a dense layer from known parameters.
    ///
    /// # Parameters
    ///
    /// - `weights` - Weight matrix with shape (input_dim, output_dim)
    /// - `bias` - Bias with shape (1, output_dim)
    /// - `activation` - Activation applied after the affine transformation
    ///
    /// # Returns
    ///
    /// - `Ok(Dense)` - A new Dense layer instance
    /// - `Err(ModelError::ShapeError)` - If the bias does not match the weight matrix
    pub fn from_parameters(
        weights: Array2<f32>,
        bias: Array2<f32>,
        activation: Activation,
    ) -> Result<Self, ModelError> {
        let (input_dim, output_dim) = weights.dim();
        if input_dim == 0 || output_dim == 0 {
            return Err(ModelError::ShapeError(format!(
                "Dense weights must be non-empty, got shape {:?}",
                weights.shape()
            )));
        }
        if bias.dim() != (1, output_dim) {
            return Err(ModelError::ShapeError(format!(
                "Dense bias must have shape [1, {}], got {:?}",
                output_dim,
                bias.shape()
            )));
        }
        Ok(Self::assemble(weights, bias, activation))
    }

    fn assemble(weights: Array2<f32>, bias: Array2<f32>, activation: Activation) -> Self {
        let (input_dim, output_dim) = weights.dim();
        Self {
            input_dim,
            output_dim,
            input_shape: [input_dim],
            weights,
            bias,
            activation,
            input_cache: None,
            activation_output: None,
            grad_weights: None,
            grad_bias: None,
        }
    }

    /// Returns the input dimension of the layer
    pub fn get_input_dim(&self) -> usize {
        self.input_dim
    }

    /// Returns the output dimension of the layer
    pub fn get_output_dim(&self) -> usize {
        self.output_dim
    }

    /// Returns a reference to the weight matrix with shape (input_dim, output_dim)
    pub fn get_kernel(&self) -> &Array2<f32> {
        &self.weights
    }

    /// Returns a reference to the bias with shape (1, output_dim)
    pub fn get_bias(&self) -> &Array2<f32> {
        &self.bias
    }

    /// Returns the weight gradient from the last backward pass
    pub fn get_grad_weights(&self) -> Option<&Array2<f32>> {
        self.grad_weights.as_ref()
    }

    /// Returns the bias gradient from the last backward pass
    pub fn get_grad_bias(&self) -> Option<&Array2<f32>> {
        self.grad_bias.as_ref()
    }

    fn affine(&self, input: &Tensor) -> Result<(Array2<f32>, Array2<f32>), ModelError> {
        validate_input_shape(self.layer_type(), &self.input_shape, input)?;
        let input_2d = input
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|e| ModelError::ShapeError(e.to_string()))?
            .to_owned();
        let z = input_2d.dot(&self.weights) + &self.bias;
        Ok((input_2d, z))
    }

    fn upstream_2d(&self, grad: &Tensor) -> Result<Array2<f32>, ModelError> {
        let expected_rows = match &self.input_cache {
            Some(input) => input.nrows(),
            None => {
                return Err(ModelError::ProcessingError(
                    "Forward pass has not been run".to_string(),
                ));
            }
        };
        let grad_2d = grad
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|e| ModelError::ShapeError(e.to_string()))?;
        if grad_2d.dim() != (expected_rows, self.output_dim) {
            return Err(ModelError::ShapeError(format!(
                "Dense gradient must have shape [{}, {}], got {:?}",
                expected_rows,
                self.output_dim,
                grad_2d.shape()
            )));
        }
        Ok(grad_2d.to_owned())
    }

    /// Stores parameter gradients from dL/dz and returns dL/dinput.
    fn backward_affine(&mut self, grad_z: Array2<f32>) -> Result<Tensor, ModelError> {
        let input = self.input_cache.take().ok_or_else(|| {
            ModelError::ProcessingError("Forward pass has not been run".to_string())
        })?;

        let grad_w = input.t().dot(&grad_z);
        let grad_b = grad_z.sum_axis(Axis(0)).insert_axis(Axis(0));
        let grad_input = grad_z.dot(&self.weights.t());

        self.grad_weights = Some(grad_w);
        self.grad_bias = Some(grad_b);
        Ok(grad_input.into_dyn())
    }
}

impl Layer for Dense {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, ModelError> {
        let (input_2d, z) = self.affine(input)?;
        let a = Activation::apply_activation(&z, &self.activation);
        self.input_cache = Some(input_2d);
        self.activation_output = Some(a.clone());
        Ok(a.into_dyn())
    }

    fn predict(&self, input: &Tensor) -> Result<Tensor, ModelError> {
        let (_, z) = self.affine(input)?;
        Ok(Activation::apply_activation(&z, &self.activation).into_dyn())
    }

    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, ModelError> {
        let grad_upstream = self.upstream_2d(grad_output)?;
        let a = self.activation_output.take().ok_or_else(|| {
            ModelError::ProcessingError("Forward pass has not been run".to_string())
        })?;

        let grad_z = match self.activation {
            Activation::Softmax => Activation::softmax_backward(&a, &grad_upstream),
            act => Activation::activation_derivative(&a, &act) * &grad_upstream,
        };
        self.backward_affine(grad_z)
    }

    fn backward_from_logits(&mut self, grad_logits: &Tensor) -> Result<Tensor, ModelError> {
        if self.activation != Activation::Softmax {
            return Err(ModelError::ProcessingError(format!(
                "Dense layer with {} activation cannot take a softmax logits gradient",
                self.activation
            )));
        }
        let grad_z = self.upstream_2d(grad_logits)?;
        self.activation_output = None;
        self.backward_affine(grad_z)
    }

    fn layer_type(&self) -> &str {
        "Dense"
    }

    fn input_shape(&self) -> &[usize] {
        &self.input_shape
    }

    fn output_shape(&self) -> Vec<usize> {
        vec![self.output_dim]
    }

    fn activation(&self) -> Option<Activation> {
        Some(self.activation)
    }

    fn param_count(&self) -> TrainingParameters {
        TrainingParameters::Trainable(self.input_dim * self.output_dim + self.output_dim)
    }

    fn parameters(&mut self) -> Vec<Parameter<'_>> {
        vec![
            Parameter {
                name: "kernel",
                value: &mut self.weights,
                grad: self.grad_weights.as_ref(),
            },
            Parameter {
                name: "bias",
                value: &mut self.bias,
                grad: self.grad_bias.as_ref(),
            },
        ]
    }

    fn get_weights(&self) -> LayerWeight<'_> {
        LayerWeight::Dense(DenseLayerWeight {
            weight: &self.weights,
            bias: &self.bias,
        })
    }
}
