use super::*;
use crate::error::ModelError;
use crate::metric::argmax_rows;
use ndarray::{Array1, ArrayViewD, Axis};
use std::fmt::Write;

/// A Sequential neural network model for building and training feedforward networks.
///
/// The Sequential model stacks layers in a linear fashion: each layer feeds its output
/// to the next one. Layers are appended with `add`, which checks that the new layer accepts
/// the previous layer's output shape, so a built network always has consistent shapes.
///
/// Training itself is driven by `training::Trainer`; this type owns the layers and exposes
/// the forward, backward and update steps the trainer composes.
///
/// # Fields
///
/// - `layers` - All layers in the model, stored as boxed trait objects in application order
///
/// # Example
/// ```rust
/// use mlp_trainer::prelude::*;
/// use ndarray::Array;
/// use ndarray_rand::rand::SeedableRng;
/// use ndarray_rand::rand::rngs::StdRng;
///
/// let mut rng = StdRng::seed_from_u64(42);
///
/// // Build a neural network for 28x28 images and 10 classes
/// let mut model = Sequential::new();
/// model
///     .add(Flatten::new(vec![28, 28]).unwrap())
///     .unwrap()
///     .add(Dense::new(784, 128, Activation::ReLU, &mut rng).unwrap())
///     .unwrap()
///     .add(Dense::new(128, 10, Activation::Softmax, &mut rng).unwrap())
///     .unwrap();
///
/// // Display model structure
/// model.summary();
///
/// // Make predictions
/// let x = Array::zeros((4, 28, 28)).into_dyn();
/// let predictions = model.predict(&x).unwrap();
/// assert_eq!(predictions.shape(), &[4, 10]);
/// ```
#[derive(Default)]
pub struct Sequential {
    layers: Vec<Box<dyn Layer>>,
}

impl Sequential {
    /// Creates a new empty Sequential model
    ///
    /// # Returns
    ///
    /// * `Sequential` - an empty Sequential model
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Adds a layer to the model
    ///
    /// Supports method chaining pattern
    ///
    /// # Parameters
    ///
    /// * `layer` - The layer to add to the model
    ///
    /// # Returns
    ///
    /// - `Ok(&mut Sequential)` - Mutable reference to self for method chaining
    /// - `Err(ModelError::ShapeError)` - If the layer's input shape does not match the
    ///   previous layer's output shape
    pub fn add<L: 'static + Layer>(&mut self, layer: L) -> Result<&mut Self, ModelError> {
        if let Some(previous) = self.layers.last() {
            let produced = previous.output_shape();
            let expected = layer.input_shape();
            if produced.len() != expected.len() {
                return Err(ModelError::ShapeError(format!(
                    "{} layer expects rank {} samples but {} layer produces rank {} ({:?})",
                    layer.layer_type(),
                    expected.len(),
                    previous.layer_type(),
                    produced.len(),
                    produced
                )));
            }
            if produced.as_slice() != expected {
                return Err(ModelError::ShapeError(format!(
                    "{} layer expects samples of shape {:?} but {} layer produces {:?}",
                    layer.layer_type(),
                    expected,
                    previous.layer_type(),
                    produced
                )));
            }
        }
        self.layers.push(Box::new(layer));
        Ok(self)
    }

    /// Returns the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if no layer has been added
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Returns the layers in application order
    pub fn layers(&self) -> &[Box<dyn Layer>] {
        &self.layers
    }

    /// Per-sample input shape of the first layer
    pub fn input_shape(&self) -> Option<&[usize]> {
        self.layers.first().map(|layer| layer.input_shape())
    }

    /// Per-sample output shape of the last layer
    pub fn output_shape(&self) -> Option<Vec<usize>> {
        self.layers.last().map(|layer| layer.output_shape())
    }

    /// Activation of the output layer, if it has one
    pub fn output_activation(&self) -> Option<Activation> {
        self.layers.last().and_then(|layer| layer.activation())
    }

    /// Number of classes the network scores, i.e. the width of a rank-1 output
    pub fn num_classes(&self) -> Option<usize> {
        match self.output_shape() {
            Some(shape) if shape.len() == 1 => Some(shape[0]),
            _ => None,
        }
    }

    fn ensure_built(&self) -> Result<(), ModelError> {
        if self.layers.is_empty() {
            return Err(ModelError::ProcessingError(
                "Sequential model has no layers".to_string(),
            ));
        }
        Ok(())
    }

    /// Runs the forward pass, caching in every layer what `backward` needs.
    ///
    /// # Parameters
    ///
    /// * `x` - Input batch, batch axis first
    ///
    /// # Returns
    ///
    /// - `Ok(Tensor)` - Network output, `[batch_size, num_classes]` for a classifier
    /// - `Err(ModelError::ShapeError)` - If the input does not match the first layer
    pub fn forward(&mut self, x: &Tensor) -> Result<Tensor, ModelError> {
        self.ensure_built()?;
        let mut output = x.clone();
        for layer in &mut self.layers {
            output = layer.forward(&output)?;
        }
        Ok(output)
    }

    /// Runs the forward pass without caching anything.
    ///
    /// # Parameters
    ///
    /// * `x` - Input batch, batch axis first
    ///
    /// # Returns
    ///
    /// - `Ok(Tensor)` - Network output
    /// - `Err(ModelError::ShapeError)` - If the input does not match the first layer
    pub fn predict(&self, x: &Tensor) -> Result<Tensor, ModelError> {
        self.ensure_built()?;
        let mut output = x.clone();
        for layer in &self.layers {
            output = layer.predict(&output)?;
        }
        Ok(output)
    }

    /// Predicts the most probable class of every sample in `x`.
    pub fn predict_classes(&self, x: &Tensor) -> Result<Array1<usize>, ModelError> {
        argmax_rows(&self.predict(x)?)
    }

    /// Predicts the class probabilities of a single sample.
    ///
    /// The batch axis is added internally, so `image` has the per-sample shape
    /// (e.g. `[28, 28]`).
    ///
    /// # Returns
    ///
    /// - `Ok(Array1<f32>)` - One score per class
    /// - `Err(ModelError::ShapeError)` - If the sample does not match the first layer
    pub fn predict_single(&self, image: ArrayViewD<f32>) -> Result<Array1<f32>, ModelError> {
        let batch = image.insert_axis(Axis(0)).to_owned();
        let output = self.predict(&batch)?;
        if output.ndim() != 2 {
            return Err(ModelError::ShapeError(format!(
                "expected a [1, classes] output, got shape {:?}",
                output.shape()
            )));
        }
        Ok(output.index_axis_move(Axis(0), 0).iter().copied().collect())
    }

    /// Back-propagates `grad_output` (gradient with respect to the network output)
    /// through every layer, storing parameter gradients.
    ///
    /// # Returns
    ///
    /// - `Ok(Tensor)` - Gradient with respect to the network input
    /// - `Err(ModelError)` - If `forward` has not been run or shapes differ
    pub fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, ModelError> {
        self.ensure_built()?;
        let mut grad = grad_output.clone();
        for layer in self.layers.iter_mut().rev() {
            grad = layer.backward(&grad)?;
        }
        Ok(grad)
    }

    /// Back-propagates a gradient taken with respect to the logits of a softmax output layer.
    ///
    /// The output layer skips its softmax Jacobian; all other layers use the normal chain rule.
    ///
    /// # Returns
    ///
    /// - `Ok(Tensor)` - Gradient with respect to the network input
    /// - `Err(ModelError::ProcessingError)` - If the output layer is not a softmax layer
    pub fn backward_from_logits(&mut self, grad_logits: &Tensor) -> Result<Tensor, ModelError> {
        self.ensure_built()?;
        let mut layers = self.layers.iter_mut().rev();
        let mut grad = match layers.next() {
            Some(output_layer) => output_layer.backward_from_logits(grad_logits)?,
            None => return Ok(grad_logits.clone()),
        };
        for layer in layers {
            grad = layer.backward(&grad)?;
        }
        Ok(grad)
    }

    /// Returns `true` when every stored gradient is finite.
    pub fn gradients_finite(&mut self) -> bool {
        self.layers
            .iter_mut()
            .all(|layer| layer.parameters().iter().all(|p| p.grad_is_finite()))
    }

    /// Hands every (parameter, gradient) pair to the optimizer.
    ///
    /// Parameters are identified by `ParameterKey { layer, slot }` where `slot` is the
    /// parameter's position within its layer (kernel = 0, bias = 1 for `Dense`).
    /// Parameters without a gradient are skipped. All gradients are checked before any
    /// parameter changes, so a non-finite gradient leaves the network untouched.
    ///
    /// # Parameters
    ///
    /// - `optimizer` - The optimizer applying the update rule
    /// - `learning_rate` - Step size
    ///
    /// # Returns
    ///
    /// - `Ok(())` - Every parameter was updated
    /// - `Err(ModelError::NumericError)` - If a gradient contains NaN or infinity
    /// - `Err(ModelError::DimensionError)` - If a gradient shape differs from its parameter
    pub fn apply_gradients<O: Optimizer + ?Sized>(
        &mut self,
        optimizer: &mut O,
        learning_rate: f32,
    ) -> Result<(), ModelError> {
        for (layer_index, layer) in self.layers.iter_mut().enumerate() {
            if let Some(param) = layer.parameters().iter().find(|p| !p.grad_is_finite()) {
                return Err(ModelError::numeric(format!(
                    "non-finite gradient for {} of layer {}",
                    param.name, layer_index
                )));
            }
        }

        for (layer_index, layer) in self.layers.iter_mut().enumerate() {
            for (slot, param) in layer.parameters().into_iter().enumerate() {
                if let Some(grad) = param.grad {
                    optimizer.update(
                        ParameterKey::new(layer_index, slot),
                        param.value,
                        grad,
                        learning_rate,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Returns the parameter counts of the whole model as `(trainable, non_trainable)`.
    pub fn param_count(&self) -> (usize, usize) {
        self.layers
            .iter()
            .fold((0, 0), |(trainable, frozen), layer| match layer.param_count() {
                TrainingParameters::Trainable(n) => (trainable + n, frozen),
                TrainingParameters::NonTrainable(n) => (trainable, frozen + n),
                TrainingParameters::NoTrainable => (trainable, frozen),
            })
    }

    /// Renders the Keras-style model summary table.
    pub fn summary_string(&self) -> String {
        let col1_width = 33;
        let col2_width = 24;
        let col3_width = 15;
        let mut out = String::new();

        // `write!` into a String cannot fail
        let _ = writeln!(out, "Model: \"sequential\"");
        let _ = writeln!(
            out,
            "┏{}┳{}┳{}┓",
            "━".repeat(col1_width),
            "━".repeat(col2_width),
            "━".repeat(col3_width)
        );
        let _ = writeln!(
            out,
            "┃ {:<31} ┃ {:<22} ┃ {:>13} ┃",
            "Layer (type)", "Output Shape", "Param #"
        );
        let _ = writeln!(
            out,
            "┡{}╇{}╇{}┩",
            "━".repeat(col1_width),
            "━".repeat(col2_width),
            "━".repeat(col3_width)
        );

        for (i, layer) in self.layers.iter().enumerate() {
            // first layer is named "Layer", then "Layer_1", "Layer_2", etc.
            let layer_name = if i == 0 {
                "Layer".to_string()
            } else {
                format!("Layer_{}", i)
            };
            let _ = writeln!(
                out,
                "│ {:<31} │ {:<22} │ {:>13} │",
                format!("{} ({})", layer_name, layer.layer_type()),
                format_output_shape(&layer.output_shape()),
                layer.param_count().count()
            );
        }
        let _ = writeln!(
            out,
            "└{}┴{}┴{}┘",
            "─".repeat(col1_width),
            "─".repeat(col2_width),
            "─".repeat(col3_width)
        );

        let (trainable, non_trainable) = self.param_count();
        let total = trainable + non_trainable;
        // f32 parameters take 4 bytes each
        let _ = writeln!(out, " Total params: {} ({} B)", total, total * 4);
        let _ = writeln!(
            out,
            " Trainable params: {} ({} B)",
            trainable,
            trainable * 4
        );
        let _ = writeln!(
            out,
            " Non-trainable params: {} ({} B)",
            non_trainable,
            non_trainable * 4
        );
        out
    }

    /// Prints the model summary table to stdout.
    pub fn summary(&self) {
        print!("{}", self.summary_string());
    }

    /// Returns all the weights from each layer in the model.
    ///
    /// # Returns
    ///
    /// * `Vec<LayerWeight>` - One entry per layer: `LayerWeight::Dense` with weight and bias
    ///   for dense layers, `LayerWeight::Empty` for parameter-free layers
    pub fn get_weights(&self) -> Vec<LayerWeight<'_>> {
        self.layers.iter().map(|layer| layer.get_weights()).collect()
    }
}
