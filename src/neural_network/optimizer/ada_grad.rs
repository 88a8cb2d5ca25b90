use super::input_validation_function::validate_epsilon;
use super::{OPTIMIZER_PARALLEL_THRESHOLD, ParameterKey, validate_gradient_shape};
use crate::error::ModelError;
use crate::neural_network::Optimizer;
use ahash::AHashMap;
use ndarray::{Array2, Zip};

/// AdaGrad (Adaptive Gradient Algorithm) optimizer
///
/// Adjusts the learning rate of each parameter by the historical sum of its squared
/// gradients, so frequently updated parameters take smaller steps.
///
/// # Fields
///
/// - `epsilon` - Small constant added for numerical stability
/// - `accumulators` - Sum of squared gradients per parameter
#[derive(Debug, Clone)]
pub struct AdaGrad {
    epsilon: f32,
    accumulators: AHashMap<ParameterKey, Array2<f32>>,
}

impl AdaGrad {
    /// Creates a new AdaGrad optimizer.
    ///
    /// # Parameters
    ///
    /// - `epsilon` - Small constant for numerical stability (typically 1e-8)
    ///
    /// # Returns
    ///
    /// - `Ok(AdaGrad)` - A new AdaGrad optimizer instance
    /// - `Err(ModelError::ConfigError)` - If epsilon is not positive and finite
    pub fn new(epsilon: f32) -> Result<Self, ModelError> {
        validate_epsilon(epsilon)?;

        Ok(Self {
            epsilon,
            accumulators: AHashMap::new(),
        })
    }
}

impl Optimizer for AdaGrad {
    fn update(
        &mut self,
        key: ParameterKey,
        param: &mut Array2<f32>,
        grad: &Array2<f32>,
        learning_rate: f32,
    ) -> Result<(), ModelError> {
        validate_gradient_shape(key, param, grad)?;

        let epsilon = self.epsilon;
        let accumulator = self
            .accumulators
            .entry(key)
            .or_insert_with(|| Array2::zeros(param.raw_dim()));
        validate_gradient_shape(key, accumulator, grad)?;

        let step = |w: &mut f32, acc: &mut f32, &g: &f32| {
            *acc += g * g;
            *w -= learning_rate * g / (acc.sqrt() + epsilon);
        };

        let zip = Zip::from(param).and(accumulator).and(grad);
        if grad.len() >= OPTIMIZER_PARALLEL_THRESHOLD {
            zip.par_for_each(step);
        } else {
            zip.for_each(step);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "AdaGrad"
    }
}
