use super::input_validation_function::{validate_decay_rate, validate_epsilon};
use super::{OPTIMIZER_PARALLEL_THRESHOLD, ParameterKey, validate_gradient_shape};
use crate::error::ModelError;
use crate::neural_network::Optimizer;
use ahash::AHashMap;
use ndarray::{Array2, Zip};

/// RMSprop (Root Mean Square Propagation) optimizer.
///
/// Adapts per-parameter learning rates using a moving average of squared gradients:
/// `cache = rho·cache + (1 - rho)·g²; param -= lr·g / (sqrt(cache) + epsilon)`.
///
/// # Fields
///
/// - `rho` - Decay rate for the moving average of squared gradients
/// - `epsilon` - Small constant added for numerical stability
/// - `cache` - Moving average of squared gradients per parameter
#[derive(Debug, Clone)]
pub struct RMSprop {
    rho: f32,
    epsilon: f32,
    cache: AHashMap<ParameterKey, Array2<f32>>,
}

impl RMSprop {
    /// Creates a new RMSprop optimizer with the specified parameters.
    ///
    /// # Parameters
    ///
    /// - `rho` - Decay rate for moving average of squared gradients (typically 0.9)
    /// - `epsilon` - Small constant for numerical stability (typically 1e-8)
    ///
    /// # Returns
    ///
    /// - `Ok(RMSprop)` - A new RMSprop optimizer instance
    /// - `Err(ModelError::ConfigError)` - If any hyper-parameter is out of range
    pub fn new(rho: f32, epsilon: f32) -> Result<Self, ModelError> {
        validate_decay_rate(rho, "rho")?;
        validate_epsilon(epsilon)?;

        Ok(Self {
            rho,
            epsilon,
            cache: AHashMap::new(),
        })
    }
}

impl Optimizer for RMSprop {
    fn update(
        &mut self,
        key: ParameterKey,
        param: &mut Array2<f32>,
        grad: &Array2<f32>,
        learning_rate: f32,
    ) -> Result<(), ModelError> {
        validate_gradient_shape(key, param, grad)?;

        let (rho, epsilon) = (self.rho, self.epsilon);
        let cache = self
            .cache
            .entry(key)
            .or_insert_with(|| Array2::zeros(param.raw_dim()));
        validate_gradient_shape(key, cache, grad)?;

        let step = |w: &mut f32, c: &mut f32, &g: &f32| {
            *c = rho * *c + (1.0 - rho) * g * g;
            *w -= learning_rate * g / (c.sqrt() + epsilon);
        };

        let zip = Zip::from(param).and(cache).and(grad);
        if grad.len() >= OPTIMIZER_PARALLEL_THRESHOLD {
            zip.par_for_each(step);
        } else {
            zip.for_each(step);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "RMSprop"
    }
}
