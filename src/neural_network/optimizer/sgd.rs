use super::input_validation_function::validate_decay_rate;
use super::{OPTIMIZER_PARALLEL_THRESHOLD, ParameterKey, validate_gradient_shape};
use crate::error::ModelError;
use crate::neural_network::Optimizer;
use ahash::AHashMap;
use ndarray::{Array2, Zip};

/// Stochastic Gradient Descent (SGD) optimizer.
///
/// Without momentum every call applies `param -= learning_rate * grad`.
/// With momentum `μ > 0` a velocity is kept per parameter:
/// `v = μ·v - learning_rate·grad; param += v`.
///
/// # Fields
///
/// - `momentum` - Momentum factor in \[0, 1), 0 disables the velocity term
/// - `velocities` - Velocity per parameter, created on first update
///
/// # Example
/// ```rust
/// use mlp_trainer::prelude::*;
/// use ndarray::array;
///
/// let mut sgd = SGD::new();
/// let mut w = array![[1.0_f32, 2.0]];
/// let g = array![[0.5_f32, -0.5]];
/// sgd.update(ParameterKey::new(0, 0), &mut w, &g, 0.5).unwrap();
/// assert_eq!(w, array![[0.75, 2.25]]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SGD {
    momentum: f32,
    velocities: AHashMap<ParameterKey, Array2<f32>>,
}

impl SGD {
    /// Creates a plain SGD optimizer.
    ///
    /// # Returns
    ///
    /// * `Self` - A new SGD optimizer instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an SGD optimizer with classical momentum.
    ///
    /// # Parameters
    ///
    /// * `momentum` - Momentum factor in \[0, 1) (typically 0.9)
    ///
    /// # Returns
    ///
    /// - `Ok(SGD)` - A new SGD optimizer instance
    /// - `Err(ModelError::ConfigError)` - If momentum is out of range
    pub fn with_momentum(momentum: f32) -> Result<Self, ModelError> {
        validate_decay_rate(momentum, "momentum")?;
        Ok(Self {
            momentum,
            velocities: AHashMap::new(),
        })
    }

    /// Returns the momentum factor
    pub fn get_momentum(&self) -> f32 {
        self.momentum
    }

    /// Applies `param -= lr * grad` element-wise, in parallel for large parameters
    ///
    /// # Parameters
    ///
    /// - `param` - Parameter to be updated
    /// - `grad` - Gradient with the same shape as `param`
    /// - `lr` - Learning rate
    pub fn update_sgd_parameters(param: &mut Array2<f32>, grad: &Array2<f32>, lr: f32) {
        if param.len() >= OPTIMIZER_PARALLEL_THRESHOLD {
            Zip::from(param)
                .and(grad)
                .par_for_each(|w, &g| *w -= lr * g);
        } else {
            Zip::from(param).and(grad).for_each(|w, &g| *w -= lr * g);
        }
    }
}

impl Optimizer for SGD {
    fn update(
        &mut self,
        key: ParameterKey,
        param: &mut Array2<f32>,
        grad: &Array2<f32>,
        learning_rate: f32,
    ) -> Result<(), ModelError> {
        validate_gradient_shape(key, param, grad)?;

        if self.momentum == 0.0 {
            Self::update_sgd_parameters(param, grad, learning_rate);
            return Ok(());
        }

        let momentum = self.momentum;
        let velocity = self
            .velocities
            .entry(key)
            .or_insert_with(|| Array2::zeros(param.raw_dim()));
        validate_gradient_shape(key, velocity, grad)?;

        Zip::from(&mut *velocity)
            .and(grad)
            .for_each(|v, &g| *v = momentum * *v - learning_rate * g);
        *param += &*velocity;
        Ok(())
    }

    fn name(&self) -> &str {
        "SGD"
    }
}
