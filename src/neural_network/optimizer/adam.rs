use super::input_validation_function::{validate_decay_rate, validate_epsilon};
use super::{OPTIMIZER_PARALLEL_THRESHOLD, ParameterKey, validate_gradient_shape};
use crate::error::ModelError;
use crate::neural_network::Optimizer;
use ahash::AHashMap;
use ndarray::{Array2, Zip};

/// Adam optimizer implementation.
///
/// An optimization algorithm that computes individual adaptive learning
/// rates for different parameters from estimates of first and second moments
/// of the gradients.
///
/// # Fields
///
/// - `beta1` - Exponential decay rate for the first moment estimates
/// - `beta2` - Exponential decay rate for the second moment estimates
/// - `epsilon` - Small constant added for numerical stability
/// - `states` - Moment estimates and step counter per parameter
#[derive(Debug, Clone)]
pub struct Adam {
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    states: AHashMap<ParameterKey, AdamStates>,
}

impl Adam {
    /// Creates a new Adam optimizer with the specified parameters.
    ///
    /// # Parameters
    ///
    /// - `beta1` - Decay rate for the first moment estimates (typically 0.9)
    /// - `beta2` - Decay rate for the second moment estimates (typically 0.999)
    /// - `epsilon` - Small constant for numerical stability (typically 1e-8)
    ///
    /// # Returns
    ///
    /// - `Ok(Adam)` - A new Adam optimizer instance
    /// - `Err(ModelError::ConfigError)` - If any hyper-parameter is out of range
    pub fn new(beta1: f32, beta2: f32, epsilon: f32) -> Result<Self, ModelError> {
        validate_decay_rate(beta1, "beta1")?;
        validate_decay_rate(beta2, "beta2")?;
        validate_epsilon(epsilon)?;

        Ok(Self {
            beta1,
            beta2,
            epsilon,
            states: AHashMap::new(),
        })
    }

    /// Returns the state kept for a parameter, if it has been updated at least once.
    pub fn get_state(&self, key: ParameterKey) -> Option<&AdamStates> {
        self.states.get(&key)
    }
}

impl Default for Adam {
    /// Adam with the usual defaults: beta1 = 0.9, beta2 = 0.999, epsilon = 1e-7.
    fn default() -> Self {
        Self {
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            states: AHashMap::new(),
        }
    }
}

/// Moment estimates of one parameter.
///
/// # Fields
///
/// - `m` - First moment vector (moving average of gradients)
/// - `v` - Second moment vector (moving average of squared gradients)
/// - `t` - Number of updates applied to this parameter
#[derive(Debug, Clone)]
pub struct AdamStates {
    pub m: Array2<f32>,
    pub v: Array2<f32>,
    pub t: u64,
}

impl AdamStates {
    /// Creates zeroed moment estimates for a parameter of shape `dims`.
    pub fn new(dims: (usize, usize)) -> Self {
        Self {
            m: Array2::zeros(dims),
            v: Array2::zeros(dims),
            t: 0,
        }
    }
}

impl Optimizer for Adam {
    fn update(
        &mut self,
        key: ParameterKey,
        param: &mut Array2<f32>,
        grad: &Array2<f32>,
        learning_rate: f32,
    ) -> Result<(), ModelError> {
        validate_gradient_shape(key, param, grad)?;

        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);
        let state = self
            .states
            .entry(key)
            .or_insert_with(|| AdamStates::new(param.dim()));
        validate_gradient_shape(key, &state.m, grad)?;

        state.t += 1;
        let bias_correction1 = 1.0 - beta1.powi(state.t as i32);
        let bias_correction2 = 1.0 - beta2.powi(state.t as i32);

        let step = |w: &mut f32, m: &mut f32, v: &mut f32, &g: &f32| {
            *m = beta1 * *m + (1.0 - beta1) * g;
            *v = beta2 * *v + (1.0 - beta2) * g * g;
            let m_hat = *m / bias_correction1;
            let v_hat = *v / bias_correction2;
            *w -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
        };

        let zip = Zip::from(param)
            .and(&mut state.m)
            .and(&mut state.v)
            .and(grad);
        if grad.len() >= OPTIMIZER_PARALLEL_THRESHOLD {
            zip.par_for_each(step);
        } else {
            zip.for_each(step);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Adam"
    }
}
