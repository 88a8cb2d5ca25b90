use crate::error::ModelError;
use ndarray::{Array, Array2};
use ndarray_rand::RandomExt;
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::Uniform;

/// Weight initialisation scheme for dense kernels
///
/// Biases are always initialised to zero.
///
/// # Variants
///
/// - `Zeros` - Every weight is `0.0`
/// - `Uniform` - Weights drawn from `U(low, high)`
/// - `GlorotUniform` - Weights drawn from `U(-l, l)` with `l = sqrt(6 / (fan_in + fan_out))`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Initializer {
    Zeros,
    Uniform { low: f32, high: f32 },
    GlorotUniform,
}

impl Default for Initializer {
    fn default() -> Self {
        Initializer::GlorotUniform
    }
}

impl Initializer {
    /// Builds a `[fan_in, fan_out]` kernel.
    ///
    /// # Parameters
    ///
    /// - `fan_in` - Number of input units
    /// - `fan_out` - Number of output units
    /// - `rng` - Random number generator; the caller owns the seed
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f32>)` - The initialised kernel
    /// - `Err(ModelError::ConfigError)` - If the uniform bounds are not finite or `low >= high`
    pub fn kernel<R: Rng + ?Sized>(
        &self,
        fan_in: usize,
        fan_out: usize,
        rng: &mut R,
    ) -> Result<Array2<f32>, ModelError> {
        match *self {
            Initializer::Zeros => Ok(Array2::zeros((fan_in, fan_out))),
            Initializer::Uniform { low, high } => {
                if !(low.is_finite() && high.is_finite() && low < high) {
                    return Err(ModelError::ConfigError(format!(
                        "uniform initializer needs finite low < high, got [{}, {})",
                        low, high
                    )));
                }
                Ok(Array::random_using(
                    (fan_in, fan_out),
                    Uniform::new(low, high),
                    rng,
                ))
            }
            Initializer::GlorotUniform => {
                let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
                Ok(Array::random_using(
                    (fan_in, fan_out),
                    Uniform::new(-limit, limit),
                    rng,
                ))
            }
        }
    }
}
