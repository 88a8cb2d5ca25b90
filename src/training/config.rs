use crate::error::{IoError, ModelError};
use crate::neural_network::optimizer::input_validation_function::validate_learning_rate;
use serde::{Deserialize, Serialize};

/// Options controlling one training run
///
/// Missing fields take their default when deserialised, so a JSON file only needs to
/// name what it changes.
///
/// # Fields
///
/// - `epochs` - Number of passes over the training data, must be positive
/// - `batch_size` - Samples per gradient step, must be positive
/// - `learning_rate` - Step size handed to the optimizer, must be positive and finite
/// - `validation_split` - Fraction in \[0, 1) of the training data held out for validation
///   (taken from the end); ignored when a validation partition is passed to `fit`
/// - `early_stopping_patience` - Non-improving epochs tolerated before stopping, 0 disables
/// - `early_stopping_min_delta` - Minimum decrease of the validation loss that counts as improvement
/// - `shuffle` - Reshuffle the training order every epoch
/// - `seed` - Seed of the shuffling RNG
/// - `verbose` - Show a progress bar
///
/// # Example
/// ```rust
/// use mlp_trainer::training::TrainingConfig;
///
/// let config = TrainingConfig::from_json_str(r#"{ "epochs": 5, "batch_size": 64 }"#).unwrap();
/// assert_eq!(config.epochs, 5);
/// assert_eq!(config.batch_size, 64);
/// assert_eq!(config.seed, 42);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    pub validation_split: f32,
    pub early_stopping_patience: usize,
    pub early_stopping_min_delta: f32,
    pub shuffle: bool,
    pub seed: u64,
    pub verbose: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            batch_size: 32,
            learning_rate: 0.01,
            validation_split: 0.0,
            early_stopping_patience: 0,
            early_stopping_min_delta: 0.0,
            shuffle: true,
            seed: 42,
            verbose: false,
        }
    }
}

impl TrainingConfig {
    /// Creates a configuration with the given number of epochs and defaults elsewhere.
    pub fn new(epochs: usize) -> Self {
        Self {
            epochs,
            ..Self::default()
        }
    }

    /// Checks every option against its valid range.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - The configuration is usable
    /// - `Err(ModelError::ConfigError)` - Naming the first offending option
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.epochs == 0 {
            return Err(ModelError::ConfigError(
                "epochs must be greater than 0".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ModelError::ConfigError(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        validate_learning_rate(self.learning_rate)?;
        if !(0.0..1.0).contains(&self.validation_split) {
            return Err(ModelError::ConfigError(format!(
                "validation_split must be in [0, 1), got {}",
                self.validation_split
            )));
        }
        if !self.early_stopping_min_delta.is_finite() || self.early_stopping_min_delta < 0.0 {
            return Err(ModelError::ConfigError(format!(
                "early_stopping_min_delta must be non-negative and finite, got {}",
                self.early_stopping_min_delta
            )));
        }
        Ok(())
    }

    /// Parses a configuration from JSON and validates it.
    ///
    /// # Returns
    ///
    /// - `Ok(TrainingConfig)` - The parsed configuration
    /// - `Err(ModelError::ConfigError)` - If the JSON is malformed or an option is out of range
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ModelError::ConfigError(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    ///
    /// The result is not validated; `Trainer::new` validates it.
    ///
    /// # Returns
    ///
    /// - `Ok(TrainingConfig)` - The parsed configuration
    /// - `Err(IoError::StdIoError)` - If the file cannot be opened
    /// - `Err(IoError::JsonError)` - If the file is not valid JSON for this type
    pub fn load_from_path(path: &str) -> Result<Self, IoError> {
        let reader = IoError::load_in_buf_reader(path)?;
        serde_json::from_reader(reader).map_err(IoError::JsonError)
    }
}
