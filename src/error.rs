use std::fs::File;
use std::io::BufReader;

/// Error types that can occur while building, training or evaluating a network
///
/// # Variants
///
/// - `ShapeError` - A layer's input/output rank or dimension does not match its neighbour or the data fed to it
/// - `NumericError` - A NaN or infinite value appeared in a loss or gradient; `epoch` and `batch` locate the divergence when known
/// - `ConfigError` - A configuration option or hyper-parameter is outside its valid range
/// - `DimensionError` - An optimizer received a gradient whose shape differs from its parameter
/// - `ProcessingError` - An operation was called in the wrong order (e.g. backward before forward)
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    ShapeError(String),
    NumericError {
        epoch: Option<usize>,
        batch: Option<usize>,
        message: String,
    },
    ConfigError(String),
    DimensionError(String),
    ProcessingError(String),
}

impl ModelError {
    /// Creates a `NumericError` that has not been located in the training loop yet.
    pub fn numeric(message: impl Into<String>) -> Self {
        ModelError::NumericError {
            epoch: None,
            batch: None,
            message: message.into(),
        }
    }

    /// Attaches the epoch and batch index to a `NumericError`.
    ///
    /// Other variants are returned unchanged.
    ///
    /// # Parameters
    ///
    /// - `epoch` - Zero-based epoch index where the error surfaced
    /// - `batch` - Zero-based batch index inside that epoch
    ///
    /// # Returns
    ///
    /// * `ModelError` - The located error
    pub fn at(self, epoch: usize, batch: usize) -> Self {
        match self {
            ModelError::NumericError { message, .. } => ModelError::NumericError {
                epoch: Some(epoch),
                batch: Some(batch),
                message,
            },
            other => other,
        }
    }

    /// Returns `true` for errors caused by NaN or infinite values.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ModelError::NumericError { .. })
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::ShapeError(msg) => write!(f, "Shape error: {}", msg),
            ModelError::NumericError {
                epoch: Some(epoch),
                batch: Some(batch),
                message,
            } => write!(
                f,
                "Numeric error at epoch {}, batch {}: {}",
                epoch, batch, message
            ),
            ModelError::NumericError { message, .. } => write!(f, "Numeric error: {}", message),
            ModelError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ModelError::DimensionError(msg) => write!(f, "Dimension error: {}", msg),
            ModelError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
        }
    }
}

/// Implements the standard error trait for ModelError
impl std::error::Error for ModelError {}

/// Input/Output error types that can occur while reading configuration files
/// or writing training reports
///
/// # Variants
///
/// - `StdIoError` - Wraps standard I/O errors from file system operations (reading, writing, file access)
/// - `JsonError` - Wraps JSON serialization/deserialization errors when working with JSON data formats
#[derive(Debug)]
pub enum IoError {
    StdIoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl IoError {
    pub fn load_in_buf_reader(path: &str) -> Result<BufReader<File>, IoError> {
        let file = File::open(path).map_err(IoError::StdIoError)?;
        Ok(BufReader::new(file))
    }
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoError::StdIoError(e) => write!(f, "IO error: {}", e),
            IoError::JsonError(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for IoError {}
