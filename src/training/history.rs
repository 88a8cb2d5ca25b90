use crate::error::IoError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};

/// Metrics of one completed epoch
///
/// # Fields
///
/// - `epoch_index` - Zero-based epoch number
/// - `train_loss` - Sample-weighted mean training loss over the epoch
/// - `train_accuracy` - Fraction of training samples classified correctly during the epoch
/// - `validation_loss` - Validation loss after the epoch, `None` without validation data
/// - `validation_accuracy` - Validation accuracy after the epoch, `None` without validation data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    pub epoch_index: usize,
    pub train_loss: f32,
    pub train_accuracy: f32,
    pub validation_loss: Option<f32>,
    pub validation_accuracy: Option<f32>,
}

/// Ordered per-epoch metrics of a training run
///
/// Records are only appended by the trainer; callers get read-only access.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    records: Vec<EpochRecord>,
}

impl History {
    /// Creates an empty history
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: EpochRecord) {
        self.records.push(record);
    }

    /// Returns all records in epoch order
    pub fn records(&self) -> &[EpochRecord] {
        &self.records
    }

    /// Number of completed epochs
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no epoch has completed
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the record of the most recent epoch
    pub fn last(&self) -> Option<&EpochRecord> {
        self.records.last()
    }

    /// Training loss of every epoch, in order
    pub fn train_losses(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.train_loss).collect()
    }

    /// Training accuracy of every epoch, in order
    pub fn train_accuracies(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.train_accuracy).collect()
    }

    /// Validation loss of every epoch that had validation data
    pub fn validation_losses(&self) -> Vec<f32> {
        self.records
            .iter()
            .filter_map(|r| r.validation_loss)
            .collect()
    }

    /// Validation accuracy of every epoch that had validation data
    pub fn validation_accuracies(&self) -> Vec<f32> {
        self.records
            .iter()
            .filter_map(|r| r.validation_accuracy)
            .collect()
    }

    /// Serialises the history as pretty-printed JSON.
    ///
    /// # Returns
    ///
    /// - `Ok(String)` - The JSON document
    /// - `Err(IoError::JsonError)` - If serialisation fails
    pub fn to_json(&self) -> Result<String, IoError> {
        serde_json::to_string_pretty(self).map_err(IoError::JsonError)
    }

    /// Writes the history as JSON to `path`, e.g. for plotting learning curves.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - History successfully saved to file
    /// - `Err(IoError::StdIoError)` - File creation or write operation failed
    /// - `Err(IoError::JsonError)` - Serialization to JSON failed
    pub fn save_to_path(&self, path: &str) -> Result<(), IoError> {
        let file = File::create(path).map_err(IoError::StdIoError)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(IoError::JsonError)?;
        writer.flush().map_err(IoError::StdIoError)?;
        Ok(())
    }
}
