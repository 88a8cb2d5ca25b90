use super::{EarlyStopping, EpochRecord, History, TrainingConfig};
use crate::dataset::{Batch, Partition};
use crate::error::ModelError;
use crate::evaluation::evaluate_partition;
use crate::metric::correct_count;
use crate::neural_network::{Activation, LossFunction, Optimizer, Sequential};
use indicatif::{ProgressBar, ProgressStyle};
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::seq::SliceRandom;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Where the trainer is in its life cycle
///
/// `Idle → Training → ValidatingEpoch → (Training | Done)`. Early stopping,
/// cancellation and errors all move straight to `Done`.
///
/// # Variants
///
/// - `Idle` - Created, `fit` not called yet
/// - `Training` - Running the step for `batch` of `epoch`
/// - `ValidatingEpoch` - Scoring the validation partition after `epoch`
/// - `Done` - Finished; the history is final
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    Idle,
    Training { epoch: usize, batch: usize },
    ValidatingEpoch { epoch: usize },
    Done,
}

/// Why `fit` returned successfully
///
/// # Variants
///
/// - `Completed` - All configured epochs ran
/// - `EarlyStopped` - The validation loss stopped improving; `epoch` is the last epoch run
/// - `Cancelled` - A `StopHandle` requested a stop during `epoch`, which was not recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Completed,
    EarlyStopped { epoch: usize, best_epoch: usize },
    Cancelled { epoch: usize },
}

/// Cloneable flag asking a running trainer to stop.
///
/// The trainer checks it before every batch, so a stop takes effect after at most one
/// more optimizer step.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    /// Creates a handle that has not been triggered
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the trainer to stop
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once `stop` has been called on any clone
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Running sums of one epoch
#[derive(Debug, Default)]
struct EpochTotals {
    weighted_loss: f64,
    correct: usize,
    samples: usize,
}

impl EpochTotals {
    fn add(&mut self, loss: f32, correct: usize, samples: usize) {
        self.weighted_loss += loss as f64 * samples as f64;
        self.correct += correct;
        self.samples += samples;
    }

    fn mean_loss(&self) -> f32 {
        (self.weighted_loss / self.samples.max(1) as f64) as f32
    }

    fn accuracy(&self) -> f32 {
        self.correct as f32 / self.samples.max(1) as f32
    }
}

/// Drives mini-batch training of a `Sequential` network.
///
/// Every batch runs forward, loss and accuracy, backward, a finiteness check and
/// one optimizer update. After each epoch the validation partition (if any) is scored
/// with a forward-only sweep and an `EpochRecord` is appended to the history.
///
/// A trainer runs `fit` once; create a new trainer for another run.
///
/// # Example
/// ```rust
/// use mlp_trainer::prelude::*;
/// use ndarray::{Array1, Array2, Array3};
///
/// let mut model = Sequential::new();
/// model
///     .add(Flatten::new(vec![2, 2]).unwrap())
///     .unwrap()
///     .add(Dense::from_parameters(Array2::zeros((4, 2)), Array2::zeros((1, 2)), Activation::Softmax).unwrap())
///     .unwrap();
///
/// let train = Partition::from_raw_pixels(
///     &Array3::<u8>::from_elem((8, 2, 2), 128),
///     Array1::from(vec![1usize; 8]),
/// ).unwrap();
///
/// let config = TrainingConfig { epochs: 3, batch_size: 4, learning_rate: 0.1, ..TrainingConfig::default() };
/// let mut trainer = Trainer::new(config, SGD::new(), SparseCategoricalCrossEntropy::new()).unwrap();
/// let reason = trainer.fit(&mut model, &train, None).unwrap();
///
/// assert_eq!(reason, StopReason::Completed);
/// assert_eq!(trainer.history().len(), 3);
/// assert_eq!(trainer.state(), TrainerState::Done);
/// ```
pub struct Trainer<O: Optimizer, L: LossFunction> {
    config: TrainingConfig,
    optimizer: O,
    loss: L,
    state: TrainerState,
    history: History,
    stop_handle: StopHandle,
}

impl<O: Optimizer, L: LossFunction> Trainer<O, L> {
    /// Creates a trainer after validating the configuration.
    ///
    /// # Parameters
    ///
    /// - `config` - Training options
    /// - `optimizer` - Update rule applied to every parameter
    /// - `loss` - Loss function minimised during training
    ///
    /// # Returns
    ///
    /// - `Ok(Trainer)` - A trainer in the `Idle` state
    /// - `Err(ModelError::ConfigError)` - If any option is out of range
    pub fn new(config: TrainingConfig, optimizer: O, loss: L) -> Result<Self, ModelError> {
        config.validate()?;
        Ok(Self {
            config,
            optimizer,
            loss,
            state: TrainerState::Idle,
            history: History::new(),
            stop_handle: StopHandle::new(),
        })
    }

    /// Returns the current state
    pub fn state(&self) -> TrainerState {
        self.state
    }

    /// Returns the configuration in use
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Returns the per-epoch metrics recorded so far
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Consumes the trainer and returns its history
    pub fn into_history(self) -> History {
        self.history
    }

    /// Returns the optimizer, e.g. to inspect its state
    pub fn optimizer(&self) -> &O {
        &self.optimizer
    }

    /// Returns a handle that cancels a running `fit` from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }

    /// Replaces the trainer's stop handle, so one handle can cancel several trainers
    /// or be created before the trainer exists.
    pub fn with_stop_handle(mut self, stop_handle: StopHandle) -> Self {
        self.stop_handle = stop_handle;
        self
    }

    /// Trains `network` on `train`.
    ///
    /// Validation data is `validation` when given, otherwise the last
    /// `validation_split` fraction of `train`, otherwise none.
    ///
    /// # Parameters
    ///
    /// - `network` - The network to train; its parameters are updated in place
    /// - `train` - Training partition
    /// - `validation` - Optional explicit validation partition
    ///
    /// # Returns
    ///
    /// - `Ok(StopReason)` - Why training ended; the history holds every completed epoch
    /// - `Err(ModelError::ConfigError)` - If `fit` was already called, or early stopping is
    ///   enabled without validation data
    /// - `Err(ModelError::ShapeError)` - If the data does not match the network
    /// - `Err(ModelError::NumericError)` - If a loss or gradient became NaN or infinite,
    ///   located by epoch and batch
    pub fn fit(
        &mut self,
        network: &mut Sequential,
        train: &Partition,
        validation: Option<&Partition>,
    ) -> Result<StopReason, ModelError> {
        if self.state != TrainerState::Idle {
            return Err(ModelError::ConfigError(
                "trainer has already been used; create a new trainer for another run".to_string(),
            ));
        }

        let split;
        let (train, validation) = match validation {
            Some(validation) => (train, Some(validation)),
            None if self.config.validation_split > 0.0 => {
                match train.split(self.config.validation_split) {
                    Ok(parts) => {
                        split = parts;
                        (&split.0, Some(&split.1))
                    }
                    Err(e) => {
                        self.set_state(TrainerState::Done);
                        return Err(e);
                    }
                }
            }
            None => (train, None),
        };

        if let Err(e) = self.check_inputs(network, train, validation) {
            self.set_state(TrainerState::Done);
            return Err(e);
        }
        self.warn_if_unnormalised(network);

        let result = self.run(network, train, validation);
        self.set_state(TrainerState::Done);
        if let Err(e) = &result {
            log::error!("Training aborted: {}", e);
        }
        result
    }

    fn set_state(&mut self, state: TrainerState) {
        log::debug!("Trainer state {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Cross entropy of a non-softmax output saturates at the probability clamp,
    /// so the reported loss is meaningless.
    fn warn_if_unnormalised(&self, network: &Sequential) {
        let output = network.output_activation();
        if self.loss.expects_probabilities() && output != Some(Activation::Softmax) {
            log::warn!(
                "Loss expects probabilities but the output layer uses {}; add a softmax output layer",
                output.map_or("no activation", |activation| activation.name())
            );
        }
    }

    fn check_inputs(
        &self,
        network: &Sequential,
        train: &Partition,
        validation: Option<&Partition>,
    ) -> Result<(), ModelError> {
        if train.is_empty() {
            return Err(ModelError::ShapeError(
                "training partition is empty".to_string(),
            ));
        }
        let input_shape = network.input_shape().ok_or_else(|| {
            ModelError::ProcessingError("Sequential model has no layers".to_string())
        })?;
        let num_classes = network.num_classes().ok_or_else(|| {
            ModelError::ShapeError("network output must have shape [batch, classes]".to_string())
        })?;

        for (name, partition) in std::iter::once(("training", train))
            .chain(validation.map(|v| ("validation", v)))
        {
            if partition.sample_shape() != input_shape {
                return Err(ModelError::ShapeError(format!(
                    "{} samples have shape {:?} but the network expects {:?}",
                    name,
                    partition.sample_shape(),
                    input_shape
                )));
            }
            if partition.num_classes() > num_classes {
                return Err(ModelError::ShapeError(format!(
                    "{} labels go up to {} but the network has {} classes",
                    name,
                    partition.num_classes() - 1,
                    num_classes
                )));
            }
        }
        if validation.is_some_and(|v| v.is_empty()) {
            return Err(ModelError::ShapeError(
                "validation partition is empty".to_string(),
            ));
        }

        if self.config.early_stopping_patience > 0 && validation.is_none() {
            return Err(ModelError::ConfigError(
                "early stopping needs validation data: pass a validation partition or set validation_split"
                    .to_string(),
            ));
        }
        Ok(())
    }

    fn progress_bar(&self, total: u64) -> Result<ProgressBar, ModelError> {
        if !self.config.verbose {
            return Ok(ProgressBar::hidden());
        }
        let progress_bar = ProgressBar::new(total);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} | Epoch {msg}")
                .map_err(|e| ModelError::ProcessingError(e.to_string()))?
                .progress_chars("█▓░"),
        );
        Ok(progress_bar)
    }

    fn run(
        &mut self,
        network: &mut Sequential,
        train: &Partition,
        validation: Option<&Partition>,
    ) -> Result<StopReason, ModelError> {
        let epochs = self.config.epochs;
        let batches_per_epoch = train.batch_count(self.config.batch_size);
        let fused = network.output_activation() == Some(Activation::Softmax);
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut early_stopping = EarlyStopping::new(
            self.config.early_stopping_patience,
            self.config.early_stopping_min_delta,
        );
        let progress_bar = self.progress_bar((epochs * batches_per_epoch) as u64)?;

        log::info!(
            "Training {} samples for {} epochs ({} batches of up to {}) with {}",
            train.len(),
            epochs,
            batches_per_epoch,
            self.config.batch_size,
            self.optimizer.name()
        );

        let mut order: Vec<usize> = (0..train.len()).collect();
        for epoch in 0..epochs {
            log::info!("Executing training step for epoch {}", epoch);
            progress_bar.set_message(format!("{}/{}", epoch + 1, epochs));

            if self.config.shuffle {
                order.shuffle(&mut rng);
            }

            let totals = match self.train_epoch(network, train, &order, epoch, fused, &progress_bar)? {
                Some(totals) => totals,
                None => {
                    progress_bar.abandon_with_message(format!("cancelled in epoch {}", epoch + 1));
                    log::warn!("Training cancelled during epoch {}", epoch);
                    return Ok(StopReason::Cancelled { epoch });
                }
            };

            let validation_metrics = match validation {
                Some(validation) => {
                    self.set_state(TrainerState::ValidatingEpoch { epoch });
                    let evaluation = evaluate_partition(
                        network,
                        validation,
                        &self.loss,
                        self.config.batch_size,
                    )
                    .map_err(|e| e.at(epoch, batches_per_epoch))?;
                    Some(evaluation)
                }
                None => None,
            };

            let record = EpochRecord {
                epoch_index: epoch,
                train_loss: totals.mean_loss(),
                train_accuracy: totals.accuracy(),
                validation_loss: validation_metrics.map(|e| e.loss),
                validation_accuracy: validation_metrics.map(|e| e.accuracy),
            };
            match (record.validation_loss, record.validation_accuracy) {
                (Some(val_loss), Some(val_accuracy)) => log::info!(
                    "Epoch {}/{}: loss {:.4}, accuracy {:.4}, val_loss {:.4}, val_accuracy {:.4}",
                    epoch + 1,
                    epochs,
                    record.train_loss,
                    record.train_accuracy,
                    val_loss,
                    val_accuracy
                ),
                _ => log::info!(
                    "Epoch {}/{}: loss {:.4}, accuracy {:.4}",
                    epoch + 1,
                    epochs,
                    record.train_loss,
                    record.train_accuracy
                ),
            }
            self.history.push(record);

            if let Some(val_loss) = record.validation_loss {
                if early_stopping.is_enabled() && early_stopping.observe(epoch, val_loss) {
                    let best_epoch = early_stopping.best_epoch().unwrap_or(epoch);
                    progress_bar.finish_with_message(format!("stopped early at {}", epoch + 1));
                    log::warn!(
                        "Early stopping at epoch {}: validation loss has not improved since epoch {}",
                        epoch,
                        best_epoch
                    );
                    return Ok(StopReason::EarlyStopped { epoch, best_epoch });
                }
            }
        }

        progress_bar.finish_with_message(format!("{}/{}", epochs, epochs));
        Ok(StopReason::Completed)
    }

    /// Runs every batch of one epoch. Returns `None` when cancelled.
    ///
    /// The next batch is gathered on the rayon pool while the current one trains.
    fn train_epoch(
        &mut self,
        network: &mut Sequential,
        train: &Partition,
        order: &[usize],
        epoch: usize,
        fused: bool,
        progress_bar: &ProgressBar,
    ) -> Result<Option<EpochTotals>, ModelError> {
        let batch_size = self.config.batch_size;
        let learning_rate = self.config.learning_rate;
        let chunks: Vec<&[usize]> = order.chunks(batch_size).collect();
        let fetch = |index: usize| {
            chunks
                .get(index)
                .map(|indices| Batch::from_partition(index, train.select(indices)))
        };

        let mut totals = EpochTotals::default();
        let mut next = fetch(0);
        while let Some(batch) = next.take() {
            if self.stop_handle.is_stopped() {
                return Ok(None);
            }
            let batch_index = batch.index;
            self.set_state(TrainerState::Training {
                epoch,
                batch: batch_index,
            });

            let optimizer = &mut self.optimizer;
            let loss_fn = &self.loss;
            let (step, prefetched) = rayon::join(
                || Self::train_step(network, optimizer, loss_fn, &batch, learning_rate, fused),
                || fetch(batch_index + 1),
            );
            let (loss, correct) = step.map_err(|e| e.at(epoch, batch_index))?;

            log::debug!(
                "epoch {} batch {}: loss {:.4}, accuracy {:.4}",
                epoch,
                batch_index,
                loss,
                correct as f32 / batch.len() as f32
            );
            totals.add(loss, correct, batch.len());
            progress_bar.inc(1);
            next = prefetched;
        }
        Ok(Some(totals))
    }

    /// One forward/backward/update step. Returns the batch loss and correct count.
    fn train_step(
        network: &mut Sequential,
        optimizer: &mut O,
        loss_fn: &L,
        batch: &Batch,
        learning_rate: f32,
        fused: bool,
    ) -> Result<(f32, usize), ModelError> {
        let probabilities = network.forward(&batch.images)?;
        let loss = loss_fn.compute_loss(&batch.labels, &probabilities)?;
        if !loss.is_finite() {
            return Err(ModelError::numeric(format!("loss is {}", loss)));
        }
        let correct = correct_count(&batch.labels, &probabilities)?;

        let logits_grad = if fused {
            loss_fn.softmax_logits_grad(&batch.labels, &probabilities)
        } else {
            None
        };
        match logits_grad {
            Some(grad) => network.backward_from_logits(&grad?)?,
            None => network.backward(&loss_fn.compute_grad(&batch.labels, &probabilities)?)?,
        };

        network.apply_gradients(optimizer, learning_rate)?;
        Ok((loss, correct))
    }
}
