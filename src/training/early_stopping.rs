/// Tracks the validation loss and decides when training should stop.
///
/// An epoch improves on the best loss seen so far when `loss < best - min_delta`.
/// After `patience` consecutive epochs without improvement `observe` returns `true`,
/// so training halts exactly at epoch `best_epoch + patience`.
///
/// # Example
/// ```rust
/// use mlp_trainer::training::EarlyStopping;
///
/// let mut early_stopping = EarlyStopping::new(2, 0.0);
/// assert!(!early_stopping.observe(0, 0.5));
/// assert!(!early_stopping.observe(1, 0.6));
/// assert!(early_stopping.observe(2, 0.7));
/// assert_eq!(early_stopping.best_epoch(), Some(0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EarlyStopping {
    patience: usize,
    min_delta: f32,
    best: Option<f32>,
    best_epoch: Option<usize>,
    wait: usize,
}

impl EarlyStopping {
    /// Creates a monitor; `patience == 0` never stops.
    pub fn new(patience: usize, min_delta: f32) -> Self {
        Self {
            patience,
            min_delta,
            best: None,
            best_epoch: None,
            wait: 0,
        }
    }

    /// Returns `true` if the monitor can ever request a stop
    pub fn is_enabled(&self) -> bool {
        self.patience > 0
    }

    /// Records the validation loss of `epoch` and returns whether to stop.
    pub fn observe(&mut self, epoch: usize, loss: f32) -> bool {
        let improved = match self.best {
            None => true,
            Some(best) => loss < best - self.min_delta,
        };

        if improved {
            self.best = Some(loss);
            self.best_epoch = Some(epoch);
            self.wait = 0;
            return false;
        }

        self.wait += 1;
        self.is_enabled() && self.wait >= self.patience
    }

    /// Lowest validation loss observed
    pub fn best(&self) -> Option<f32> {
        self.best
    }

    /// Epoch that produced the lowest validation loss
    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }

    /// Consecutive epochs without improvement
    pub fn wait(&self) -> usize {
        self.wait
    }
}
