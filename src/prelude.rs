pub use crate::dataset::{Batch, DatasetSplits, Partition};
pub use crate::error::{IoError, ModelError};
pub use crate::evaluation::{Evaluation, Evaluator};
pub use crate::metric::{accuracy, argmax_rows, correct_count};
pub use crate::neural_network::Tensor;
pub use crate::neural_network::activation::Activation;
pub use crate::neural_network::layer::{Dense, Flatten, Initializer, LayerWeight, TrainingParameters};
pub use crate::neural_network::loss_function::*;
pub use crate::neural_network::optimizer::*;
pub use crate::neural_network::sequential::Sequential;
pub use crate::training::{
    EarlyStopping, EpochRecord, History, StopHandle, StopReason, Trainer, TrainerState,
    TrainingConfig,
};
pub use crate::traits::{Layer, LossFunction, Optimizer};
