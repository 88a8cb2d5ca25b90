/// Error types shared by every module.
///
/// - **ModelError**: shape, numeric, configuration, dimension and processing errors raised
///   while building, training or evaluating a network
/// - **IoError**: file system and JSON errors raised while reading configuration files or
///   writing training reports
pub mod error;

/// Core traits behind layer, loss and optimizer polymorphism.
///
/// - **Layer**: caching forward pass, non-caching prediction, backward pass and parameter access
/// - **LossFunction**: loss value, gradient and the fused softmax cross-entropy gradient
/// - **Optimizer**: per-parameter update rule with state keyed by `ParameterKey`
pub mod traits;

/// Classification metrics computed from predicted class probabilities.
///
/// # Examples
/// ```rust
/// use mlp_trainer::metric::*;
/// use ndarray::array;
///
/// let probabilities = array![[0.2_f32, 0.8], [0.6, 0.4]].into_dyn();
/// let labels = array![1, 1];
///
/// assert_eq!(argmax_rows(&probabilities).unwrap(), array![1, 0]);
/// assert_eq!(accuracy(&labels, &probabilities).unwrap(), 0.5);
/// ```
pub mod metric;

/// In-memory labelled image data.
///
/// Dataset loading and decoding happens elsewhere; this module only takes the arrays a
/// provider hands over (train and test images with labels), normalises 8-bit pixels into
/// `[0, 1]`, holds out validation data and cuts partitions into batches.
///
/// # Examples
/// ```rust
/// use mlp_trainer::dataset::DatasetSplits;
/// use ndarray::{Array1, Array3};
///
/// let splits = DatasetSplits::from_raw(
///     &Array3::<u8>::zeros((100, 28, 28)),
///     Array1::from(vec![0usize; 100]),
///     &Array3::<u8>::zeros((20, 28, 28)),
///     Array1::from(vec![0usize; 20]),
/// ).unwrap();
///
/// let (train, validation) = splits.train.split(0.2).unwrap();
/// assert_eq!((train.len(), validation.len()), (80, 20));
/// ```
pub mod dataset;

/// Neural network building blocks.
///
/// # Core Components
///
/// ## Model
/// - **Sequential**: Linear stack of layers with shape checking on `add`
///
/// ## Layers
/// - **Dense**: Fully connected layer with `Linear`, `ReLU` or `Softmax` activation
/// - **Flatten**: Collapses every per-sample axis into one feature axis
///
/// ## Loss Function
/// - **SparseCategoricalCrossEntropy**: Cross entropy over integer class labels
///
/// ## Optimizers
/// - **SGD**: Stochastic Gradient Descent, optionally with momentum
/// - **Adam**: Adaptive Moment Estimation
/// - **RMSprop**: Root Mean Square Propagation
/// - **AdaGrad**: Adaptive Gradient Algorithm
///
/// # Examples
/// ```rust
/// use mlp_trainer::neural_network::*;
/// use ndarray::Array;
/// use ndarray_rand::rand::SeedableRng;
/// use ndarray_rand::rand::rngs::StdRng;
///
/// let mut rng = StdRng::seed_from_u64(7);
///
/// // Build sequential model
/// let mut model = Sequential::new();
/// model
///     .add(Flatten::new(vec![28, 28]).unwrap()) // [batch, 28, 28] -> [batch, 784]
///     .unwrap()
///     .add(Dense::new(784, 128, Activation::ReLU, &mut rng).unwrap())
///     .unwrap()
///     .add(Dense::new(128, 10, Activation::Softmax, &mut rng).unwrap())
///     .unwrap();
///
/// // Display model architecture
/// model.summary();
///
/// // Make predictions
/// let x = Array::zeros((3, 28, 28)).into_dyn();
/// let predictions = model.predict(&x).unwrap();
/// assert_eq!(predictions.shape(), &[3, 10]);
/// ```
pub mod neural_network;

/// Held-out evaluation of trained networks
pub mod evaluation;

/// Mini-batch training with validation, early stopping and a per-epoch history.
///
/// # Examples
/// ```rust
/// use mlp_trainer::prelude::*;
/// use ndarray::{Array1, Array3};
/// use ndarray_rand::rand::SeedableRng;
/// use ndarray_rand::rand::rngs::StdRng;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let mut model = Sequential::new();
/// model
///     .add(Flatten::new(vec![4, 4]).unwrap())
///     .unwrap()
///     .add(Dense::new(16, 8, Activation::ReLU, &mut rng).unwrap())
///     .unwrap()
///     .add(Dense::new(8, 2, Activation::Softmax, &mut rng).unwrap())
///     .unwrap();
///
/// let pixels = Array3::<u8>::from_shape_fn((20, 4, 4), |(i, _, _)| if i % 2 == 0 { 0 } else { 255 });
/// let labels = Array1::from_shape_fn(20, |i| i % 2);
/// let data = Partition::from_raw_pixels(&pixels, labels).unwrap();
///
/// let config = TrainingConfig {
///     epochs: 5,
///     batch_size: 4,
///     validation_split: 0.2,
///     early_stopping_patience: 3,
///     ..TrainingConfig::default()
/// };
/// let mut trainer = Trainer::new(config, Adam::default(), SparseCategoricalCrossEntropy::new()).unwrap();
/// trainer.fit(&mut model, &data, None).unwrap();
///
/// for record in trainer.history().records() {
///     assert!(record.validation_loss.is_some());
/// }
/// ```
pub mod training;

/// Convenience re-exports of the types needed to build, train and evaluate a network
pub mod prelude;

pub use error::ModelError;
