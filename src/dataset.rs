use crate::error::ModelError;
use crate::neural_network::Tensor;
use ndarray::{Array1, Array3, Axis, Slice};

/// A set of labelled samples held in memory.
///
/// `images` has the batch axis first (e.g. `[N, 28, 28]`); `labels[i]` is the class
/// index of sample `i`. Pixel values are expected to be normalised already
/// (see `Partition::from_raw_pixels`).
///
/// # Example
/// ```rust
/// use mlp_trainer::dataset::Partition;
/// use ndarray::{Array1, Array3};
///
/// let pixels = Array3::<u8>::from_elem((10, 28, 28), 255);
/// let labels = Array1::from(vec![3usize; 10]);
/// let partition = Partition::from_raw_pixels(&pixels, labels).unwrap();
///
/// assert_eq!(partition.len(), 10);
/// assert_eq!(partition.sample_shape(), &[28, 28]);
/// assert_eq!(partition.images()[[0, 0, 0]], 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    images: Tensor,
    labels: Array1<usize>,
}

impl Partition {
    /// Creates a partition from normalised images and class labels.
    ///
    /// # Parameters
    ///
    /// - `images` - Tensor with the sample axis first and at least one feature axis
    /// - `labels` - Class index per sample
    ///
    /// # Returns
    ///
    /// - `Ok(Partition)` - The partition
    /// - `Err(ModelError::ShapeError)` - If the tensor has no feature axis or the sample counts differ
    pub fn new(images: Tensor, labels: Array1<usize>) -> Result<Self, ModelError> {
        if images.ndim() < 2 {
            return Err(ModelError::ShapeError(format!(
                "images need a sample axis and at least one feature axis, got shape {:?}",
                images.shape()
            )));
        }
        if images.shape()[0] != labels.len() {
            return Err(ModelError::ShapeError(format!(
                "images have {} samples but labels have {}",
                images.shape()[0],
                labels.len()
            )));
        }
        Ok(Self { images, labels })
    }

    /// Creates a partition from raw 8-bit pixels, scaling them into `[0, 1]`.
    ///
    /// # Parameters
    ///
    /// - `pixels` - Grey-scale images with shape `[N, H, W]`, values in `[0, 255]`
    /// - `labels` - Class index per image
    ///
    /// # Returns
    ///
    /// - `Ok(Partition)` - The normalised partition
    /// - `Err(ModelError::ShapeError)` - If the sample counts differ
    pub fn from_raw_pixels(pixels: &Array3<u8>, labels: Array1<usize>) -> Result<Self, ModelError> {
        let images = pixels.mapv(|p| p as f32 / 255.0).into_dyn();
        Self::new(images, labels)
    }

    /// Returns the number of samples
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` when the partition holds no samples
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the image tensor, sample axis first
    pub fn images(&self) -> &Tensor {
        &self.images
    }

    /// Returns the class index of every sample
    pub fn labels(&self) -> &Array1<usize> {
        &self.labels
    }

    /// Returns the shape of a single sample (e.g. `[28, 28]`)
    pub fn sample_shape(&self) -> &[usize] {
        &self.images.shape()[1..]
    }

    /// Returns the largest label plus one, or 0 for an empty partition
    pub fn num_classes(&self) -> usize {
        self.labels.iter().max().map_or(0, |&max| max + 1)
    }

    /// Copies the samples at `indices`, in that order, into a new partition.
    pub fn select(&self, indices: &[usize]) -> Partition {
        Partition {
            images: self.images.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }

    /// Copies the contiguous samples `start..end` into a new partition.
    pub fn slice(&self, start: usize, end: usize) -> Partition {
        Partition {
            images: self
                .images
                .slice_axis(Axis(0), Slice::from(start..end))
                .to_owned(),
            labels: self
                .labels
                .slice_axis(Axis(0), Slice::from(start..end))
                .to_owned(),
        }
    }

    /// Holds out the last `validation_split` fraction of samples for validation.
    ///
    /// Samples are not shuffled before splitting, so the split is the same on every call.
    /// The training side keeps `floor(len * (1 - validation_split))` samples.
    ///
    /// # Parameters
    ///
    /// * `validation_split` - Fraction of samples to hold out, in (0, 1)
    ///
    /// # Returns
    ///
    /// - `Ok((train, validation))` - Both partitions are non-empty
    /// - `Err(ModelError::ConfigError)` - If the fraction is out of range or leaves either side empty
    pub fn split(&self, validation_split: f32) -> Result<(Partition, Partition), ModelError> {
        if !(validation_split > 0.0 && validation_split < 1.0) {
            return Err(ModelError::ConfigError(format!(
                "validation_split must be in (0, 1) to split, got {}",
                validation_split
            )));
        }

        let n_samples = self.len();
        // f32 fractions such as 0.1 sit slightly above their decimal value
        let held_out = n_samples as f64 * validation_split as f64;
        let n_validation = ((held_out * (1.0 - 1e-6)).ceil() as usize).min(n_samples);
        let n_train = n_samples - n_validation;
        if n_train == 0 || n_train == n_samples {
            return Err(ModelError::ConfigError(format!(
                "validation_split {} leaves an empty partition for {} samples",
                validation_split, n_samples
            )));
        }

        Ok((self.slice(0, n_train), self.slice(n_train, n_samples)))
    }

    /// Iterates over contiguous batches of at most `batch_size` samples.
    ///
    /// The last batch is smaller when `len()` is not a multiple of `batch_size`.
    pub fn batches(&self, batch_size: usize) -> Batches<'_> {
        Batches {
            partition: self,
            batch_size: batch_size.max(1),
            position: 0,
            index: 0,
        }
    }

    /// Number of batches `batches(batch_size)` yields
    pub fn batch_count(&self, batch_size: usize) -> usize {
        self.len().div_ceil(batch_size.max(1))
    }
}

/// One batch of samples, owned and never mutated after creation
///
/// # Fields
///
/// - `index` - Position of the batch within its epoch
/// - `images` - Image tensor, sample axis first
/// - `labels` - Class index per sample
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub index: usize,
    pub images: Tensor,
    pub labels: Array1<usize>,
}

impl Batch {
    /// Wraps a partition as the batch at position `index`.
    pub fn from_partition(index: usize, partition: Partition) -> Self {
        Self {
            index,
            images: partition.images,
            labels: partition.labels,
        }
    }

    /// Number of samples in the batch
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` when the batch holds no samples
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Iterator over the contiguous batches of a `Partition`
pub struct Batches<'a> {
    partition: &'a Partition,
    batch_size: usize,
    position: usize,
    index: usize,
}

impl Iterator for Batches<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.partition.len() {
            return None;
        }
        let end = (self.position + self.batch_size).min(self.partition.len());
        let batch = Batch::from_partition(self.index, self.partition.slice(self.position, end));
        self.position = end;
        self.index += 1;
        Some(batch)
    }
}

/// The four arrays a dataset provider hands over: train and test images with labels
///
/// # Fields
///
/// - `train` - Training partition (validation is carved out of it or passed separately)
/// - `test` - Held-out test partition used for the final evaluation
#[derive(Debug, Clone)]
pub struct DatasetSplits {
    pub train: Partition,
    pub test: Partition,
}

impl DatasetSplits {
    /// Builds both partitions from raw 8-bit images (MNIST / Fashion MNIST layout).
    ///
    /// # Parameters
    ///
    /// - `train_images` - Training images `[N, H, W]`
    /// - `train_labels` - Training labels `[N]`
    /// - `test_images` - Test images `[M, H, W]`
    /// - `test_labels` - Test labels `[M]`
    ///
    /// # Returns
    ///
    /// - `Ok(DatasetSplits)` - Normalised train and test partitions
    /// - `Err(ModelError::ShapeError)` - If counts differ or train and test images have different sizes
    pub fn from_raw(
        train_images: &Array3<u8>,
        train_labels: Array1<usize>,
        test_images: &Array3<u8>,
        test_labels: Array1<usize>,
    ) -> Result<Self, ModelError> {
        let train = Partition::from_raw_pixels(train_images, train_labels)?;
        let test = Partition::from_raw_pixels(test_images, test_labels)?;
        if train.sample_shape() != test.sample_shape() {
            return Err(ModelError::ShapeError(format!(
                "train images are {:?} but test images are {:?}",
                train.sample_shape(),
                test.sample_shape()
            )));
        }
        Ok(Self { train, test })
    }
}
