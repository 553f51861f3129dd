use crate::{error::DatasetError, vol::Vol};

/// One element of a dataset: a tensor and its (possibly corrupted) class label.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub data: Vol,
    pub label: usize,
}

/// A fixed-length, randomly accessible collection of labelled samples.
///
/// Samples are produced on every call to [`Dataset::item`] and never cached;
/// callers that want caching or prefetching wrap the dataset themselves.
pub trait Dataset {
    /// Total number of samples. Constant for the lifetime of the dataset.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Produces the sample at `index`.
    ///
    /// Takes `&mut self` because generators advance their own random source.
    ///
    /// # Errors
    /// Returns [`DatasetError::OutOfRange`] when `index >= self.len()`, and
    /// I/O or decode errors for datasets backed by files.
    fn item(&mut self, index: usize) -> Result<Sample, DatasetError>;

    /// Number of label classes; every label lies in `[0, num_classes)`.
    fn num_classes(&self) -> usize;

    /// Shape of every sample tensor.
    fn sample_shape(&self) -> &[usize];

    /// Whether the label at `index` has been deliberately corrupted.
    fn is_label_corrupted(&self, _index: usize) -> bool {
        false
    }

    /// Number of corrupted labels.
    fn noise_count(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        "dataset"
    }
}

/// Shape parameters of a synthetic dataset.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetSpec {
    pub sample_count_per_class: usize,
    pub sample_shape: Vec<usize>,
    pub num_classes: usize,
    /// Percentage of labels to corrupt, in `[0, 100]`.
    #[serde(default)]
    pub noise_percent: f64,
}

impl DatasetSpec {
    pub fn new(sample_count_per_class: usize, sample_shape: &[usize], num_classes: usize) -> Self {
        Self {
            sample_count_per_class,
            sample_shape: sample_shape.to_vec(),
            num_classes,
            noise_percent: 0.0,
        }
    }

    pub fn with_noise(mut self, percent: f64) -> Self {
        self.noise_percent = percent;
        self
    }

    /// Number of samples the spec describes.
    pub fn len(&self) -> usize {
        self.num_classes * self.sample_count_per_class
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_elements(&self) -> usize {
        crate::vol::num_elements(&self.sample_shape)
    }

    pub(crate) fn validate(&self) -> Result<(), DatasetError> {
        validate_classes(self.num_classes, 1)?;
        validate_shape(&self.sample_shape)?;
        crate::noise::validate_percent(self.noise_percent)
    }
}

pub(crate) fn check_index(index: usize, len: usize) -> Result<(), DatasetError> {
    if index >= len {
        return Err(DatasetError::OutOfRange { index, len });
    }
    Ok(())
}

/// Rejects shapes that are empty or contain a zero-length axis.
pub(crate) fn validate_shape(shape: &[usize]) -> Result<(), DatasetError> {
    if shape.is_empty() || shape.contains(&0) {
        return Err(DatasetError::configuration(
            "sample_shape",
            format!("expected non-empty positive dimensions, got {shape:?}"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_classes(num_classes: usize, min: usize) -> Result<(), DatasetError> {
    if num_classes < min {
        return Err(DatasetError::configuration(
            "num_classes",
            format!("expected at least {min} classes, got {num_classes}"),
        ));
    }
    Ok(())
}
