use rand::Rng;
use tracing::{debug, trace};

use crate::{
    dataset::{check_index, Dataset, DatasetSpec, Sample},
    error::DatasetError,
    utils::Gaussian,
    vol::Vol,
    Float,
};

pub const DUMMY_NOISE_STD: Float = 0.1;

/// Gaussian blobs: sample `i` is noise around the constant `i mod num_classes`.
///
/// Labels are never corrupted, so the spec must carry a zero `noise_percent`.
pub struct DummyDataset<R> {
    spec: DatasetSpec,
    noise: Gaussian,
    rng: R,
}

impl<R: Rng> DummyDataset<R> {
    pub fn new(spec: DatasetSpec, rng: R) -> Result<Self, DatasetError> {
        spec.validate()?;
        if spec.noise_percent != 0.0 {
            return Err(DatasetError::configuration(
                "noise_percent",
                format!(
                    "dummy labels are never corrupted, got {}%",
                    spec.noise_percent
                ),
            ));
        }
        debug!(
            len = spec.len(),
            num_classes = spec.num_classes,
            shape = ?spec.sample_shape,
            "built dummy dataset"
        );

        Ok(Self {
            spec,
            noise: Gaussian::new(0.0, DUMMY_NOISE_STD)?,
            rng,
        })
    }

    pub fn spec(&self) -> &DatasetSpec {
        &self.spec
    }
}

impl<R: Rng> Dataset for DummyDataset<R> {
    fn len(&self) -> usize {
        self.spec.len()
    }

    fn item(&mut self, index: usize) -> Result<Sample, DatasetError> {
        check_index(index, self.len())?;
        trace!(index, "dummy item");

        let target = index % self.spec.num_classes;
        let mut data = Vol::gaussian(&self.spec.sample_shape, &self.noise, &mut self.rng);
        data.add_scalar(target as Float);

        Ok(Sample {
            data,
            label: target,
        })
    }

    fn num_classes(&self) -> usize {
        self.spec.num_classes
    }

    fn sample_shape(&self) -> &[usize] {
        &self.spec.sample_shape
    }

    fn name(&self) -> &str {
        "dummy"
    }
}
