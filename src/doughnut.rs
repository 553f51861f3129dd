//! Concentric-ring ("doughnut") dataset.
//!
//! Each sample starts as a 2D point. Class 0 points scatter around the origin
//! and class `t` points are pushed `t` units outward along their own direction,
//! so two classes form a blob inside a ring. The point is tiled to fill the
//! sample shape and jittered with per-element noise.

use rand::Rng;
use tracing::{debug, trace};

use crate::{
    dataset::{check_index, validate_classes, Dataset, DatasetSpec, Sample},
    error::DatasetError,
    noise::NoiseMask,
    utils::Gaussian,
    vol::Vol,
    Float,
};

pub const RING_STD: Float = 0.2;
pub const ELEMENT_NOISE_STD: Float = 0.1;

/// Ring dataset with a precomputed label-noise mask.
///
/// A masked label becomes `(target + 1) mod 2` whatever `num_classes` is; an
/// unmasked label is always `index mod num_classes`.
pub struct DoughnutDataset<R> {
    spec: DatasetSpec,
    mask: NoiseMask,
    ring: Gaussian,
    jitter: Gaussian,
    rng: R,
}

impl<R: Rng> DoughnutDataset<R> {
    /// Builds the dataset and draws its noise mask from `rng`.
    ///
    /// # Errors
    /// Returns [`DatasetError::Configuration`] if the spec is invalid, has fewer
    /// than two classes, or its sample shape holds an odd number of elements.
    pub fn new(spec: DatasetSpec, mut rng: R) -> Result<Self, DatasetError> {
        spec.validate()?;
        // labels are flipped modulo 2, see `item`
        validate_classes(spec.num_classes, 2)?;
        let num_elems = spec.num_elements();
        if num_elems % 2 != 0 {
            return Err(DatasetError::configuration(
                "sample_shape",
                format!(
                    "{:?} holds {num_elems} elements; 2D points need an even count",
                    spec.sample_shape
                ),
            ));
        }

        let mask = NoiseMask::sample(spec.len(), spec.noise_percent, &mut rng)?;
        debug!(
            len = spec.len(),
            corrupted = mask.count(),
            shape = ?spec.sample_shape,
            "built doughnut dataset"
        );

        Ok(Self {
            spec,
            mask,
            ring: Gaussian::new(0.0, RING_STD)?,
            jitter: Gaussian::new(0.0, ELEMENT_NOISE_STD)?,
            rng,
        })
    }

    pub fn spec(&self) -> &DatasetSpec {
        &self.spec
    }

    pub fn noise_mask(&self) -> &NoiseMask {
        &self.mask
    }

    /// Draws the 2D point for a sample of class `target`.
    fn ring_point(&mut self, target: usize) -> [Float; 2] {
        let v = [self.ring.sample(&mut self.rng), self.ring.sample(&mut self.rng)];
        push_outward(v, target as Float)
    }
}

/// Moves `v` by `radius` along its own direction. The origin has no direction
/// and is returned unchanged.
pub fn push_outward(v: [Float; 2], radius: Float) -> [Float; 2] {
    let norm = (v[0] * v[0] + v[1] * v[1]).sqrt();
    if norm == 0.0 {
        return v;
    }
    [v[0] + radius * v[0] / norm, v[1] + radius * v[1] / norm]
}

/// Repeats `base` `reps` times end to end.
pub fn tile(base: &[Float], reps: usize) -> Vec<Float> {
    let mut out = Vec::with_capacity(base.len() * reps);
    for _ in 0..reps {
        out.extend_from_slice(base);
    }
    out
}

impl<R: Rng> Dataset for DoughnutDataset<R> {
    fn len(&self) -> usize {
        self.spec.len()
    }

    fn item(&mut self, index: usize) -> Result<Sample, DatasetError> {
        check_index(index, self.len())?;

        let target = index % self.spec.num_classes;
        let point = self.ring_point(target);

        let tiled = Vol::vector(tile(&point, self.spec.num_elements() / 2));
        let mut data = tiled.reshape(&self.spec.sample_shape)?;
        self.jitter.perturb(&mut self.rng, &mut data.w);

        // Corrupted labels flip modulo 2 regardless of num_classes, so with
        // more than two classes they only ever land on 0 or 1.
        let label = if self.mask.is_flipped(index) {
            (target + 1) % 2
        } else {
            target
        };
        trace!(index, target, label, "doughnut item");

        Ok(Sample { data, label })
    }

    fn num_classes(&self) -> usize {
        self.spec.num_classes
    }

    fn sample_shape(&self) -> &[usize] {
        &self.spec.sample_shape
    }

    fn is_label_corrupted(&self, index: usize) -> bool {
        self.mask.is_flipped(index)
    }

    fn noise_count(&self) -> usize {
        self.mask.count()
    }

    fn name(&self) -> &str {
        "doughnut"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{rngs::StdRng, SeedableRng};
    use rstest::rstest;

    use crate::utils::maxmin;

    fn dataset(spec: DatasetSpec, seed: u64) -> DoughnutDataset<StdRng> {
        DoughnutDataset::new(spec, StdRng::seed_from_u64(seed)).expect("valid spec")
    }

    #[test]
    fn clean_labels_follow_index() {
        let mut ds = dataset(DatasetSpec::new(20, &[2, 3], 2), 1);
        assert_eq!(ds.noise_count(), 0);
        for i in 0..ds.len() {
            assert_eq!(ds.item(i).expect("in range").label, i % 2);
        }
    }

    #[test]
    fn quarter_noise_corrupts_fifty_of_two_hundred() {
        let mut ds = dataset(DatasetSpec::new(100, &[2], 2).with_noise(25.0), 9);
        assert_eq!(ds.len(), 200);
        assert_eq!(ds.noise_count(), 50);

        let mut mismatched = 0;
        for i in 0..ds.len() {
            let label = ds.item(i).expect("in range").label;
            if ds.is_label_corrupted(i) {
                assert_eq!(label, (i + 1) % 2);
                mismatched += 1;
            } else {
                assert_eq!(label, i % 2);
            }
        }
        assert_eq!(mismatched, 50);
    }

    #[test]
    fn clean_labels_keep_every_class() {
        let mut ds = dataset(DatasetSpec::new(5, &[2], 4), 2);
        for i in 0..ds.len() {
            assert_eq!(ds.item(i).expect("in range").label, i % 4);
        }
    }

    #[test]
    fn corrupted_labels_flip_modulo_two() {
        let mut ds = dataset(DatasetSpec::new(10, &[2], 3).with_noise(100.0), 6);
        for i in 0..ds.len() {
            assert_eq!(ds.item(i).expect("in range").label, (i % 3 + 1) % 2);
        }
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(5)]
    fn labels_stay_in_class_range(#[case] classes: usize) {
        let mut ds = dataset(DatasetSpec::new(10, &[4], classes).with_noise(50.0), 4);
        for i in 0..ds.len() {
            assert!(ds.item(i).expect("in range").label < classes);
        }
    }

    #[test]
    fn sample_is_the_tiled_point_plus_small_noise() {
        let mut ds = dataset(DatasetSpec::new(3, &[3, 8, 8], 2), 5);
        for i in 0..ds.len() {
            let sample = ds.item(i).expect("in range");
            assert_eq!(sample.data.shape(), &[3, 8, 8]);

            // even positions hold x, odd positions hold y
            let xs: Vec<Float> = sample.data.w.iter().step_by(2).copied().collect();
            let ys: Vec<Float> = sample.data.w.iter().skip(1).step_by(2).copied().collect();
            let x = maxmin(&xs).expect("non-empty").mean;
            let y = maxmin(&ys).expect("non-empty").mean;
            let radius = (x * x + y * y).sqrt();
            if i % 2 == 1 {
                assert!(radius > 0.9, "class 1 point at radius {radius}");
            }
        }
    }

    #[test]
    fn tiling_then_reshape_round_trips() {
        let tiled = tile(&[0.25, -1.5], 12);
        assert_eq!(tiled.len(), 24);
        let vol = Vol::vector(tiled.clone())
            .reshape(&[2, 3, 4])
            .expect("24 elements");
        assert_eq!(vol.shape(), &[2, 3, 4]);
        assert_eq!(vol.w, tiled);
    }

    #[rstest]
    #[case([3.0, 4.0], 1.0, [3.6, 4.8])]
    #[case([0.0, -2.0], 2.0, [0.0, -4.0])]
    #[case([0.0, 0.0], 1.0, [0.0, 0.0])]
    #[case([1.0, 1.0], 0.0, [1.0, 1.0])]
    fn push_outward_moves_along_direction(
        #[case] v: [Float; 2],
        #[case] radius: Float,
        #[case] expected: [Float; 2],
    ) {
        let pushed = push_outward(v, radius);
        assert!((pushed[0] - expected[0]).abs() < 1e-5);
        assert!((pushed[1] - expected[1]).abs() < 1e-5);
    }

    #[test]
    fn same_seed_reproduces_samples() {
        let spec = DatasetSpec::new(4, &[2, 2], 2).with_noise(50.0);
        let mut a = dataset(spec.clone(), 11);
        let mut b = dataset(spec, 11);
        assert_eq!(a.noise_mask(), b.noise_mask());
        for i in 0..a.len() {
            assert_eq!(a.item(i).expect("in range"), b.item(i).expect("in range"));
        }
    }

    #[rstest]
    #[case(DatasetSpec::new(4, &[3, 3], 2), "sample_shape")]
    #[case(DatasetSpec::new(4, &[2], 1), "num_classes")]
    fn invalid_spec_is_rejected(#[case] spec: DatasetSpec, #[case] expected: &str) {
        let err = DoughnutDataset::new(spec, StdRng::seed_from_u64(0))
            .err()
            .expect("spec must be rejected");
        match err {
            DatasetError::Configuration { parameter, .. } => assert_eq!(parameter, expected),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut ds = dataset(DatasetSpec::new(1, &[2], 2), 0);
        assert!(matches!(
            ds.item(2),
            Err(DatasetError::OutOfRange { index: 2, len: 2 })
        ));
    }
}
