//! Label-noise masks.
//!
//! A [`NoiseMask`] marks a fixed budget of dataset indices whose labels are
//! reported corrupted. The budget is `round(percent / 100 * len)` and the
//! indices are drawn uniformly without replacement when the mask is built.

use rand::{seq::index, Rng};
use tracing::info;

use crate::error::DatasetError;

/// Checks that `percent` lies in `[0, 100]`.
pub fn validate_percent(percent: f64) -> Result<(), DatasetError> {
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(DatasetError::configuration(
            "noise_percent",
            format!("expected a percentage in [0, 100], got {percent}"),
        ));
    }
    Ok(())
}

/// Number of corrupted labels for `len` samples at `percent` noise.
pub fn corruption_budget(len: usize, percent: f64) -> usize {
    let budget = (percent / 100.0 * len as f64).round() as usize;
    budget.min(len)
}

/// A fixed set of indices whose labels are flipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseMask {
    flags: Vec<bool>,
    indices: Vec<usize>,
}

impl NoiseMask {
    /// A mask over `len` indices that corrupts nothing.
    pub fn clean(len: usize) -> Self {
        Self {
            flags: vec![false; len],
            indices: Vec::new(),
        }
    }

    /// Draws the mask for `len` samples at `percent` noise.
    ///
    /// # Errors
    /// Returns [`DatasetError::Configuration`] when `percent` is not a finite
    /// value in `[0, 100]`.
    pub fn sample<R: Rng + ?Sized>(
        len: usize,
        percent: f64,
        rng: &mut R,
    ) -> Result<Self, DatasetError> {
        validate_percent(percent)?;

        let budget = corruption_budget(len, percent);
        let mut indices = index::sample(rng, len, budget).into_vec();
        indices.sort_unstable();

        let mut flags = vec![false; len];
        for &i in &indices {
            flags[i] = true;
        }

        info!(
            noise_percent = percent,
            corrupted = budget,
            total = len,
            "sampled label noise mask"
        );

        Ok(Self { flags, indices })
    }

    /// Whether the label at `index` is corrupted. Out-of-range indices are not.
    pub fn is_flipped(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    /// Corrupted indices in ascending order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of corrupted indices.
    pub fn count(&self) -> usize {
        self.indices.len()
    }

    /// Number of indices the mask covers.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Realized corruption as a percentage of the covered indices.
    pub fn realized_percent(&self) -> f64 {
        if self.flags.is_empty() {
            return 0.0;
        }
        self.indices.len() as f64 * 100.0 / self.flags.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    use rand::{rngs::StdRng, SeedableRng};
    use rstest::rstest;

    #[rstest]
    #[case(200, 25.0, 50)]
    #[case(200, 0.0, 0)]
    #[case(10, 100.0, 10)]
    #[case(8, 20.0, 2)]
    #[case(7, 20.0, 1)]
    #[case(0, 50.0, 0)]
    fn budget_rounds_the_configured_fraction(
        #[case] len: usize,
        #[case] percent: f64,
        #[case] expected: usize,
    ) {
        assert_eq!(corruption_budget(len, percent), expected);
    }

    #[rstest]
    #[case(200, 25.0)]
    #[case(1000, 20.0)]
    #[case(3, 100.0)]
    fn mask_indices_are_unique_and_in_range(#[case] len: usize, #[case] percent: f64) {
        let mut rng = StdRng::seed_from_u64(7);
        let mask = NoiseMask::sample(len, percent, &mut rng).expect("valid percent");

        assert_eq!(mask.len(), len);
        assert_eq!(mask.count(), corruption_budget(len, percent));
        let unique: HashSet<_> = mask.indices().iter().copied().collect();
        assert_eq!(unique.len(), mask.count());
        assert!(mask.indices().iter().all(|&i| i < len));
        assert_eq!((0..len).filter(|&i| mask.is_flipped(i)).count(), mask.count());
    }

    #[rstest]
    #[case(-0.5)]
    #[case(100.5)]
    #[case(f64::NAN)]
    fn rejects_percent_outside_range(#[case] percent: f64) {
        let mut rng = StdRng::seed_from_u64(0);
        let err = NoiseMask::sample(10, percent, &mut rng).expect_err("percent is invalid");
        assert!(matches!(
            err,
            DatasetError::Configuration {
                parameter: "noise_percent",
                ..
            }
        ));
    }

    #[test]
    fn same_seed_draws_same_mask() {
        let a = NoiseMask::sample(500, 10.0, &mut StdRng::seed_from_u64(42)).expect("valid");
        let b = NoiseMask::sample(500, 10.0, &mut StdRng::seed_from_u64(42)).expect("valid");
        assert_eq!(a, b);
    }

    #[test]
    fn clean_mask_flips_nothing() {
        let mask = NoiseMask::clean(4);
        assert_eq!(mask.count(), 0);
        assert_eq!(mask.realized_percent(), 0.0);
        assert!(!mask.is_flipped(0));
        assert!(!mask.is_flipped(99));
    }
}
