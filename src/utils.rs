use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::{error::DatasetError, Float};

/// Normal distribution with a validated scale.
#[derive(Debug, Clone, Copy)]
pub struct Gaussian {
    normal: Normal<Float>,
}

impl Gaussian {
    pub fn new(mean: Float, std: Float) -> Result<Self, DatasetError> {
        if !mean.is_finite() || !std.is_finite() || std < 0.0 {
            return Err(DatasetError::configuration(
                "std",
                format!("gaussian needs a finite mean and non-negative scale, got N({mean}, {std})"),
            ));
        }
        let normal = Normal::new(mean, std)
            .map_err(|e| DatasetError::configuration("std", e.to_string()))?;

        Ok(Self { normal })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Float {
        self.normal.sample(rng)
    }

    // adds one independent draw to every element
    pub fn perturb<R: Rng + ?Sized>(&self, rng: &mut R, values: &mut [Float]) {
        for value in values.iter_mut() {
            *value += self.normal.sample(rng);
        }
    }

    pub fn vec<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Vec<Float> {
        (0..n).map(|_| self.normal.sample(rng)).collect()
    }
}

pub struct MinMax {
    pub min_value: Float,
    pub min_index: usize,
    pub max_value: Float,
    pub max_index: usize,
    pub diff_value: Float,
    pub mean: Float,
}

// return max, min and mean of a given non-empty array.
pub fn maxmin(values: &[Float]) -> Option<MinMax> {
    let (&first, _) = values.split_first()?;

    let mut maxv = first;
    let mut minv = first;
    let mut maxi = 0;
    let mut mini = 0;
    let mut sum = 0.0;
    for (i, value) in values.iter().copied().enumerate() {
        if value > maxv {
            maxv = value;
            maxi = i;
        }
        if value < minv {
            minv = value;
            mini = i;
        }
        sum += value;
    }
    Some(MinMax {
        min_value: minv,
        min_index: mini,
        max_value: maxv,
        max_index: maxi,
        diff_value: maxv - minv,
        mean: sum / values.len() as Float,
    })
}
